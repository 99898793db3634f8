//! In-memory item store
//!
//! Relationship values are stored as ids: a to-one field holds an id string
//! or `null`, a to-many field holds an array of ids. Each write is staged on a
//! copy of the store and committed only when every step succeeds.

use async_trait::async_trait;
use cairn_mutation::{ItemData, ItemWriter, RelationshipWrite, WriteError};
use cairn_schema::Schema;
use cairn_validation::{CreateData, ItemRef, RelationshipInput};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

type Items = HashMap<String, Vec<Map<String, Value>>>;

pub struct MemoryStore {
    schema: Arc<Schema>,
    items: RwLock<Items>,
}

impl MemoryStore {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            items: RwLock::new(HashMap::new()),
        }
    }

    /// All stored items of a list, in insertion order
    pub async fn items(&self, list: &str) -> Vec<Value> {
        let items = self.items.read().await;
        items
            .get(list)
            .map(|stored| stored.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    pub async fn count(&self, list: &str) -> usize {
        self.items.read().await.get(list).map_or(0, Vec::len)
    }

    pub async fn get(&self, list: &str, id: &str) -> Option<Value> {
        let items = self.items.read().await;
        find_index(&items, list, id).map(|index| Value::Object(items[list][index].clone()))
    }

    /// Insert a plain item directly, bypassing the executor. Returns its id.
    pub async fn seed(&self, list: &str, mut fields: Map<String, Value>) -> String {
        let id = Uuid::new_v4().to_string();
        fields.insert("id".to_string(), Value::String(id.clone()));
        self.items.write().await.entry(list.to_string()).or_default().push(fields);
        id
    }
}

#[async_trait]
impl ItemWriter for MemoryStore {
    async fn create_item(&self, list: &str, data: ItemData) -> Result<Value, WriteError> {
        let mut items = self.items.write().await;
        let mut staged = items.clone();

        let created = insert(&self.schema, &mut staged, list, data.fields, &data.relationships)?;

        *items = staged;
        tracing::debug!(list, id = %created["id"], "Stored item");
        Ok(Value::Object(created))
    }

    async fn update_item(&self, list: &str, target: &ItemRef, data: ItemData) -> Result<Value, WriteError> {
        let mut items = self.items.write().await;
        let mut staged = items.clone();

        let id = ref_id(list, target)?;
        let index = find_index(&staged, list, &id).ok_or_else(|| WriteError::not_found(list, target.0.to_string()))?;

        let mut item = staged[list][index].clone();
        for (name, value) in data.fields {
            item.insert(name, value);
        }
        for write in &data.relationships {
            apply(&self.schema, &mut staged, &mut item, write)?;
        }

        if let Some(stored) = staged.get_mut(list) {
            stored[index] = item.clone();
        }
        *items = staged;
        Ok(Value::Object(item))
    }
}

fn insert(
    schema: &Schema,
    items: &mut Items,
    list: &str,
    fields: Map<String, Value>,
    relationships: &[RelationshipWrite],
) -> Result<Map<String, Value>, WriteError> {
    let mut item = fields;
    item.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));

    for write in relationships {
        apply(schema, items, &mut item, write)?;
    }

    items.entry(list.to_string()).or_default().push(item.clone());
    Ok(item)
}

fn apply(schema: &Schema, items: &mut Items, item: &mut Map<String, Value>, write: &RelationshipWrite) -> Result<(), WriteError> {
    let field = write.spec.field_path().field.clone();
    let ref_list = write.spec.ref_list();

    match &write.input {
        RelationshipInput::ToOne(input) => {
            if input.disconnects() {
                item.insert(field.clone(), Value::Null);
            }
            if let Some(target) = &input.connect {
                let id = existing_id(items, ref_list, target)?;
                item.insert(field.clone(), Value::String(id));
            }
            if let Some(data) = &input.create {
                let id = create_nested(schema, items, ref_list, data)?;
                item.insert(field, Value::String(id));
            }
        }
        RelationshipInput::ToMany(input) => {
            let mut ids: Vec<String> = match item.get(&field) {
                Some(Value::Array(current)) => current.iter().filter_map(|id| id.as_str().map(String::from)).collect(),
                _ => Vec::new(),
            };

            if let Some(set) = &input.set {
                ids = set
                    .iter()
                    .map(|target| existing_id(items, ref_list, target))
                    .collect::<Result<_, _>>()?;
            }
            for target in input.disconnect.iter().flatten() {
                let id = ref_id(ref_list, target)?;
                ids.retain(|existing| *existing != id);
            }
            for target in input.connect.iter().flatten() {
                let id = existing_id(items, ref_list, target)?;
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            for data in input.create.iter().flatten() {
                ids.push(create_nested(schema, items, ref_list, data)?);
            }

            item.insert(field, Value::Array(ids.into_iter().map(Value::String).collect()));
        }
    }
    Ok(())
}

fn create_nested(schema: &Schema, items: &mut Items, list_key: &str, data: &CreateData) -> Result<String, WriteError> {
    let list = schema
        .list(list_key)
        .ok_or_else(|| WriteError::backend(format!("Unknown list {}", list_key)))?;
    let object = data
        .0
        .as_object()
        .ok_or_else(|| WriteError::rejected(format!("Nested {} data must be an object", list_key)))?;

    let mut fields = Map::new();
    let mut relationships = Vec::new();
    for (name, value) in object {
        match list.relationship(name) {
            Some(spec) => match RelationshipInput::from_json(spec, value) {
                Ok(Some(input)) => relationships.push(RelationshipWrite {
                    spec: spec.clone(),
                    input,
                }),
                Ok(None) => {}
                Err(error) => return Err(WriteError::rejected(error.message)),
            },
            None if list.field(name).is_some() => {
                fields.insert(name.clone(), value.clone());
            }
            None => {
                return Err(WriteError::rejected(format!(
                    "Unknown field \"{}\" on list \"{}\"",
                    name, list_key
                )))
            }
        }
    }

    let created = insert(schema, items, list_key, fields, &relationships)?;
    Ok(created["id"].as_str().unwrap_or_default().to_string())
}

fn ref_id(list: &str, target: &ItemRef) -> Result<String, WriteError> {
    target
        .0
        .get("id")
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| WriteError::rejected(format!("{} references must be {{ \"id\": ... }}, got {}", list, target.0)))
}

fn existing_id(items: &Items, list: &str, target: &ItemRef) -> Result<String, WriteError> {
    let id = ref_id(list, target)?;
    match find_index(items, list, &id) {
        Some(_) => Ok(id),
        None => Err(WriteError::not_found(list, target.0.to_string())),
    }
}

fn find_index(items: &Items, list: &str, id: &str) -> Option<usize> {
    items
        .get(list)?
        .iter()
        .position(|item| item.get("id").and_then(Value::as_str) == Some(id))
}
