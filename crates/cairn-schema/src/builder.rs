//! Schema build phase
//!
//! Runs once at startup. Every declaration problem surfaces here as a
//! [`SchemaError`], so the compiled [`Schema`] can be trusted at request time.

use crate::document::SchemaDocument;
use crate::error::{ResolveError, SchemaError, SchemaResult};
use crate::field::{CardinalityDecl, FieldDefinition, RelationshipField, ScalarKind};
use crate::list::ListDefinition;
use crate::relationship::{Cardinality, FieldPath, RelationshipFieldSpec};
use crate::virtual_field::{item_query_name, VirtualField};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const RESERVED_FIELDS: &[&str] = &["id"];

/// A compiled field
#[derive(Debug, Clone)]
pub enum CompiledField {
    Scalar { name: String, kind: ScalarKind },
    Relationship(RelationshipFieldSpec),
    Virtual(Arc<VirtualField>),
}

impl CompiledField {
    pub fn name(&self) -> &str {
        match self {
            CompiledField::Scalar { name, .. } => name,
            CompiledField::Relationship(spec) => &spec.field_path().field,
            CompiledField::Virtual(field) => &field.field_path().field,
        }
    }
}

/// A compiled list
#[derive(Debug, Clone)]
pub struct CompiledList {
    key: String,
    plural: String,
    fields: Vec<CompiledField>,
    index: HashMap<String, usize>,
}

impl CompiledList {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn plural(&self) -> &str {
        &self.plural
    }

    pub fn item_query_name(&self) -> String {
        item_query_name(&self.key)
    }

    pub fn field(&self, name: &str) -> Option<&CompiledField> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationshipFieldSpec> {
        match self.field(name) {
            Some(CompiledField::Relationship(spec)) => Some(spec),
            _ => None,
        }
    }

    pub fn relationship_specs(&self) -> impl Iterator<Item = &RelationshipFieldSpec> {
        self.fields.iter().filter_map(|field| match field {
            CompiledField::Relationship(spec) => Some(spec),
            _ => None,
        })
    }

    pub fn virtual_fields(&self) -> impl Iterator<Item = &Arc<VirtualField>> {
        self.fields.iter().filter_map(|field| match field {
            CompiledField::Virtual(field) => Some(field),
            _ => None,
        })
    }

    /// Resolve every virtual field that can run without arguments and store
    /// its value on `item`.
    ///
    /// A failing resolver leaves `null` in its slot; its error is returned
    /// alongside the field path so the caller can report it.
    pub fn resolve_virtual_fields(&self, item: &mut Map<String, Value>) -> Vec<(FieldPath, ResolveError)> {
        let snapshot = Value::Object(item.clone());
        let mut failures = Vec::new();

        for field in self.virtual_fields().filter(|field| !field.has_required_args()) {
            let name = field.field_path().field.clone();
            match field.resolve(&snapshot, &Map::new()) {
                Ok(value) => {
                    item.insert(name, value);
                }
                Err(err) => {
                    item.insert(name, Value::Null);
                    failures.push((field.field_path().clone(), err));
                }
            }
        }

        failures
    }
}

/// The compiled set of lists
#[derive(Debug, Clone)]
pub struct Schema {
    lists: Vec<CompiledList>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    pub fn list(&self, key: &str) -> Option<&CompiledList> {
        self.index.get(key).map(|&i| &self.lists[i])
    }

    pub fn lists(&self) -> &[CompiledList] {
        &self.lists
    }
}

/// Collects list declarations and compiles them into a [`Schema`]
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    lists: Vec<ListDefinition>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(mut self, list: ListDefinition) -> Self {
        self.lists.push(list);
        self
    }

    pub fn document(mut self, document: SchemaDocument) -> SchemaResult<Self> {
        self.lists.extend(document.into_lists()?);
        Ok(self)
    }

    pub fn build(self) -> SchemaResult<Schema> {
        let mut keys = HashSet::new();
        for list in &self.lists {
            if !keys.insert(list.key.as_str()) {
                return Err(SchemaError::DuplicateList {
                    list: list.key.clone(),
                });
            }
        }

        let mut lists = Vec::with_capacity(self.lists.len());
        for definition in &self.lists {
            let compiled = compile_list(definition, &keys)?;
            tracing::debug!(list = %compiled.key, fields = compiled.fields.len(), "Compiled list");
            lists.push(compiled);
        }

        let index = lists
            .iter()
            .enumerate()
            .map(|(i, list)| (list.key.clone(), i))
            .collect();
        let schema = Schema { lists, index };

        check_back_references(&schema)?;

        tracing::info!(lists = schema.lists.len(), "Schema built");
        Ok(schema)
    }
}

fn compile_list(definition: &ListDefinition, keys: &HashSet<&str>) -> SchemaResult<CompiledList> {
    let mut fields = Vec::with_capacity(definition.fields.len());
    let mut index = HashMap::new();

    for (name, field) in &definition.fields {
        let path = FieldPath::new(&definition.key, name);

        if RESERVED_FIELDS.contains(&name.as_str()) {
            return Err(SchemaError::ReservedField {
                field_path: path.to_string(),
            });
        }
        if index.insert(name.clone(), fields.len()).is_some() {
            return Err(SchemaError::DuplicateField {
                field_path: path.to_string(),
            });
        }

        let compiled = match field {
            FieldDefinition::Scalar(kind) => CompiledField::Scalar {
                name: name.clone(),
                kind: *kind,
            },
            FieldDefinition::Relationship(relationship) => {
                CompiledField::Relationship(compile_relationship(path, relationship, keys)?)
            }
            FieldDefinition::Virtual(config) => CompiledField::Virtual(Arc::new(VirtualField::build(path, config.clone())?)),
        };
        fields.push(compiled);
    }

    Ok(CompiledList {
        key: definition.key.clone(),
        plural: definition
            .plural
            .clone()
            .unwrap_or_else(|| format!("{}s", definition.key)),
        fields,
        index,
    })
}

fn compile_relationship(
    path: FieldPath,
    field: &RelationshipField,
    keys: &HashSet<&str>,
) -> SchemaResult<RelationshipFieldSpec> {
    let cardinality = match &field.cardinality {
        CardinalityDecl::Known(cardinality) => *cardinality,
        CardinalityDecl::Declared(value) => {
            Cardinality::parse(value).ok_or_else(|| SchemaError::UnknownCardinality {
                field_path: path.to_string(),
                value: value.clone(),
            })?
        }
    };

    let (ref_list, ref_field) = parse_ref(&path, &field.target)?;
    if !keys.contains(ref_list) {
        return Err(SchemaError::UnknownRefList {
            field_path: path.to_string(),
            list: ref_list.to_string(),
        });
    }

    let mut spec = RelationshipFieldSpec::new(path, cardinality, ref_list).with_nullable(field.nullable);
    if let Some(ref_field) = ref_field {
        spec = spec.with_ref_field(ref_field);
    }
    Ok(spec)
}

fn parse_ref<'a>(path: &FieldPath, target: &'a str) -> SchemaResult<(&'a str, Option<&'a str>)> {
    let invalid = || SchemaError::InvalidRef {
        field_path: path.to_string(),
        target: target.to_string(),
    };

    let mut parts = target.split('.');
    let list = parts.next().filter(|list| !list.is_empty()).ok_or_else(invalid)?;
    let field = match parts.next() {
        Some(field) if !field.is_empty() => Some(field),
        Some(_) => return Err(invalid()),
        None => None,
    };
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok((list, field))
}

/// Two-sided relationships must point at each other
fn check_back_references(schema: &Schema) -> SchemaResult<()> {
    for list in &schema.lists {
        for spec in list.relationship_specs() {
            let Some(ref_field) = spec.ref_field() else {
                continue;
            };
            let target = FieldPath::new(spec.ref_list(), ref_field);

            let other = schema
                .list(spec.ref_list())
                .and_then(|other| other.relationship(ref_field))
                .ok_or_else(|| SchemaError::BackReferenceNotRelationship {
                    field_path: spec.field_path().to_string(),
                    target: target.to_string(),
                })?;

            let points_back = other.ref_list() == spec.field_path().list
                && other.ref_field() == Some(spec.field_path().field.as_str());
            if !points_back {
                let actual = match other.ref_field() {
                    Some(field) => format!("{}.{}", other.ref_list(), field),
                    None => other.ref_list().to_string(),
                };
                return Err(SchemaError::MismatchedBackReference {
                    field_path: spec.field_path().to_string(),
                    target: target.to_string(),
                    actual,
                });
            }
        }
    }
    Ok(())
}
