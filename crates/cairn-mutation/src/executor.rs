//! Mutation executor

use crate::error::{MutationError, MutationResult};
use crate::response::{ItemPath, MutationResponse, ResponseError};
use crate::writer::{ItemData, ItemWriter, RelationshipWrite};
use cairn_core::MutationConfig;
use cairn_schema::{CompiledField, CompiledList, FieldPath, RelationshipFieldSpec, Schema};
use cairn_validation::{
    CreateData, ItemRef, OperationKind, RelationshipInput, RelationshipInputValidator, ValidationError, ValidationErrors,
};
use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use std::sync::Arc;

/// One entry of a batch update
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateItem {
    pub target: ItemRef,
    pub data: Value,
}

impl UpdateItem {
    pub fn new(target: Value, data: Value) -> Self {
        Self {
            target: ItemRef(target),
            data,
        }
    }
}

/// Outcome of a single item: its result slot and the errors it produced
struct ItemOutcome {
    slot: Value,
    errors: Vec<ResponseError>,
}

/// Input that passed through field checks, with any errors found on the way
struct PreparedItem {
    data: ItemData,
    errors: ValidationErrors,
}

/// Runs create and update mutations against an [`ItemWriter`]
pub struct MutationExecutor<W> {
    schema: Arc<Schema>,
    writer: Arc<W>,
    config: MutationConfig,
    validator: RelationshipInputValidator,
}

impl<W: ItemWriter> MutationExecutor<W> {
    pub fn new(schema: Arc<Schema>, writer: Arc<W>, config: MutationConfig) -> Self {
        Self {
            schema,
            writer,
            config,
            validator: RelationshipInputValidator::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// `create<List>`
    pub async fn create_one(&self, list_key: &str, data: Value) -> MutationResult<MutationResponse> {
        let list = self.list(list_key)?;
        let operation = format!("create{}", list.key());
        let outcome = self
            .run_item(list, OperationKind::Create, ItemPath::single(&operation), None, data)
            .await?;
        Ok(MutationResponse::new(operation, outcome.slot, outcome.errors))
    }

    /// `create<Plural>`
    pub async fn create_many(&self, list_key: &str, items: Vec<Value>) -> MutationResult<MutationResponse> {
        let list = self.list(list_key)?;
        self.check_batch_size(items.len())?;
        let operation = format!("create{}", list.plural());

        let outcomes = stream::iter(items.into_iter().enumerate())
            .map(|(index, data)| {
                let path = ItemPath::batch(&operation, index);
                self.run_item(list, OperationKind::Create, path, None, data)
            })
            .buffered(self.config.concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        collect_batch(operation, outcomes)
    }

    /// `update<List>`
    pub async fn update_one(&self, list_key: &str, target: Value, data: Value) -> MutationResult<MutationResponse> {
        let list = self.list(list_key)?;
        let operation = format!("update{}", list.key());
        let target = ItemRef(target);
        let outcome = self
            .run_item(list, OperationKind::Update, ItemPath::single(&operation), Some(&target), data)
            .await?;
        Ok(MutationResponse::new(operation, outcome.slot, outcome.errors))
    }

    /// `update<Plural>`
    pub async fn update_many(&self, list_key: &str, items: Vec<UpdateItem>) -> MutationResult<MutationResponse> {
        let list = self.list(list_key)?;
        self.check_batch_size(items.len())?;
        let operation = format!("update{}", list.plural());

        let outcomes = stream::iter(items.iter().enumerate())
            .map(|(index, item)| {
                let path = ItemPath::batch(&operation, index);
                self.run_item(list, OperationKind::Update, path, Some(&item.target), item.data.clone())
            })
            .buffered(self.config.concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        collect_batch(operation, outcomes)
    }

    fn list(&self, key: &str) -> MutationResult<&CompiledList> {
        self.schema.list(key).ok_or_else(|| MutationError::UnknownList {
            list: key.to_string(),
        })
    }

    fn check_batch_size(&self, size: usize) -> MutationResult<()> {
        match self.config.max_batch_size {
            Some(max) if size > max => Err(MutationError::BatchTooLarge { size, max }),
            _ => Ok(()),
        }
    }

    async fn run_item(
        &self,
        list: &CompiledList,
        operation: OperationKind,
        path: ItemPath,
        target: Option<&ItemRef>,
        data: Value,
    ) -> MutationResult<ItemOutcome> {
        tracing::debug!(list = list.key(), %path, %operation, "Executing item mutation");

        let Value::Object(data) = data else {
            return Ok(ItemOutcome {
                slot: Value::Null,
                errors: vec![ResponseError::item(
                    &path,
                    "Input error: Item data must be an object.",
                    "invalid_item_data",
                )],
            });
        };

        let prepared = self.prepare(list, operation, data)?;
        if !prepared.errors.is_empty() {
            tracing::warn!(
                list = list.key(),
                %path,
                errors = prepared.errors.len(),
                "Item rejected by input validation"
            );
            let errors = prepared.errors.iter().map(|error| ResponseError::input(&path, error)).collect();
            return Ok(ItemOutcome {
                slot: Value::Null,
                errors,
            });
        }

        let written = match (operation, target) {
            (OperationKind::Update, Some(target)) => self.writer.update_item(list.key(), target, prepared.data).await,
            _ => self.writer.create_item(list.key(), prepared.data).await,
        };

        match written {
            Ok(item) => Ok(decorate(list, &path, item)),
            Err(err) => {
                tracing::warn!(list = list.key(), %path, error = %err, "Item write failed");
                Ok(ItemOutcome {
                    slot: Value::Null,
                    errors: vec![ResponseError::item(&path, err.to_string(), "write_failed")],
                })
            }
        }
    }

    /// Check every supplied field and decode relationship inputs.
    ///
    /// Known fields are visited in declaration order, unknown ones after them,
    /// so error order does not depend on map ordering.
    fn prepare(&self, list: &CompiledList, operation: OperationKind, mut data: Map<String, Value>) -> MutationResult<PreparedItem> {
        let mut prepared = PreparedItem {
            data: ItemData::default(),
            errors: ValidationErrors::new(),
        };

        for field in list.fields() {
            let Some(value) = data.remove(field.name()) else {
                continue;
            };

            match field {
                CompiledField::Scalar { name, .. } => {
                    prepared.data.fields.insert(name.clone(), value);
                }
                CompiledField::Virtual(virtual_field) => {
                    prepared.errors.add(ValidationError::with_code(
                        virtual_field.field_path().to_string(),
                        format!("The virtual field {} cannot be written.", virtual_field.field_path()),
                        "virtual_field_not_writable",
                    ));
                }
                CompiledField::Relationship(spec) => match RelationshipInput::from_json(spec, &value) {
                    Err(error) => prepared.errors.add(error),
                    Ok(None) => {}
                    Ok(Some(input)) => {
                        let errors = self.validator.validate(spec, operation, Some(&input))?;
                        prepared.errors.merge(errors);
                        prepared.errors.merge(self.check_nested_creates(spec, &input)?);
                        prepared.data.relationships.push(RelationshipWrite {
                            spec: spec.clone(),
                            input,
                        });
                    }
                },
            }
        }

        for name in data.keys() {
            let field_path = FieldPath::new(list.key(), name);
            prepared.errors.add(ValidationError::with_code(
                field_path.to_string(),
                format!("Unknown field \"{}\" on list \"{}\".", name, list.key()),
                "unknown_field",
            ));
        }

        Ok(prepared)
    }

    /// Run the same checks over each nested `create` payload, as a create of
    /// the referenced list. Errors keep the nested field path, e.g. `Group.owner`.
    fn check_nested_creates(&self, spec: &RelationshipFieldSpec, input: &RelationshipInput) -> MutationResult<ValidationErrors> {
        let payloads: Vec<&CreateData> = match input {
            RelationshipInput::ToOne(input) => input.create.iter().collect(),
            RelationshipInput::ToMany(input) => input.create.iter().flatten().collect(),
        };

        let mut errors = ValidationErrors::new();
        if payloads.is_empty() {
            return Ok(errors);
        }

        let target = self.list(spec.ref_list())?;
        for payload in payloads {
            match &payload.0 {
                Value::Object(data) => {
                    let nested = self.prepare(target, OperationKind::Create, data.clone())?;
                    errors.merge(nested.errors);
                }
                _ => errors.add(ValidationError::with_code(
                    spec.field_path().to_string(),
                    format!("Nested create data for {} must be an object.", spec.field_path()),
                    "invalid_item_data",
                )),
            }
        }
        Ok(errors)
    }
}

/// Attach resolved virtual fields to a written item
fn decorate(list: &CompiledList, path: &ItemPath, item: Value) -> ItemOutcome {
    let mut item = match item {
        Value::Object(item) => item,
        other => {
            return ItemOutcome {
                slot: other,
                errors: Vec::new(),
            }
        }
    };

    let errors = list
        .resolve_virtual_fields(&mut item)
        .into_iter()
        .map(|(field_path, err)| {
            tracing::warn!(%path, field = %field_path, error = %err, "Virtual field resolver failed");
            ResponseError {
                path: format!("{}.{}", path, field_path),
                message: err.message,
                code: "resolve_failed".to_string(),
            }
        })
        .collect();

    ItemOutcome {
        slot: Value::Object(item),
        errors,
    }
}

fn collect_batch(operation: String, outcomes: Vec<MutationResult<ItemOutcome>>) -> MutationResult<MutationResponse> {
    let mut slots = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();

    for outcome in outcomes {
        let outcome = outcome?;
        slots.push(outcome.slot);
        errors.extend(outcome.errors);
    }

    tracing::debug!(%operation, items = slots.len(), errors = errors.len(), "Batch mutation finished");
    Ok(MutationResponse::new(operation, Value::Array(slots), errors))
}
