//! Persistence seam used by the executor

use crate::error::WriteError;
use async_trait::async_trait;
use cairn_schema::RelationshipFieldSpec;
use cairn_validation::{ItemRef, RelationshipInput};
use serde_json::{Map, Value};

/// A validated relationship input ready to be applied
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipWrite {
    pub spec: RelationshipFieldSpec,
    pub input: RelationshipInput,
}

/// Validated data for one item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemData {
    /// Stored scalar values keyed by field name
    pub fields: Map<String, Value>,
    /// Relationship inputs in field declaration order
    pub relationships: Vec<RelationshipWrite>,
}

/// Writes validated items. Implemented by storage backends.
#[async_trait]
pub trait ItemWriter: Send + Sync {
    /// Create an item and return it as stored
    async fn create_item(&self, list: &str, data: ItemData) -> Result<Value, WriteError>;

    /// Update the item matching `target` and return it as stored
    async fn update_item(&self, list: &str, target: &ItemRef, data: ItemData) -> Result<Value, WriteError>;
}
