//! List declarations

use crate::field::FieldDefinition;

/// A named collection of items and its fields, in declaration order
#[derive(Debug, Clone)]
pub struct ListDefinition {
    pub(crate) key: String,
    pub(crate) plural: Option<String>,
    pub(crate) fields: Vec<(String, FieldDefinition)>,
}

impl ListDefinition {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            plural: None,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, definition: impl Into<FieldDefinition>) -> Self {
        self.fields.push((name.into(), definition.into()));
        self
    }

    /// Override the plural used in batch operation names (defaults to `<key>s`)
    pub fn plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

pub fn list(key: impl Into<String>) -> ListDefinition {
    ListDefinition::new(key)
}
