//! Schema construction errors

use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Fatal errors raised while building a schema.
///
/// These describe a broken declaration, not bad user input, and must not be
/// turned into per-item mutation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Duplicate list key: {list}")]
    DuplicateList { list: String },

    #[error("Duplicate field {field_path}")]
    DuplicateField { field_path: String },

    #[error("The field name at {field_path} is reserved")]
    ReservedField { field_path: String },

    #[error("Unknown field type '{field_type}' at {field_path}")]
    UnknownFieldType { field_path: String, field_type: String },

    #[error("Unknown relationship cardinality '{value}' at {field_path}, expected to-one or to-many")]
    UnknownCardinality { field_path: String, value: String },

    #[error("The relationship field at {field_path} is missing its ref")]
    MissingRef { field_path: String },

    #[error("Invalid ref '{target}' at {field_path}, expected \"List\" or \"List.field\"")]
    InvalidRef { field_path: String, target: String },

    #[error("The relationship field at {field_path} points to the unknown list {list}")]
    UnknownRefList { field_path: String, list: String },

    #[error("The relationship field at {field_path} points to {target}, which is not a relationship field")]
    BackReferenceNotRelationship { field_path: String, target: String },

    #[error("The relationship field at {field_path} points to {target}, but {target} points to {actual}")]
    MismatchedBackReference {
        field_path: String,
        target: String,
        actual: String,
    },

    #[error("{message}")]
    VirtualFieldRequiresUiQuery { field_path: String, message: String },

    #[error("The {cardinality} relationship field at {field_path} received a {input} input")]
    CardinalityMismatch {
        field_path: String,
        cardinality: String,
        input: String,
    },
}

/// Error returned by a virtual field resolver at request time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ResolveError {
    pub message: String,
}

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
