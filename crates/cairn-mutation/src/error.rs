//! Mutation error types

use cairn_schema::SchemaError;
use thiserror::Error;

pub type MutationResult<T> = Result<T, MutationError>;

/// Errors that abort a whole mutation.
///
/// Problems with a single item's input are not errors at this level; they are
/// reported in [`crate::MutationResponse::errors`].
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("Unknown list: {list}")]
    UnknownList { list: String },

    #[error("Batch of {size} items exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Failure reported by an [`crate::ItemWriter`] for one item
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WriteError {
    #[error("No {list} item matches {target}")]
    NotFound { list: String, target: String },

    #[error("Write rejected: {message}")]
    Rejected { message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl WriteError {
    pub fn not_found(list: impl Into<String>, target: impl Into<String>) -> Self {
        Self::NotFound {
            list: list.into(),
            target: target.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
