//! # cairn-mutation
//!
//! Executes create and update mutations for compiled lists. Each item's
//! relationship inputs are validated before anything is written; an invalid
//! item gets a `null` result slot while the rest of a batch carries on.

pub mod error;
pub mod executor;
pub mod response;
pub mod writer;

pub use error::{MutationError, MutationResult, WriteError};
pub use executor::{MutationExecutor, UpdateItem};
pub use response::{ItemPath, MutationResponse, PathSegment, ResponseError};
pub use writer::{ItemData, ItemWriter, RelationshipWrite};
