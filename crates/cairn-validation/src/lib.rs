//! # cairn-validation
//!
//! Validation of nested relationship mutation inputs. Pure and synchronous:
//! the validator looks at which directives (`connect`, `create`,
//! `disconnect`, `set`) an input carries and reports every rule it breaks.

pub mod error;
pub mod input;
pub mod operation;
pub mod rules;
pub mod validator;

pub use error::{ValidationError, ValidationErrors};
pub use input::{CreateData, ItemRef, RelationshipInput, ToManyInput, ToOneInput};
pub use operation::OperationKind;
pub use rules::RelationshipRule;
pub use validator::{validate_relationship_input, RelationshipInputValidator};
