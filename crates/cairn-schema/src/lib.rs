//! # cairn-schema
//!
//! Declarative lists and fields, compiled once at startup into a [`Schema`].
//! Everything that can be wrong with a declaration is reported here as a
//! [`SchemaError`]; request handling never sees one of those.

pub mod builder;
pub mod document;
pub mod error;
pub mod field;
pub mod list;
pub mod relationship;
pub mod virtual_field;

pub use builder::{CompiledField, CompiledList, Schema, SchemaBuilder};
pub use document::{FieldDocument, ListDocument, SchemaDocument};
pub use error::{ResolveError, SchemaError, SchemaResult};
pub use field::{checkbox, integer, relationship, text, virtual_field, FieldDefinition, RelationshipField, ScalarKind};
pub use list::{list, ListDefinition};
pub use relationship::{Cardinality, FieldPath, RelationshipFieldSpec};
pub use virtual_field::{
    ArgDefinition, FieldMode, InputType, NamedType, OutputType, VirtualField, VirtualFieldConfig, VirtualFieldUi,
};
