//! Field declarations

use crate::relationship::Cardinality;
use crate::virtual_field::VirtualFieldConfig;

/// Stored scalar field kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Text,
    Integer,
    Checkbox,
}

/// Cardinality as declared, resolved during the build phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CardinalityDecl {
    Known(Cardinality),
    Declared(String),
}

/// Declaration of a relationship field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipField {
    pub(crate) target: String,
    pub(crate) cardinality: CardinalityDecl,
    pub(crate) nullable: bool,
}

impl RelationshipField {
    /// Point at `List` or, for a two-sided relationship, `List.field`
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            cardinality: CardinalityDecl::Known(Cardinality::ToOne),
            nullable: true,
        }
    }

    pub fn many(mut self, many: bool) -> Self {
        let cardinality = if many { Cardinality::ToMany } else { Cardinality::ToOne };
        self.cardinality = CardinalityDecl::Known(cardinality);
        self
    }

    /// Cardinality by name, checked when the schema is built
    pub fn cardinality(mut self, cardinality: impl Into<String>) -> Self {
        self.cardinality = CardinalityDecl::Declared(cardinality.into());
        self
    }

    /// Whether a to-one value may be disconnected
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

#[derive(Debug, Clone)]
pub enum FieldDefinition {
    Scalar(ScalarKind),
    Relationship(RelationshipField),
    Virtual(VirtualFieldConfig),
}

impl From<RelationshipField> for FieldDefinition {
    fn from(field: RelationshipField) -> Self {
        FieldDefinition::Relationship(field)
    }
}

impl From<VirtualFieldConfig> for FieldDefinition {
    fn from(config: VirtualFieldConfig) -> Self {
        FieldDefinition::Virtual(config)
    }
}

pub fn text() -> FieldDefinition {
    FieldDefinition::Scalar(ScalarKind::Text)
}

pub fn integer() -> FieldDefinition {
    FieldDefinition::Scalar(ScalarKind::Integer)
}

pub fn checkbox() -> FieldDefinition {
    FieldDefinition::Scalar(ScalarKind::Checkbox)
}

pub fn relationship(target: impl Into<String>) -> RelationshipField {
    RelationshipField::new(target)
}

pub fn virtual_field(config: VirtualFieldConfig) -> FieldDefinition {
    FieldDefinition::Virtual(config)
}
