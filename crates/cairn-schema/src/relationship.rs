//! Relationship field metadata handed to the input validator

use std::fmt;

/// How many items a relationship field points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    ToOne,
    ToMany,
}

impl Cardinality {
    /// Parse a declared cardinality. Accepts `to-one`/`one` and `to-many`/`many`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "to-one" | "one" => Some(Cardinality::ToOne),
            "to-many" | "many" => Some(Cardinality::ToMany),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cardinality::ToOne => "to-one",
            Cardinality::ToMany => "to-many",
        }
    }

    pub fn is_many(self) -> bool {
        matches!(self, Cardinality::ToMany)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<List>.<field>` identifier used in error paths
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    pub list: String,
    pub field: String,
}

impl FieldPath {
    pub fn new(list: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            list: list.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.list, self.field)
    }
}

/// Resolved description of one relationship field, fixed at build time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipFieldSpec {
    field_path: FieldPath,
    cardinality: Cardinality,
    ref_list: String,
    ref_field: Option<String>,
    nullable: bool,
}

impl RelationshipFieldSpec {
    pub fn new(field_path: FieldPath, cardinality: Cardinality, ref_list: impl Into<String>) -> Self {
        Self {
            field_path,
            cardinality,
            ref_list: ref_list.into(),
            ref_field: None,
            nullable: true,
        }
    }

    /// Shorthand for a nullable to-one field
    pub fn to_one(list: &str, field: &str, ref_list: &str) -> Self {
        Self::new(FieldPath::new(list, field), Cardinality::ToOne, ref_list)
    }

    /// Shorthand for a to-many field
    pub fn to_many(list: &str, field: &str, ref_list: &str) -> Self {
        Self::new(FieldPath::new(list, field), Cardinality::ToMany, ref_list)
    }

    pub fn with_ref_field(mut self, ref_field: impl Into<String>) -> Self {
        self.ref_field = Some(ref_field.into());
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn field_path(&self) -> &FieldPath {
        &self.field_path
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn ref_list(&self) -> &str {
        &self.ref_list
    }

    pub fn ref_field(&self) -> Option<&str> {
        self.ref_field.as_deref()
    }

    /// Whether a to-one value may be unset through `disconnect`
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }
}
