//! Typed nested relationship inputs
//!
//! The shape of an input depends on the field's cardinality, so decoding is
//! driven by the [`RelationshipFieldSpec`] rather than by probing keys.

use crate::error::ValidationError;
use cairn_schema::{Cardinality, RelationshipFieldSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to an existing item, e.g. `{ "id": "..." }`. Opaque to validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemRef(pub Value);

/// Data for an item created inline. Opaque to validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreateData(pub Value);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToOneInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect: Option<ItemRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<CreateData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnect: Option<bool>,
}

impl ToOneInput {
    pub fn connect(item: ItemRef) -> Self {
        Self {
            connect: Some(item),
            ..Self::default()
        }
    }

    pub fn create(data: CreateData) -> Self {
        Self {
            create: Some(data),
            ..Self::default()
        }
    }

    pub fn disconnect() -> Self {
        Self {
            disconnect: Some(true),
            ..Self::default()
        }
    }

    pub fn disconnects(&self) -> bool {
        self.disconnect == Some(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToManyInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect: Option<Vec<ItemRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<Vec<CreateData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnect: Option<Vec<ItemRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<Vec<ItemRef>>,
}

impl ToManyInput {
    pub fn connects(&self) -> bool {
        non_empty(&self.connect)
    }

    pub fn disconnects(&self) -> bool {
        non_empty(&self.disconnect)
    }

    /// Whether nothing in the input has an effect
    pub fn is_noop(&self) -> bool {
        !self.connects() && !self.disconnects() && !non_empty(&self.create) && self.set.is_none()
    }
}

fn non_empty<T>(list: &Option<Vec<T>>) -> bool {
    list.as_ref().is_some_and(|items| !items.is_empty())
}

/// A nested relationship input, tagged by cardinality
#[derive(Debug, Clone, PartialEq)]
pub enum RelationshipInput {
    ToOne(ToOneInput),
    ToMany(ToManyInput),
}

impl RelationshipInput {
    pub fn cardinality(&self) -> Cardinality {
        match self {
            RelationshipInput::ToOne(_) => Cardinality::ToOne,
            RelationshipInput::ToMany(_) => Cardinality::ToMany,
        }
    }

    /// Decode the raw value supplied for `spec`'s field.
    ///
    /// `null` means the input was not given. A value of the wrong shape is a
    /// user input problem and comes back as a field-scoped error.
    pub fn from_json(spec: &RelationshipFieldSpec, value: &Value) -> Result<Option<Self>, ValidationError> {
        if value.is_null() {
            return Ok(None);
        }

        let decoded = match spec.cardinality() {
            Cardinality::ToOne => serde_json::from_value(value.clone()).map(RelationshipInput::ToOne),
            Cardinality::ToMany => serde_json::from_value(value.clone()).map(RelationshipInput::ToMany),
        };

        decoded.map(Some).map_err(|err| {
            ValidationError::with_code(
                spec.field_path().to_string(),
                format!("Invalid {} relationship input: {}", spec.cardinality(), err),
                "invalid_relationship_input",
            )
        })
    }
}
