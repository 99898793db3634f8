//! Relationship input validator

use crate::error::ValidationErrors;
use crate::input::RelationshipInput;
use crate::operation::OperationKind;
use crate::rules::RelationshipRule;
use cairn_schema::{Cardinality, RelationshipFieldSpec, SchemaError};
use serde_json::Value;

/// Checks nested relationship inputs against [`RelationshipRule`]s.
///
/// Stateless; one instance can be shared across threads and requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipInputValidator;

impl RelationshipInputValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a decoded input.
    ///
    /// Returns every violated rule as an error scoped to the field path. An
    /// absent input is always valid. `Err` means the caller paired the field
    /// with an input of the other cardinality, which is a wiring bug.
    pub fn validate(
        &self,
        spec: &RelationshipFieldSpec,
        operation: OperationKind,
        input: Option<&RelationshipInput>,
    ) -> Result<ValidationErrors, SchemaError> {
        let mut errors = ValidationErrors::new();
        let Some(input) = input else {
            return Ok(errors);
        };

        let violated: Vec<RelationshipRule> = match (spec.cardinality(), input) {
            (Cardinality::ToOne, RelationshipInput::ToOne(input)) => RelationshipRule::TO_ONE
                .into_iter()
                .filter(|rule| rule.violated_by_to_one(spec, operation, input))
                .collect(),
            (Cardinality::ToMany, RelationshipInput::ToMany(input)) => RelationshipRule::TO_MANY
                .into_iter()
                .filter(|rule| rule.violated_by_to_many(operation, input))
                .collect(),
            (cardinality, input) => {
                return Err(SchemaError::CardinalityMismatch {
                    field_path: spec.field_path().to_string(),
                    cardinality: cardinality.to_string(),
                    input: input.cardinality().to_string(),
                })
            }
        };

        for rule in violated {
            errors.add(rule.error(spec));
        }
        Ok(errors)
    }

    /// Decode a raw field value and validate it.
    ///
    /// A value that does not decode yields a single shape error.
    pub fn validate_json(
        &self,
        spec: &RelationshipFieldSpec,
        operation: OperationKind,
        value: Option<&Value>,
    ) -> Result<ValidationErrors, SchemaError> {
        let input = match value.map(|value| RelationshipInput::from_json(spec, value)) {
            None => None,
            Some(Ok(input)) => input,
            Some(Err(error)) => return Ok(ValidationErrors::from_error(error)),
        };
        self.validate(spec, operation, input.as_ref())
    }
}

/// Shorthand for [`RelationshipInputValidator::validate`]
pub fn validate_relationship_input(
    spec: &RelationshipFieldSpec,
    operation: OperationKind,
    input: Option<&RelationshipInput>,
) -> Result<ValidationErrors, SchemaError> {
    RelationshipInputValidator.validate(spec, operation, input)
}
