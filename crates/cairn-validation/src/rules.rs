//! The rules a nested relationship input must satisfy
//!
//! Rules are checked independently and every violation is reported. Two rules
//! share the same message text (`ToOneMissingDirective` and
//! `ToOneConflictingDirectives`) but keep distinct codes.

use crate::error::ValidationError;
use crate::input::{ToManyInput, ToOneInput};
use crate::operation::OperationKind;
use cairn_schema::{Cardinality, RelationshipFieldSpec};

pub const TO_ONE_CREATE_MESSAGE: &str =
    "You must provide \"connect\" or \"create\" in to-one relationship inputs for \"create\" operations.";

pub const DISCONNECT_CONFLICT_MESSAGE: &str =
    "You must not provide \"disconnect\" together with \"connect\" or \"create\" in to-one relationship inputs for \"update\" operations.";

pub const DISCONNECT_NOT_NULLABLE_MESSAGE: &str =
    "\"disconnect\" cannot be used on a to-one relationship that does not allow null.";

pub const SET_ON_CREATE_MESSAGE: &str =
    "\"set\" can only be used in to-many relationship inputs for \"update\" operations.";

pub const SET_WITH_INCREMENTAL_MESSAGE: &str =
    "You must not provide \"set\" together with \"connect\" or \"disconnect\" in to-many relationship inputs for \"update\" operations.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipRule {
    /// to-one create input with neither `connect` nor `create`
    ToOneMissingDirective,
    /// to-one input with both `connect` and `create`
    ToOneConflictingDirectives,
    /// to-one update input disconnecting while also connecting or creating
    ToOneDisconnectConflict,
    /// to-one update disconnecting a field that cannot be null
    DisconnectRequiresNullable,
    /// `disconnect` used while creating an item
    DisconnectOnCreate,
    /// to-many `set` used while creating an item
    SetOnCreate,
    /// to-many update mixing `set` with `connect` or `disconnect`
    SetWithIncremental,
}

impl RelationshipRule {
    /// Rules for to-one inputs, in reporting order
    pub const TO_ONE: [RelationshipRule; 5] = [
        RelationshipRule::ToOneMissingDirective,
        RelationshipRule::ToOneConflictingDirectives,
        RelationshipRule::ToOneDisconnectConflict,
        RelationshipRule::DisconnectRequiresNullable,
        RelationshipRule::DisconnectOnCreate,
    ];

    /// Rules for to-many inputs, in reporting order
    pub const TO_MANY: [RelationshipRule; 3] = [
        RelationshipRule::DisconnectOnCreate,
        RelationshipRule::SetOnCreate,
        RelationshipRule::SetWithIncremental,
    ];

    pub fn code(self) -> &'static str {
        match self {
            RelationshipRule::ToOneMissingDirective => "to_one_missing_directive",
            RelationshipRule::ToOneConflictingDirectives => "to_one_conflicting_directives",
            RelationshipRule::ToOneDisconnectConflict => "to_one_disconnect_conflict",
            RelationshipRule::DisconnectRequiresNullable => "disconnect_requires_nullable",
            RelationshipRule::DisconnectOnCreate => "disconnect_on_create",
            RelationshipRule::SetOnCreate => "set_on_create",
            RelationshipRule::SetWithIncremental => "set_with_incremental",
        }
    }

    pub fn message(self, cardinality: Cardinality) -> String {
        match self {
            RelationshipRule::ToOneMissingDirective | RelationshipRule::ToOneConflictingDirectives => {
                TO_ONE_CREATE_MESSAGE.to_string()
            }
            RelationshipRule::ToOneDisconnectConflict => DISCONNECT_CONFLICT_MESSAGE.to_string(),
            RelationshipRule::DisconnectRequiresNullable => DISCONNECT_NOT_NULLABLE_MESSAGE.to_string(),
            RelationshipRule::DisconnectOnCreate => format!(
                "\"disconnect\" can only be used in {} relationship inputs for \"update\" operations.",
                cardinality
            ),
            RelationshipRule::SetOnCreate => SET_ON_CREATE_MESSAGE.to_string(),
            RelationshipRule::SetWithIncremental => SET_WITH_INCREMENTAL_MESSAGE.to_string(),
        }
    }

    /// Error for `spec`'s field reporting this rule
    pub fn error(self, spec: &RelationshipFieldSpec) -> ValidationError {
        ValidationError::with_code(
            spec.field_path().to_string(),
            self.message(spec.cardinality()),
            self.code(),
        )
    }

    pub fn violated_by_to_one(self, spec: &RelationshipFieldSpec, operation: OperationKind, input: &ToOneInput) -> bool {
        let connects_or_creates = input.connect.is_some() || input.create.is_some();

        match self {
            RelationshipRule::ToOneMissingDirective => operation == OperationKind::Create && !connects_or_creates,
            RelationshipRule::ToOneConflictingDirectives => input.connect.is_some() && input.create.is_some(),
            RelationshipRule::ToOneDisconnectConflict => {
                operation == OperationKind::Update && input.disconnects() && connects_or_creates
            }
            RelationshipRule::DisconnectRequiresNullable => {
                operation == OperationKind::Update && input.disconnects() && !spec.is_nullable()
            }
            RelationshipRule::DisconnectOnCreate => operation == OperationKind::Create && input.disconnects(),
            RelationshipRule::SetOnCreate | RelationshipRule::SetWithIncremental => false,
        }
    }

    pub fn violated_by_to_many(self, operation: OperationKind, input: &ToManyInput) -> bool {
        match self {
            RelationshipRule::DisconnectOnCreate => operation == OperationKind::Create && input.disconnects(),
            RelationshipRule::SetOnCreate => operation == OperationKind::Create && input.set.is_some(),
            RelationshipRule::SetWithIncremental => {
                operation == OperationKind::Update
                    && input.set.is_some()
                    && (input.connects() || input.disconnects())
            }
            RelationshipRule::ToOneMissingDirective
            | RelationshipRule::ToOneConflictingDirectives
            | RelationshipRule::ToOneDisconnectConflict
            | RelationshipRule::DisconnectRequiresNullable => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<_> = RelationshipRule::TO_ONE
            .iter()
            .chain(RelationshipRule::TO_MANY.iter())
            .map(|rule| rule.code())
            .collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 7);
    }

    #[test]
    fn test_missing_and_conflicting_share_text() {
        assert_eq!(
            RelationshipRule::ToOneMissingDirective.message(Cardinality::ToOne),
            RelationshipRule::ToOneConflictingDirectives.message(Cardinality::ToOne)
        );
        assert_ne!(
            RelationshipRule::ToOneMissingDirective.code(),
            RelationshipRule::ToOneConflictingDirectives.code()
        );
    }

    #[test]
    fn test_disconnect_conflict_has_its_own_message() {
        let message = RelationshipRule::ToOneDisconnectConflict.message(Cardinality::ToOne);
        assert_eq!(message, DISCONNECT_CONFLICT_MESSAGE);
        assert_ne!(message, TO_ONE_CREATE_MESSAGE);
        assert!(message.starts_with("You must not provide \"disconnect\" together with"));
    }

    #[test]
    fn test_disconnect_message_names_cardinality() {
        assert_eq!(
            RelationshipRule::DisconnectOnCreate.message(Cardinality::ToMany),
            "\"disconnect\" can only be used in to-many relationship inputs for \"update\" operations."
        );
    }
}
