//! Validation error types and handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single rule violation, scoped to a field path such as `Event.group`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationError {
    /// Field path the error belongs to
    pub path: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for programmatic handling
    pub code: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            code: "validation_failed".to_string(),
        }
    }

    /// Create a validation error with a specific code
    pub fn with_code(path: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::new(path, message)
        }
    }

    /// Full path once the caller knows which item this error belongs to,
    /// e.g. `createEvent.Event.group`
    pub fn scoped_path(&self, item_path: &str) -> String {
        format!("{}.{}", item_path, self.path)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Ordered collection of validation errors
///
/// Errors keep the order they were added in, so responses built from them
/// are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty validation errors collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add a single validation error
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add a simple validation error with path and message
    pub fn add_error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.add(ValidationError::new(path, message));
    }

    /// Check if there are any validation errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Total number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Get errors for a specific path
    pub fn get_field_errors(&self, path: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|error| error.path == path).collect()
    }

    /// Check if a specific path has errors
    pub fn has_field_errors(&self, path: &str) -> bool {
        self.errors.iter().any(|error| error.path == path)
    }

    /// Append another collection after the errors already held
    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// Create ValidationErrors from a single error
    pub fn from_error(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(error);
        errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "No validation errors")
        } else {
            write!(f, "Validation failed with {} error(s):", self.errors.len())?;
            for error in &self.errors {
                write!(f, "\n  - {}", error)?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::from_error(error)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_creation() {
        let error = ValidationError::new("Event.group", "Bad input");
        assert_eq!(error.path, "Event.group");
        assert_eq!(error.code, "validation_failed");
        assert_eq!(error.to_string(), "Event.group: Bad input");
        assert_eq!(error.scoped_path("createEvent"), "createEvent.Event.group");
    }

    #[test]
    fn test_errors_keep_insertion_order() {
        let mut errors = ValidationErrors::new();
        errors.add_error("Event.group", "first");
        errors.add_error("Event.tags", "second");
        errors.add_error("Event.group", "third");

        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third"]);
        assert_eq!(errors.get_field_errors("Event.group").len(), 2);
        assert!(!errors.has_field_errors("Event.title"));
    }

    #[test]
    fn test_merge_appends() {
        let mut first = ValidationErrors::from_error(ValidationError::new("A.a", "one"));
        let second = ValidationErrors::from_error(ValidationError::with_code("B.b", "two", "custom"));

        first.merge(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.errors[1].code, "custom");
    }
}
