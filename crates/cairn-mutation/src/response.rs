//! Mutation responses

use cairn_validation::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of an item's result, e.g. `createEvent` or `createEvents.1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPath(Vec<PathSegment>);

impl ItemPath {
    pub fn single(operation: impl Into<String>) -> Self {
        Self(vec![PathSegment::Key(operation.into())])
    }

    pub fn batch(operation: impl Into<String>, index: usize) -> Self {
        Self(vec![PathSegment::Key(operation.into()), PathSegment::Index(index)])
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Key(key) => f.write_str(key)?,
                PathSegment::Index(index) => write!(f, "{}", index)?,
            }
        }
        Ok(())
    }
}

/// One entry of a response's error list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    /// `<itemPath>.<fieldPath>`, or just `<itemPath>` for item-level failures
    pub path: String,
    pub message: String,
    pub code: String,
}

impl ResponseError {
    /// Render a field-scoped input error for the item at `item_path`
    pub fn input(item_path: &ItemPath, error: &ValidationError) -> Self {
        Self {
            path: error.scoped_path(&item_path.to_string()),
            message: format!("Input error: {}", error.message),
            code: error.code.clone(),
        }
    }

    pub fn item(item_path: &ItemPath, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: item_path.to_string(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Result of one mutation: `data` holds a single key named after the
/// operation, errors are listed in item submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResponse {
    pub operation: String,
    pub data: Value,
    pub errors: Vec<ResponseError>,
}

impl MutationResponse {
    pub(crate) fn new(operation: String, result: Value, errors: Vec<ResponseError>) -> Self {
        let mut data = Map::new();
        data.insert(operation.clone(), result);
        let data = Value::Object(data);
        Self {
            operation,
            data,
            errors,
        }
    }

    /// The operation's result: an item, `null`, or an array of slots
    pub fn result(&self) -> &Value {
        &self.data[self.operation.as_str()]
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors whose path starts with `item_path`
    pub fn errors_for(&self, item_path: &ItemPath) -> Vec<&ResponseError> {
        let exact = item_path.to_string();
        let prefix = format!("{}.", exact);
        self.errors
            .iter()
            .filter(|error| error.path == exact || error.path.starts_with(&prefix))
            .collect()
    }

    pub fn to_json(&self) -> Value {
        if self.errors.is_empty() {
            json!({ "data": self.data })
        } else {
            json!({ "data": self.data, "errors": self.errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_path_display() {
        assert_eq!(ItemPath::single("createEvent").to_string(), "createEvent");
        assert_eq!(ItemPath::batch("createEvents", 1).to_string(), "createEvents.1");
    }

    #[test]
    fn test_input_error_rendering() {
        let error = ValidationError::with_code("Event.group", "Bad directive.", "rule");
        let rendered = ResponseError::input(&ItemPath::batch("createEvents", 2), &error);

        assert_eq!(rendered.path, "createEvents.2.Event.group");
        assert_eq!(rendered.message, "Input error: Bad directive.");
        assert_eq!(rendered.code, "rule");
    }

    #[test]
    fn test_errors_for_does_not_match_sibling_indexes() {
        let response = MutationResponse::new(
            "createEvents".to_string(),
            json!([null, null]),
            vec![
                ResponseError::item(&ItemPath::batch("createEvents", 1), "x", "write_failed"),
                ResponseError::item(&ItemPath::batch("createEvents", 10), "y", "write_failed"),
            ],
        );

        assert_eq!(response.errors_for(&ItemPath::batch("createEvents", 1)).len(), 1);
        assert_eq!(response.to_json()["errors"].as_array().map(Vec::len), Some(2));
    }
}
