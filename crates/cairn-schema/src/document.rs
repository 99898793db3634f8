//! Serialized schema declarations (YAML or JSON)
//!
//! Documents can declare stored fields and relationships. Virtual fields need
//! a resolver and are only available through the builder API.

use crate::error::{SchemaError, SchemaResult};
use crate::field::{checkbox, integer, relationship, text, FieldDefinition};
use crate::list::ListDefinition;
use crate::relationship::FieldPath;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub lists: Vec<ListDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDocument {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
}

impl SchemaDocument {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Turn the document into list definitions ready for [`crate::SchemaBuilder`]
    pub fn into_lists(self) -> SchemaResult<Vec<ListDefinition>> {
        self.lists.into_iter().map(ListDocument::into_list).collect()
    }
}

impl ListDocument {
    fn into_list(self) -> SchemaResult<ListDefinition> {
        let mut list = ListDefinition::new(&self.key);
        if let Some(plural) = self.plural {
            list = list.plural(plural);
        }
        for field in self.fields {
            let path = FieldPath::new(&self.key, &field.name);
            let definition = field.definition(&path)?;
            list = list.field(field.name, definition);
        }
        Ok(list)
    }
}

impl FieldDocument {
    fn definition(&self, path: &FieldPath) -> SchemaResult<FieldDefinition> {
        match self.field_type.as_str() {
            "text" => Ok(text()),
            "integer" => Ok(integer()),
            "checkbox" => Ok(checkbox()),
            "relationship" => {
                let target = self
                    .target
                    .as_ref()
                    .ok_or_else(|| SchemaError::MissingRef {
                        field_path: path.to_string(),
                    })?;
                let mut field = relationship(target).nullable(self.nullable.unwrap_or(true));
                if let Some(cardinality) = &self.cardinality {
                    field = field.cardinality(cardinality);
                }
                Ok(field.into())
            }
            other => Err(SchemaError::UnknownFieldType {
                field_path: path.to_string(),
                field_type: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENTS: &str = r#"
lists:
  - key: Group
    fields:
      - name: name
        type: text
  - key: Event
    fields:
      - name: title
        type: text
      - name: group
        type: relationship
        ref: Group
        cardinality: to-one
"#;

    #[test]
    fn test_yaml_document_parses() {
        let doc = SchemaDocument::from_yaml(EVENTS).unwrap();
        assert_eq!(doc.lists.len(), 2);
        assert_eq!(doc.lists[1].fields[1].target.as_deref(), Some("Group"));

        let lists = doc.into_lists().unwrap();
        assert_eq!(lists[1].key(), "Event");
    }

    #[test]
    fn test_unknown_field_type_is_rejected() {
        let doc = SchemaDocument::from_json(
            r#"{ "lists": [{ "key": "Event", "fields": [{ "name": "when", "type": "timestamp" }] }] }"#,
        )
        .unwrap();

        assert_eq!(
            doc.into_lists().unwrap_err(),
            SchemaError::UnknownFieldType {
                field_path: "Event.when".to_string(),
                field_type: "timestamp".to_string(),
            }
        );
    }

    #[test]
    fn test_relationship_without_ref_is_rejected() {
        let doc = SchemaDocument::from_json(
            r#"{ "lists": [{ "key": "Event", "fields": [{ "name": "group", "type": "relationship" }] }] }"#,
        )
        .unwrap();

        assert!(matches!(doc.into_lists(), Err(SchemaError::MissingRef { .. })));
    }
}
