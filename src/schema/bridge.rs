//! JSON Schema bridge.
//!
//! Reads the subset of JSON Schema that form schemas use (`title`, `description`, `properties`,
//! `required`, `type`, `readOnly`) plus two extension keywords:
//!
//! - `x-object-type`: explicit object type of the schema
//! - `x-reference`: `{ "relation": "...", "kind": "single" | "multi", "target": "..." }`
//!
//! ```rust
//! use relbind_core::{properties::ReferenceKind, schema::ObjectSchema};
//! use serde_json::json;
//!
//! let schema = ObjectSchema::from_json_schema(
//!     "character",
//!     &json!({
//!         "title": "Character",
//!         "type": "object",
//!         "properties": {
//!             "name": { "type": "string" },
//!             "worldId": {
//!                 "type": ["string", "null"],
//!                 "x-reference": { "relation": "world", "kind": "single", "target": "World" }
//!             }
//!         },
//!         "required": ["name"]
//!     }),
//! )
//! .unwrap();
//!
//! assert!(schema.field("name").unwrap().is_required());
//! assert_eq!(schema.reference("worldId").unwrap().kind, ReferenceKind::Single);
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{FieldDefinition, ObjectSchema};
use crate::{
    error::BindingError,
    properties::{FieldConstraint, FieldType, ReferenceKind, ReferenceMetadata, SchemaRef},
};

pub const REFERENCE_KEYWORD: &str = "x-reference";
pub const OBJECT_TYPE_KEYWORD: &str = "x-object-type";

#[derive(Debug, Deserialize)]
struct RawReference {
    relation: String,
    kind: ReferenceKind,
    #[serde(default)]
    target: Option<String>,
}

impl ObjectSchema {
    pub fn from_json_schema(name: &str, document: &Value) -> Result<ObjectSchema, BindingError> {
        let Value::Object(doc) = document else {
            return Err(BindingError::InvalidSchema(format!(
                "schema '{name}' must be a JSON object"
            )));
        };

        if let Some(doc_type) = doc.get("type") {
            if doc_type.as_str() != Some("object") {
                return Err(BindingError::InvalidSchema(format!(
                    "schema '{name}' must have type \"object\", found {doc_type}"
                )));
            }
        }

        let required = required_names(name, doc)?;
        let mut schema = ObjectSchema::new(name).with_raw(document.clone());
        schema.title = string_keyword(doc, "title");
        schema.description = string_keyword(doc, "description");
        schema.object_type = string_keyword(doc, OBJECT_TYPE_KEYWORD);

        match doc.get("properties") {
            None => {
                tracing::debug!(
                    "[ObjectSchema::from_json_schema] Schema '{name}' declares no properties"
                );
            }
            Some(Value::Object(properties)) => {
                for (field_name, property) in properties.iter() {
                    let field = parse_field(
                        name,
                        field_name,
                        property,
                        required.iter().any(|r| r == field_name),
                    )?;
                    schema.fields.push(field);
                }
            }
            Some(other) => {
                return Err(BindingError::InvalidSchema(format!(
                    "schema '{name}': \"properties\" must be an object, found {other}"
                )));
            }
        }

        Ok(schema)
    }
}

fn string_keyword(doc: &Map<String, Value>, keyword: &str) -> Option<String> {
    doc.get(keyword).and_then(Value::as_str).map(str::to_string)
}

fn required_names(schema_name: &str, doc: &Map<String, Value>) -> Result<Vec<String>, BindingError> {
    match doc.get("required") {
        None => Ok(Vec::new()),
        Some(Value::Array(names)) => names
            .iter()
            .map(|n| {
                n.as_str().map(str::to_string).ok_or_else(|| {
                    BindingError::InvalidSchema(format!(
                        "schema '{schema_name}': \"required\" entries must be strings, found {n}"
                    ))
                })
            })
            .collect(),
        Some(other) => Err(BindingError::InvalidSchema(format!(
            "schema '{schema_name}': \"required\" must be an array, found {other}"
        ))),
    }
}

/// Returns the declared value type (if any) and whether `null` is an accepted type.
fn declared_type(property: &Map<String, Value>) -> (Option<FieldType>, bool) {
    match property.get("type") {
        Some(Value::String(t)) => (FieldType::from_json_type(t), t == "null"),
        Some(Value::Array(types)) => {
            let mut nullable = false;
            let mut value_type = None;
            for t in types.iter().filter_map(Value::as_str) {
                if t == "null" {
                    nullable = true;
                } else if value_type.is_none() {
                    value_type = FieldType::from_json_type(t);
                }
            }
            (value_type, nullable)
        }
        _ => (None, false),
    }
}

fn parse_field(
    schema_name: &str,
    field_name: &str,
    property: &Value,
    required: bool,
) -> Result<FieldDefinition, BindingError> {
    let property = match property {
        Value::Object(property) => property,
        // `true` is the JSON Schema spelling of "anything goes"
        Value::Bool(true) => {
            let mut field = FieldDefinition::new(field_name, FieldType::Any);
            if required {
                field = field.required();
            }
            return Ok(field);
        }
        other => {
            return Err(BindingError::InvalidSchema(format!(
                "schema '{schema_name}': property '{field_name}' must be an object, found {other}"
            )));
        }
    };

    let (value_type, nullable) = declared_type(property);

    let mut field = match property.get(REFERENCE_KEYWORD) {
        Some(raw) => {
            let raw: RawReference = serde_json::from_value(raw.clone()).map_err(|e| {
                BindingError::InvalidSchema(format!(
                    "schema '{schema_name}': invalid {REFERENCE_KEYWORD} on '{field_name}': {e}"
                ))
            })?;
            let expected = raw.kind.value_type();
            if let Some(declared) = value_type {
                if declared != expected {
                    return Err(BindingError::InvalidSchema(format!(
                        "schema '{schema_name}': {} reference field '{field_name}' must be of \
                         type {expected}, declared {declared}",
                        raw.kind
                    )));
                }
            }
            let target = raw.target.unwrap_or_else(|| raw.relation.clone());
            FieldDefinition::relation(
                field_name,
                ReferenceMetadata {
                    relation_name: raw.relation,
                    kind: raw.kind,
                    target_shape: SchemaRef::new(target),
                },
            )
        }
        None => FieldDefinition::new(field_name, value_type.unwrap_or_default()),
    };

    field.label = property
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string);
    if required {
        field.constraints |= FieldConstraint::Required;
    }
    if nullable {
        field.constraints |= FieldConstraint::Nullable;
    }
    if property.get("readOnly").and_then(Value::as_bool) == Some(true) {
        field.constraints |= FieldConstraint::ReadOnly;
    }
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_log::test;

    fn character_schema() -> Value {
        json!({
            "title": "Character",
            "description": "A playable Character",
            "type": "object",
            "properties": {
                "name": { "type": "string", "title": "Character Name" },
                "level": { "type": "integer", "readOnly": true },
                "worldId": {
                    "type": ["string", "null"],
                    "x-reference": { "relation": "world", "kind": "single", "target": "World" }
                },
                "itemIds": {
                    "type": "array",
                    "items": { "type": "string" },
                    "x-reference": { "relation": "items", "kind": "multi" }
                },
                "notes": true
            },
            "required": ["name", "worldId"]
        })
    }

    #[test]
    fn test_bridge_reads_fields_in_declared_order() {
        let schema = ObjectSchema::from_json_schema("character", &character_schema()).unwrap();
        assert_eq!(
            schema.field_names(),
            vec!["name", "level", "worldId", "itemIds", "notes"]
        );
        assert_eq!(schema.title.as_deref(), Some("Character"));
        assert!(schema.raw.is_some());
    }

    #[test]
    fn test_bridge_reads_constraints() {
        let schema = ObjectSchema::from_json_schema("character", &character_schema()).unwrap();
        let name = schema.field("name").unwrap();
        assert!(name.is_required());
        assert_eq!(name.label.as_deref(), Some("Character Name"));

        let level = schema.field("level").unwrap();
        assert_eq!(level.value_type, FieldType::Integer);
        assert!(level.is_disabled());

        let world = schema.field("worldId").unwrap();
        assert!(world.is_required());
        assert!(world.constraints.contains(FieldConstraint::Nullable));

        assert_eq!(schema.field("notes").unwrap().value_type, FieldType::Any);
    }

    #[test]
    fn test_bridge_reads_reference_metadata() {
        let schema = ObjectSchema::from_json_schema("character", &character_schema()).unwrap();
        let world = schema.reference("worldId").unwrap();
        assert_eq!(world.relation_name, "world");
        assert_eq!(world.kind, ReferenceKind::Single);
        assert_eq!(world.target_shape.as_str(), "World");

        // Target defaults to the relation name
        let items = schema.reference("itemIds").unwrap();
        assert_eq!(items.kind, ReferenceKind::Multi);
        assert_eq!(items.target_shape.as_str(), "items");
        assert_eq!(schema.reference_fields().count(), 2);
        assert!(schema.reference("name").is_none());
    }

    #[test]
    fn test_bridge_rejects_kind_type_conflict() {
        let doc = json!({
            "type": "object",
            "properties": {
                "worldId": {
                    "type": "array",
                    "x-reference": { "relation": "world", "kind": "single" }
                }
            }
        });
        let err = ObjectSchema::from_json_schema("bad", &doc).unwrap_err();
        assert!(matches!(err, BindingError::InvalidSchema(_)), "{err}");
    }

    #[test]
    fn test_bridge_rejects_non_object_documents() {
        assert!(ObjectSchema::from_json_schema("bad", &json!([1, 2])).is_err());
        assert!(ObjectSchema::from_json_schema("bad", &json!({ "type": "array" })).is_err());
        assert!(
            ObjectSchema::from_json_schema("bad", &json!({ "properties": { "a": 3 } })).is_err()
        );
    }

    #[test]
    fn test_bridge_without_properties_is_empty() {
        let schema = ObjectSchema::from_json_schema("empty", &json!({ "type": "object" })).unwrap();
        assert!(schema.fields.is_empty());
    }
}
