//! Shared test utilities for binding and fieldset tests

use serde_json::{json, Map, Value};

use crate::{
    dependencies::DependencyCollections,
    properties::{FieldType, ReferenceMetadata},
    schema::{FieldDefinition, ObjectSchema},
};

/// Initialize logging for tests
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Unwrap a `json!` object literal into the map type object data uses.
pub fn map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A character sheet with one plain field, one belongs-to and one has-many reference.
pub fn character_schema() -> ObjectSchema {
    ObjectSchema::new("character")
        .with_object_type("Character")
        .with_field(FieldDefinition::new("name", FieldType::Text).required())
        .with_field(FieldDefinition::relation(
            "worldId",
            ReferenceMetadata::single("world", "World"),
        ))
        .with_field(FieldDefinition::relation(
            "itemIds",
            ReferenceMetadata::multi("items", "Item"),
        ))
}

pub fn character_dependencies() -> DependencyCollections {
    DependencyCollections::new()
        .with_collection(
            "world",
            vec![
                json!({ "id": "w1", "name": "Fantasy World" }),
                json!({ "id": "w3", "name": "Sci-Fi World" }),
            ],
        )
        .with_collection(
            "items",
            vec![
                json!({ "_id": "i1", "name": "Sword" }),
                json!({ "_id": "i2", "name": "Shield" }),
                json!({ "_id": "i3", "name": "Potion" }),
            ],
        )
}
