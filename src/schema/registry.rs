// Schema registry for reference-augmented object schemas
//
// Schemas are registered by name so that reference metadata can name its target shape and the
// CLI and host applications can look a schema up without threading it through every call.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};

use super::ObjectSchema;
use crate::error::BindingError;

/// Global singleton schema registry
pub static SCHEMAS: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::default);

/// Thread-safe registry of [`ObjectSchema`]s keyed by schema name.
#[derive(Clone, Default)]
pub struct SchemaRegistry(Arc<RwLock<HashMap<String, Arc<ObjectSchema>>>>);

impl SchemaRegistry {
    /// Register a schema under its own name.
    ///
    /// If a schema with this name already exists, it will be overwritten and a log message emitted.
    pub fn register(&self, schema: ObjectSchema) -> Arc<ObjectSchema> {
        let mut writer = self.0.write();
        if writer.contains_key(&schema.name) {
            tracing::info!(
                "[SchemaRegistry::register] Overwriting existing schema: {}",
                schema.name
            );
        }
        let schema = Arc::new(schema);
        writer.insert(schema.name.clone(), schema.clone());
        schema
    }

    /// Bridge a JSON schema document and register the result.
    pub fn register_json(
        &self,
        name: &str,
        document: &Value,
    ) -> Result<Arc<ObjectSchema>, BindingError> {
        let schema = ObjectSchema::from_json_schema(name, document)?;
        Ok(self.register(schema))
    }

    /// Returns a cheap Arc clone if the schema exists.
    pub fn get(&self, schema_name: &str) -> Option<Arc<ObjectSchema>> {
        self.0.read().get(schema_name).cloned()
    }

    /// Like [`get`](Self::get), but a missing schema is a configuration error.
    pub fn require(&self, schema_name: &str) -> Result<Arc<ObjectSchema>, BindingError> {
        self.get(schema_name)
            .ok_or_else(|| BindingError::MissingSchema(schema_name.to_string()))
    }

    /// List all registered schema names, sorted.
    pub fn list_schemas(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        properties::{FieldType, ReferenceMetadata},
        schema::FieldDefinition,
    };
    use serde_json::json;
    use test_log::test;

    #[test]
    fn test_schema_registration() {
        let registry = SchemaRegistry::default();
        registry.register(ObjectSchema::new("world"));
        assert!(registry.get("world").is_some());
        assert!(registry.get("character").is_none());
    }

    #[test]
    fn test_schema_overwrite() {
        let registry = SchemaRegistry::default();
        registry.register(
            ObjectSchema::new("test.overwrite")
                .with_field(FieldDefinition::new("field1", FieldType::Text)),
        );
        registry.register(
            ObjectSchema::new("test.overwrite")
                .with_field(FieldDefinition::new("field2", FieldType::Text)),
        );

        let retrieved = registry.get("test.overwrite").unwrap();
        assert_eq!(retrieved.field_names(), vec!["field2"]);
    }

    #[test]
    fn test_require_missing_schema() {
        let registry = SchemaRegistry::default();
        assert_eq!(
            registry.require("nope").unwrap_err(),
            BindingError::MissingSchema("nope".to_string())
        );
    }

    #[test]
    fn test_reference_target_resolves_through_registry() {
        let registry = SchemaRegistry::default();
        registry
            .register_json(
                "World",
                &json!({ "type": "object", "properties": { "name": { "type": "string" } } }),
            )
            .unwrap();
        let reference = ReferenceMetadata::single("world", "World");
        let target = reference.target_schema(&registry).unwrap();
        assert_eq!(target.field_names(), vec!["name"]);

        let dangling = ReferenceMetadata::single("guild", "Guild");
        assert!(dangling.target_schema(&registry).is_err());
    }

    #[test]
    fn test_arc_clone_cheap() {
        let registry = SchemaRegistry::default();
        registry.register(ObjectSchema::new("world"));
        let schema1 = registry.get("world").unwrap();
        let schema2 = registry.get("world").unwrap();
        assert!(Arc::ptr_eq(&schema1, &schema2));
    }

    #[test]
    fn test_global_schemas_singleton() {
        SCHEMAS.register(ObjectSchema::new("downstream.custom"));
        assert!(SCHEMAS.list_schemas().contains(&"downstream.custom".to_string()));
    }

    #[test]
    fn test_global_registry_resolves_scenario_references() {
        SCHEMAS
            .register_json(
                "scenario.World",
                &json!({ "type": "object", "properties": { "name": { "type": "string" } } }),
            )
            .unwrap();
        SCHEMAS
            .register_json(
                "scenario.character",
                &json!({
                    "type": "object",
                    "properties": {
                        "worldId": {
                            "x-reference": { "relation": "world", "kind": "single", "target": "scenario.World" }
                        }
                    }
                }),
            )
            .unwrap();

        let character = SCHEMAS.require("scenario.character").unwrap();
        let reference = character.reference("worldId").unwrap();
        let world = reference.target_schema(&SCHEMAS).unwrap();
        assert_eq!(world.field_names(), vec!["name"]);
    }

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let handles: Vec<_> = (0..5)
            .map(|i| {
                thread::spawn(move || {
                    SCHEMAS.register(ObjectSchema::new(format!("concurrent.test{i}")));
                    SCHEMAS.get(&format!("concurrent.test{i}"))
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_some());
        }
    }
}
