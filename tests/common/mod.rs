//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use relbind_core::{dependencies::DependencyCollections, schema::ObjectSchema};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times. Later calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

#[allow(dead_code)]
pub fn map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// The JSON Schema of a user profile: a display name, one team and any number of roles.
#[allow(dead_code)]
pub fn user_schema_document() -> Value {
    json!({
        "title": "User profile",
        "type": "object",
        "properties": {
            "displayName": { "type": "string", "title": "Display name" },
            "teamId": {
                "type": ["string", "null"],
                "x-reference": { "relation": "teams", "kind": "single", "target": "Team" }
            },
            "roleIds": {
                "type": "array",
                "x-reference": { "relation": "roles", "kind": "multi", "target": "Role" }
            },
            "createdAt": { "type": "string", "readOnly": true }
        },
        "required": ["displayName"]
    })
}

#[allow(dead_code)]
pub fn user_schema() -> ObjectSchema {
    ObjectSchema::from_json_schema("user", &user_schema_document()).unwrap()
}

#[allow(dead_code)]
pub fn user_dependencies() -> DependencyCollections {
    DependencyCollections::from_json(&json!({
        "teams": [
            { "id": "t1", "name": "Platform" },
            { "id": "t2", "name": "Design" }
        ],
        "roles": [
            { "id": "admin", "name": "Administrator" },
            { "id": "editor", "name": "Editor" },
            { "id": "viewer", "name": "Viewer" }
        ]
    }))
    .unwrap()
}

/// Write `content` to `file_name` inside `temp_dir` and return its path.
#[allow(dead_code)]
pub fn write_file(temp_dir: &TempDir, file_name: &str, content: &str) -> PathBuf {
    let path = temp_dir.path().join(file_name);
    std::fs::write(&path, content).unwrap();
    path
}
