//! Caller-supplied dependency collections.
//!
//! For every relation name the caller hands over an ordered snapshot of candidate target
//! records. The binding layer never fetches, caches or mutates them; it only reads each record's
//! identifier and display attributes to build picker options.

use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::{config::RecordAttributes, error::BindingError};

/// One selectable choice of a reference field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReferenceOption {
    pub id: String,
    pub label: String,
}

/// Render an identifier value as the canonical string form stored in object data.
///
/// Strings pass through verbatim and numbers are stringified. Anything else has no identifier
/// form.
pub fn identifier_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencyCollections {
    collections: HashMap<String, Vec<Value>>,
    attributes: HashMap<String, RecordAttributes>,
}

impl DependencyCollections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object mapping relation names to arrays of records.
    pub fn from_json(value: &Value) -> Result<Self, BindingError> {
        let Value::Object(map) = value else {
            return Err(BindingError::Serialization(format!(
                "dependency collections must be a JSON object, found {value}"
            )));
        };
        let mut deps = DependencyCollections::new();
        for (relation, records) in map.iter() {
            let Value::Array(records) = records else {
                return Err(BindingError::Serialization(format!(
                    "dependency collection '{relation}' must be an array of records"
                )));
            };
            deps.collections.insert(relation.clone(), records.clone());
        }
        Ok(deps)
    }

    pub fn with_collection<S: Into<String>>(mut self, relation: S, records: Vec<Value>) -> Self {
        self.insert(relation, records);
        self
    }

    /// Override identifier/display attributes for one relation.
    pub fn with_attributes<S: Into<String>>(
        mut self,
        relation: S,
        attributes: RecordAttributes,
    ) -> Self {
        self.attributes.insert(relation.into(), attributes);
        self
    }

    pub fn insert<S: Into<String>>(&mut self, relation: S, records: Vec<Value>) {
        self.collections.insert(relation.into(), records);
    }

    pub fn get(&self, relation: &str) -> Option<&[Value]> {
        self.collections.get(relation).map(Vec::as_slice)
    }

    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Attributes to read records of `relation` with, falling back to `defaults`.
    pub fn attributes_for<'a>(
        &'a self,
        relation: &str,
        defaults: &'a RecordAttributes,
    ) -> &'a RecordAttributes {
        self.attributes.get(relation).unwrap_or(defaults)
    }

    /// Picker options for `relation` in record order. An absent relation has no options.
    pub fn options(&self, relation: &str, defaults: &RecordAttributes) -> Vec<ReferenceOption> {
        let Some(records) = self.get(relation) else {
            tracing::debug!("[DependencyCollections::options] No collection for '{relation}'");
            return Vec::new();
        };
        let attributes = self.attributes_for(relation, defaults);
        records
            .iter()
            .filter_map(|record| {
                let option = record_option(record, attributes);
                if option.is_none() {
                    tracing::warn!(
                        "[DependencyCollections::options] Skipping record without identifier \
                         ({:?}) in '{relation}': {record}",
                        attributes.id_keys
                    );
                }
                option
            })
            .collect()
    }
}

fn record_option(record: &Value, attributes: &RecordAttributes) -> Option<ReferenceOption> {
    let fields: &Map<String, Value> = record.as_object()?;
    let id = attributes
        .id_keys
        .iter()
        .find_map(|key| fields.get(key).and_then(identifier_string))?;
    let label = fields
        .get(&attributes.display_key)
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| id.clone());
    Some(ReferenceOption { id, label })
}
