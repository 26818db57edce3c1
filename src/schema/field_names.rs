//! Field-name discovery.
//!
//! The renderable field list of an object is found by asking an ordered chain of
//! [`FieldNameSource`]s. The first source that yields a non-empty list wins:
//!
//! 1. [`AllowList`]: an explicit caller-supplied list
//! 2. [`SchemaIntrospection`]: the schema's own field definitions
//! 3. [`RawProperties`]: keys of the raw source document (`properties`, else `shape`)
//! 4. [`DataKeys`]: keys of the current data snapshot
//!
//! When every source comes up empty the field list is empty. That is not an error.

use serde_json::{Map, Value};

use super::ObjectSchema;

pub trait FieldNameSource {
    /// Short name used in log output.
    fn source_name(&self) -> &'static str;

    fn field_names(&self, schema: &ObjectSchema, data: &Map<String, Value>) -> Vec<String>;
}

#[derive(Debug, Clone, Default)]
pub struct AllowList(pub Vec<String>);

impl FieldNameSource for AllowList {
    fn source_name(&self) -> &'static str {
        "allow-list"
    }

    fn field_names(&self, _schema: &ObjectSchema, _data: &Map<String, Value>) -> Vec<String> {
        self.0.clone()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaIntrospection;

impl FieldNameSource for SchemaIntrospection {
    fn source_name(&self) -> &'static str {
        "schema"
    }

    fn field_names(&self, schema: &ObjectSchema, _data: &Map<String, Value>) -> Vec<String> {
        schema.field_names()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RawProperties;

impl FieldNameSource for RawProperties {
    fn source_name(&self) -> &'static str {
        "raw-schema"
    }

    fn field_names(&self, schema: &ObjectSchema, _data: &Map<String, Value>) -> Vec<String> {
        let Some(Value::Object(raw)) = &schema.raw else {
            return Vec::new();
        };
        ["properties", "shape"]
            .iter()
            .find_map(|keyword| raw.get(*keyword).and_then(Value::as_object))
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DataKeys;

impl FieldNameSource for DataKeys {
    fn source_name(&self) -> &'static str {
        "data"
    }

    fn field_names(&self, _schema: &ObjectSchema, data: &Map<String, Value>) -> Vec<String> {
        data.keys().cloned().collect()
    }
}

pub struct FieldNameChain {
    sources: Vec<Box<dyn FieldNameSource + Send + Sync>>,
}

impl Default for FieldNameChain {
    fn default() -> Self {
        FieldNameChain::standard(None)
    }
}

impl FieldNameChain {
    pub fn empty() -> Self {
        FieldNameChain {
            sources: Vec::new(),
        }
    }

    /// The standard chain, led by `allow_list` when one is given.
    pub fn standard(allow_list: Option<&[String]>) -> Self {
        let mut chain = FieldNameChain::empty();
        if let Some(names) = allow_list {
            chain = chain.with_source(AllowList(names.to_vec()));
        }
        chain
            .with_source(SchemaIntrospection)
            .with_source(RawProperties)
            .with_source(DataKeys)
    }

    pub fn with_source<S: FieldNameSource + Send + Sync + 'static>(mut self, source: S) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Names from the first source with a non-empty answer, de-duplicated in order.
    pub fn field_names(&self, schema: &ObjectSchema, data: &Map<String, Value>) -> Vec<String> {
        for source in self.sources.iter() {
            let names = source.field_names(schema, data);
            if names.is_empty() {
                continue;
            }
            tracing::debug!(
                "[FieldNameChain::field_names] {} field(s) for schema '{}' from {} source",
                names.len(),
                schema.name,
                source.source_name()
            );
            let mut unique: Vec<String> = Vec::with_capacity(names.len());
            for name in names {
                if !unique.contains(&name) {
                    unique.push(name);
                }
            }
            return unique;
        }
        tracing::debug!(
            "[FieldNameChain::field_names] No field names found for schema '{}'",
            schema.name
        );
        Vec::new()
    }
}
