//! Reference-augmented schemas.
//!
//! An [`ObjectSchema`] is a structural description of one object type: an ordered list of
//! [`FieldDefinition`]s, each of which may carry [`ReferenceMetadata`] naming the relation whose
//! dependency collection supplies its options.
//!
//! # Module Organization
//!
//! - [`bridge`]: Builds an `ObjectSchema` from a JSON Schema document (`x-reference` keyword)
//! - [`field_names`]: The ordered [`FieldNameSource`] chain used to enumerate renderable fields
//! - [`registry`]: Thread-safe [`SchemaRegistry`] and the global [`SCHEMAS`] singleton
//!
//! ```rust
//! use relbind_core::{
//!     properties::{FieldType, ReferenceKind, ReferenceMetadata},
//!     schema::{FieldDefinition, ObjectSchema},
//! };
//!
//! let schema = ObjectSchema::new("character")
//!     .with_object_type("Character")
//!     .with_field(FieldDefinition::new("name", FieldType::Text).required())
//!     .with_field(FieldDefinition::relation(
//!         "worldId",
//!         ReferenceMetadata::single("world", "World"),
//!     ));
//!
//! assert_eq!(schema.field_names(), vec!["name", "worldId"]);
//! assert_eq!(
//!     schema.reference("worldId").map(|r| r.kind),
//!     Some(ReferenceKind::Single)
//! );
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::properties::{
    FieldConstraint, FieldConstraints, FieldType, ReferenceKind, ReferenceMetadata,
};

pub mod bridge;
pub mod field_names;
pub mod registry;

pub use bridge::{OBJECT_TYPE_KEYWORD, REFERENCE_KEYWORD};
pub use field_names::{
    AllowList, DataKeys, FieldNameChain, FieldNameSource, RawProperties, SchemaIntrospection,
};
pub use registry::{SchemaRegistry, SCHEMAS};

// First capitalized identifier in a free-text title or description.
static TYPE_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Z][A-Za-z0-9_]*)").expect("Pattern is a valid constant"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub value_type: FieldType,
    #[serde(default)]
    pub constraints: FieldConstraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<ReferenceMetadata>,
}

impl FieldDefinition {
    pub fn new<S: Into<String>>(name: S, value_type: FieldType) -> Self {
        FieldDefinition {
            name: name.into(),
            label: None,
            value_type,
            constraints: FieldConstraints::empty(),
            reference: None,
        }
    }

    /// A reference field. The value type follows the reference kind: a single reference stores
    /// a nullable identifier, a multi reference an ordered set of identifiers.
    pub fn relation<S: Into<String>>(name: S, reference: ReferenceMetadata) -> Self {
        let mut constraints = FieldConstraints::empty();
        if reference.kind == ReferenceKind::Single {
            constraints |= FieldConstraint::Nullable;
        }
        FieldDefinition {
            name: name.into(),
            label: None,
            value_type: reference.kind.value_type(),
            constraints,
            reference: Some(reference),
        }
    }

    pub fn with_label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.constraints |= FieldConstraint::Required;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.constraints |= FieldConstraint::Disabled;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.constraints |= FieldConstraint::ReadOnly;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.constraints |= FieldConstraint::Nullable;
        self
    }

    pub fn is_required(&self) -> bool {
        self.constraints.contains(FieldConstraint::Required)
    }

    /// Disabled and read-only fields both render as non-editable.
    pub fn is_disabled(&self) -> bool {
        self.constraints.contains(FieldConstraint::Disabled)
            || self.constraints.contains(FieldConstraint::ReadOnly)
    }

    pub fn reference_kind(&self) -> Option<ReferenceKind> {
        self.reference.as_ref().map(|r| r.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    /// Registry name of the schema.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    /// The source document this schema was bridged from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl ObjectSchema {
    pub fn new<S: Into<String>>(name: S) -> Self {
        ObjectSchema {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_object_type<S: Into<String>>(mut self, object_type: S) -> Self {
        self.object_type = Some(object_type.into());
        self
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Add a field, replacing any existing field of the same name in place.
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        if let Some(existing) = self.fields.iter_mut().find(|f| f.name == field.name) {
            tracing::debug!(
                "[ObjectSchema::with_field] Replacing field '{}' in schema '{}'",
                field.name,
                self.name
            );
            *existing = field;
        } else {
            self.fields.push(field);
        }
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order, as reported by the schema itself.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn reference(&self, name: &str) -> Option<&ReferenceMetadata> {
        self.field(name).and_then(|f| f.reference.as_ref())
    }

    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.reference.is_some())
    }

    /// Best-effort guess at the object type from the schema's title or description.
    ///
    /// This is a fallback for schemas that were not given an explicit
    /// [`object_type`](Self::object_type). It takes the first capitalized identifier of the
    /// title, then of the description, and strips a trailing `Schema` suffix. Callers that can
    /// name the object type should always do so.
    pub fn infer_object_type(&self) -> Option<String> {
        [self.title.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|text| {
                TYPE_WORD.captures(text).and_then(|caps| {
                    let word = caps.get(1)?.as_str();
                    let word = word.strip_suffix("Schema").unwrap_or(word);
                    (!word.is_empty()).then(|| word.to_string())
                })
            })
    }

    /// The explicit object type, or the inferred one when `infer` is set.
    pub fn resolve_object_type(&self, infer: bool) -> Option<String> {
        match &self.object_type {
            Some(object_type) => Some(object_type.clone()),
            None if infer => {
                let inferred = self.infer_object_type();
                tracing::debug!(
                    "[ObjectSchema::resolve_object_type] Inferred object type {:?} for schema '{}'",
                    inferred,
                    self.name
                );
                inferred
            }
            None => None,
        }
    }
}
