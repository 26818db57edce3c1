/// [crate::properties] contains the basic building blocks shared by schemas, object data
/// entries and rendered fieldsets.
pub use enumset::EnumSet;
use enumset::EnumSetType;
use serde::{Deserialize, Serialize};
use std::{
    borrow::Borrow,
    fmt::{Display, Formatter},
    ops::Deref,
};

use crate::{error::BindingError, schema::ObjectSchema, schema::SchemaRegistry};

/// Reserved key for the primary object of a binding scope.
pub const MAIN_OBJECT_KEY: &str = "main";

/// Logical name of one bound object within a scope.
#[derive(Clone, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new<S: Into<String>>(key: S) -> Self {
        ObjectKey(key.into())
    }

    pub fn main() -> Self {
        ObjectKey(MAIN_OBJECT_KEY.to_string())
    }

    pub fn is_main(&self) -> bool {
        self.0 == MAIN_OBJECT_KEY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ObjectKey {
    fn default() -> Self {
        ObjectKey::main()
    }
}

impl Deref for ObjectKey {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ObjectKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectKey {
    fn from(key: &str) -> Self {
        ObjectKey(key.to_string())
    }
}

impl From<String> for ObjectKey {
    fn from(key: String) -> Self {
        ObjectKey(key)
    }
}

impl Display for ObjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a reference field points at one record (belongs-to) or an ordered set of records
/// (has-many).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Single,
    Multi,
}

impl ReferenceKind {
    /// The value type a field of this kind stores.
    pub fn value_type(&self) -> FieldType {
        match self {
            ReferenceKind::Single => FieldType::Text,
            ReferenceKind::Multi => FieldType::List,
        }
    }
}

impl Display for ReferenceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceKind::Single => write!(f, "single"),
            ReferenceKind::Multi => write!(f, "multi"),
        }
    }
}

/// Names the shape of the records a reference field points at. Resolved through a
/// [SchemaRegistry].
#[derive(Clone, Debug, Default, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SchemaRef(pub String);

impl SchemaRef {
    pub fn new<S: Into<String>>(name: S) -> Self {
        SchemaRef(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SchemaRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relationship metadata attached to a single schema field.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceMetadata {
    /// Key into the caller-supplied dependency collections.
    pub relation_name: String,
    pub kind: ReferenceKind,
    pub target_shape: SchemaRef,
}

impl ReferenceMetadata {
    pub fn single<R: Into<String>, T: Into<String>>(relation_name: R, target_shape: T) -> Self {
        ReferenceMetadata {
            relation_name: relation_name.into(),
            kind: ReferenceKind::Single,
            target_shape: SchemaRef::new(target_shape),
        }
    }

    pub fn multi<R: Into<String>, T: Into<String>>(relation_name: R, target_shape: T) -> Self {
        ReferenceMetadata {
            relation_name: relation_name.into(),
            kind: ReferenceKind::Multi,
            target_shape: SchemaRef::new(target_shape),
        }
    }

    /// Look up the target record shape in `registry`.
    pub fn target_schema(
        &self,
        registry: &SchemaRegistry,
    ) -> Result<std::sync::Arc<ObjectSchema>, BindingError> {
        registry.require(self.target_shape.as_str())
    }
}

#[derive(EnumSetType, Debug, Serialize, Deserialize)]
#[enumset(serialize_repr = "list")]
pub enum FieldConstraint {
    Required,
    Disabled,
    ReadOnly,
    Nullable,
}

pub type FieldConstraints = EnumSet<FieldConstraint>;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Integer,
    Boolean,
    List,
    Object,
    #[default]
    Any,
}

impl FieldType {
    /// Map a JSON schema `type` keyword value to a field type.
    pub fn from_json_type(json_type: &str) -> Option<FieldType> {
        match json_type {
            "string" => Some(FieldType::Text),
            "number" => Some(FieldType::Number),
            "integer" => Some(FieldType::Integer),
            "boolean" => Some(FieldType::Boolean),
            "array" => Some(FieldType::List),
            "object" => Some(FieldType::Object),
            _ => None,
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::List => "list",
            FieldType::Object => "object",
            FieldType::Any => "any",
        };
        write!(f, "{name}")
    }
}
