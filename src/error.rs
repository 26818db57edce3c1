use std::io;

use regex::Error as RegexError;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

/// Coarse grouping of [`BindingError`] variants.
///
/// Configuration and ambiguity errors are programmer-facing and must surface immediately.
/// Infrastructure errors come from file I/O and parsing around the binding layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    Configuration,
    Ambiguity,
    Infrastructure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum BindingError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    #[error("Field '{field}' holds {actual} values, but a {expected} reference change was applied")]
    KindMismatch {
        field: String,
        expected: String,
        actual: String,
    },
    #[error("{0} is missing: object data was accessed outside of an enclosing binding scope")]
    MissingProvider(String),
    #[error("Schema not found: {0}")]
    MissingSchema(String),
    #[error("No rendered fieldset matches {0}")]
    NotFound(String),
    #[error("Found {count} rendered fieldsets matching {address}; an index in 0..{count} is required to pick one")]
    Ambiguous { count: usize, address: String },
    #[error("Index {index} is out of bounds: {count} rendered fieldsets match {address} (valid range 0..{count})")]
    IndexOutOfBounds {
        count: usize,
        index: usize,
        address: String,
    },
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl BindingError {
    pub fn class(&self) -> ErrorClass {
        match self {
            BindingError::Config(_) => ErrorClass::Configuration,
            BindingError::Io(_) => ErrorClass::Infrastructure,
            BindingError::InvalidSchema(_) => ErrorClass::Configuration,
            BindingError::KindMismatch { .. } => ErrorClass::Configuration,
            BindingError::MissingProvider(_) => ErrorClass::Configuration,
            BindingError::MissingSchema(_) => ErrorClass::Configuration,
            BindingError::NotFound(_) => ErrorClass::Ambiguity,
            BindingError::Ambiguous { .. } => ErrorClass::Ambiguity,
            BindingError::IndexOutOfBounds { .. } => ErrorClass::Ambiguity,
            BindingError::Serialization(_) => ErrorClass::Infrastructure,
        }
    }
}

impl From<toml::de::Error> for BindingError {
    fn from(src: toml::de::Error) -> BindingError {
        BindingError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for BindingError {
    fn from(src: toml::ser::Error) -> BindingError {
        BindingError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for BindingError {
    fn from(src: JsonError) -> BindingError {
        BindingError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for BindingError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => BindingError::Io(format!("not found: {x}")),
            _ => BindingError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<RegexError> for BindingError {
    fn from(x: RegexError) -> Self {
        BindingError::Config(format!("Regex parse failed: {x}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_error_classes() {
        assert_eq!(
            BindingError::MissingProvider("ObjectDataProvider".to_string()).class(),
            ErrorClass::Configuration
        );
        assert_eq!(
            BindingError::Ambiguous {
                count: 3,
                address: "User".to_string()
            }
            .class(),
            ErrorClass::Ambiguity
        );
        assert_eq!(
            BindingError::Io("boom".to_string()).class(),
            ErrorClass::Infrastructure
        );
    }

    #[test]
    fn test_ambiguity_messages_name_count_and_range() {
        let err = BindingError::IndexOutOfBounds {
            count: 3,
            index: 5,
            address: "object type 'User'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Index 5"), "{msg}");
        assert!(msg.contains("3 rendered fieldsets"), "{msg}");
        assert!(msg.contains("0..3"), "{msg}");
        assert!(msg.contains("object type 'User'"), "{msg}");
    }

    #[test]
    fn test_missing_provider_names_provider() {
        let err = BindingError::MissingProvider("ObjectDataProvider".to_string());
        assert!(err.to_string().starts_with("ObjectDataProvider is missing"));
    }
}
