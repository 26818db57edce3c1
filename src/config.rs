use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::PathBuf,
};

use crate::{error::BindingError, properties::MAIN_OBJECT_KEY};

pub const DEFAULT_EMPTY_OPTIONS_MESSAGE: &str = "No options available";

/// Which attributes of a dependency record hold its identifier and its display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordAttributes {
    /// Tried in order; the first attribute present on a record is its identifier.
    pub id_keys: Vec<String>,
    pub display_key: String,
}

impl Default for RecordAttributes {
    fn default() -> Self {
        RecordAttributes {
            id_keys: vec!["id".to_string(), "_id".to_string()],
            display_key: "name".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    pub record: RecordAttributes,
    /// Helper text shown on reference fields whose dependency collection is empty.
    pub empty_options_message: String,
    pub default_object_key: String,
    /// Fall back to guessing an object type from schema title/description.
    pub infer_object_type: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        BindingConfig {
            record: RecordAttributes::default(),
            empty_options_message: DEFAULT_EMPTY_OPTIONS_MESSAGE.to_string(),
            default_object_key: MAIN_OBJECT_KEY.to_string(),
            infer_object_type: true,
        }
    }
}

impl BindingConfig {
    pub fn from_toml_str(content: &str) -> Result<BindingConfig, BindingError> {
        let config: BindingConfig = toml::from_str(content)?;
        if config.record.id_keys.is_empty() {
            return Err(BindingError::Config(
                "record.id_keys must name at least one identifier attribute".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, BindingError> {
        Ok(toml::to_string(self)?)
    }
}

pub trait BindingConfigProvider: Send + Sync {
    fn get_config(&self) -> Result<BindingConfig, BindingError>;
    fn set_config(&self, config: &BindingConfig) -> Result<(), BindingError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlConfigProvider { path }
    }
}

impl BindingConfigProvider for TomlConfigProvider {
    fn get_config(&self) -> Result<BindingConfig, BindingError> {
        tracing::debug!("Attempting to read binding config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using default binding config.");
            return Ok(BindingConfig::default());
        }
        let content = read_to_string(&self.path)?;
        BindingConfig::from_toml_str(&content)
    }

    fn set_config(&self, config: &BindingConfig) -> Result<(), BindingError> {
        tracing::debug!("Attempting to write binding config to: {:?}", &self.path);
        write(&self.path, config.to_toml_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_log::test;

    #[test]
    fn test_defaults() {
        let config = BindingConfig::default();
        assert_eq!(config.record.id_keys, vec!["id", "_id"]);
        assert_eq!(config.record.display_key, "name");
        assert_eq!(config.empty_options_message, "No options available");
        assert_eq!(config.default_object_key, "main");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BindingConfig::from_toml_str(
            r#"
empty_options_message = "Nothing to pick"

[record]
display_key = "title"
"#,
        )
        .unwrap();
        assert_eq!(config.empty_options_message, "Nothing to pick");
        assert_eq!(config.record.display_key, "title");
        assert_eq!(config.record.id_keys, vec!["id", "_id"]);
        assert!(config.infer_object_type);
    }

    #[test]
    fn test_empty_id_keys_rejected() {
        let err = BindingConfig::from_toml_str("[record]\nid_keys = []\n").unwrap_err();
        assert!(matches!(err, BindingError::Config(_)));
    }

    #[test]
    fn test_malformed_toml_is_serialization_error() {
        let err = BindingConfig::from_toml_str("record = [").unwrap_err();
        assert!(matches!(err, BindingError::Serialization(_)));
    }

    #[test]
    fn test_toml_provider_round_trip() {
        let dir = tempdir().unwrap();
        let provider = TomlConfigProvider::new(dir.path().join("binding.toml"));
        assert_eq!(provider.get_config().unwrap(), BindingConfig::default());

        let config = BindingConfig {
            default_object_key: "character".to_string(),
            ..Default::default()
        };
        provider.set_config(&config).unwrap();
        assert_eq!(provider.get_config().unwrap(), config);
    }
}
