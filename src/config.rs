//! Store configuration
//!
//! Loaded from YAML or JSON. Every field has a default, so an empty document
//! is a valid configuration.
//!
//! ```yaml
//! index: flat
//! initial_capacity: 4096
//! ```

pub use crate::index::IndexKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Index strategy maintained alongside the triple map
    pub index: IndexKind,
    /// Number of triple records to reserve space for up front
    pub initial_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            index: IndexKind::Nested,
            initial_capacity: 0,
        }
    }
}

impl StoreConfig {
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let content = fs::read_to_string(path)?;
        let config = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };
        debug!("Loaded store config from {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.index, IndexKind::Nested);
    }

    #[test]
    fn test_parse_yaml_and_json() {
        let config = StoreConfig::from_yaml_str("index: flat\ninitial_capacity: 128\n").unwrap();
        assert_eq!(config.index, IndexKind::Flat);
        assert_eq!(config.initial_capacity, 128);

        let config = StoreConfig::from_json_str(r#"{"index": "scan"}"#).unwrap();
        assert_eq!(config.index, IndexKind::Scan);
        assert_eq!(config.initial_capacity, 0);
    }

    #[test]
    fn test_unknown_index_kind() {
        assert!(matches!(
            StoreConfig::from_yaml_str("index: btree"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = StoreConfig {
            index: IndexKind::Flat,
            initial_capacity: 7,
        };
        let yaml = config.to_yaml_string().unwrap();
        assert_eq!(StoreConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let mut file = Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "index: flat").unwrap();
        let config = StoreConfig::from_file(file.path()).unwrap();
        assert_eq!(config.index, IndexKind::Flat);

        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "index = \"flat\"").unwrap();
        assert!(matches!(
            StoreConfig::from_file(file.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
