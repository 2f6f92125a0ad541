//! Engine configuration via `protean.toml`
//!
//! Every setting has a default, so an empty file (or no file at all) yields
//! the same engine as `EngineConfig::default()`.

use std::path::Path;

use protean_core::{normalize_name_or, PLACEHOLDER_ENTITY_NAME};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file name looked up by the CLI.
pub const CONFIG_FILE_NAME: &str = "protean.toml";

/// Default name of the open payload column of loose entities.
pub const DEFAULT_LOOSE_PAYLOAD_FIELD: &str = "data";

/// Default cap applied to any requested read `limit`.
pub const DEFAULT_MAX_READ_LIMIT: u64 = 1000;

/// Failures loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("failed to access config file '{path}': {message}")]
    Io {
        /// File path
        path: String,
        /// OS error text
        message: String,
    },

    /// File is not valid TOML for `EngineConfig`
    #[error("failed to parse config file '{path}': {message}")]
    Parse {
        /// File path
        path: String,
        /// Parser error text
        message: String,
    },

    /// A setting is out of range
    #[error("invalid setting '{setting}': {reason}")]
    Invalid {
        /// Setting name
        setting: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Engine configuration loaded from `protean.toml`.
///
/// # Example
///
/// ```toml
/// placeholder_name = "Entidad"
/// loose_payload_field = "data"
/// max_read_limit = 1000
/// infer_actions = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Entity name used when a raw name normalizes to nothing.
    pub placeholder_name: String,
    /// Name of the JSON payload column of loose entities.
    pub loose_payload_field: String,
    /// Upper bound for `options.limit` on reads.
    pub max_read_limit: u64,
    /// Infer a missing `action` from keywords in the reply text.
    pub infer_actions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            placeholder_name: PLACEHOLDER_ENTITY_NAME.to_string(),
            loose_payload_field: DEFAULT_LOOSE_PAYLOAD_FIELD.to_string(),
            max_read_limit: DEFAULT_MAX_READ_LIMIT,
            infer_actions: true,
        }
    }
}

impl EngineConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Protean engine configuration

# Entity name used when an agent-supplied name has no usable characters.
placeholder_name = "Entidad"

# Column holding the open JSON payload of entities nobody declared.
loose_payload_field = "data"

# Largest page a read may return; larger `limit` options are capped.
max_read_limit = 1000

# Guess a missing `action` from keywords in the reply ("crear", "listar", ...).
infer_actions = true
"#
    }

    /// Check settings and canonicalize the placeholder name.
    ///
    /// The placeholder is normalized so that it is itself a valid entity
    /// name (normalizing it again yields the same string).
    ///
    /// # Errors
    ///
    /// Returns an error if the payload field is empty or reserved, or the
    /// read limit is zero.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.loose_payload_field.trim().is_empty() {
            return Err(ConfigError::Invalid {
                setting: "loose_payload_field",
                reason: "must not be empty".into(),
            });
        }
        if protean_core::is_reserved(&self.loose_payload_field) {
            return Err(ConfigError::Invalid {
                setting: "loose_payload_field",
                reason: format!("'{}' is a system column", self.loose_payload_field),
            });
        }
        if self.max_read_limit == 0 {
            return Err(ConfigError::Invalid {
                setting: "max_read_limit",
                reason: "must be at least 1".into(),
            });
        }
        self.placeholder_name = normalize_name_or(&self.placeholder_name, PLACEHOLDER_ENTITY_NAME);
        Ok(self)
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        config.validated()
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: EngineConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validated()
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_toml_parses_to_default() {
        let config = EngineConfig::from_toml_str(EngineConfig::default_toml()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = EngineConfig::from_toml_str("max_read_limit = 50\n").unwrap();
        assert_eq!(config.max_read_limit, 50);
        assert_eq!(config.loose_payload_field, "data");
        assert_eq!(config.placeholder_name, "Entidad");
        assert!(config.infer_actions);
    }

    #[test]
    fn test_placeholder_is_normalized() {
        let config = EngineConfig::from_toml_str("placeholder_name = \"sin nombre\"\n").unwrap();
        assert_eq!(config.placeholder_name, "SinNombre");
    }

    #[test]
    fn test_reserved_payload_field_rejected() {
        let err = EngineConfig::from_toml_str("loose_payload_field = \"id\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { setting: "loose_payload_field", .. }));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = EngineConfig::from_toml_str("max_read_limit = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { setting: "max_read_limit", .. }));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = EngineConfig::from_toml_str("max_read_limit = \"lots\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_write_default_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        EngineConfig::write_default_if_missing(&path).unwrap();
        assert_eq!(EngineConfig::from_file(&path).unwrap(), EngineConfig::default());

        std::fs::write(&path, "infer_actions = false\n").unwrap();
        EngineConfig::write_default_if_missing(&path).unwrap();
        assert!(!EngineConfig::from_file(&path).unwrap().infer_actions);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = EngineConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
