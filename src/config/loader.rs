use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::ViewConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl ViewConfig {
    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new("<inline>"))
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `ViewConfig::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(ViewConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content, path)
    }

    fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: ViewConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The binding attribute is not blank
    /// - At least one render level is allowed
    /// - Fetch timeouts are positive
    /// - The navigation field is not blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.binding.attribute.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "binding.attribute must not be empty".to_string(),
            });
        }

        if self.render.max_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "render.max_depth must be at least 1".to_string(),
            });
        }

        if self.fetch.timeout_seconds == 0 || self.fetch.connect_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                message: "fetch timeouts must be greater than zero".to_string(),
            });
        }

        if self.navigation.active_field.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "navigation.active_field must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_all_defaults() {
        let config = ViewConfig::from_toml_str("").unwrap();
        assert_eq!(config, ViewConfig::default());
        assert_eq!(config.binding.attribute, "data-binding");
        assert_eq!(config.render.max_depth, 16);
        assert!(config.render.prune_stale_nodes);
        assert_eq!(config.fetch.timeout_seconds, 30);
        assert_eq!(config.fetch.connect_timeout_seconds, 5);
        assert_eq!(config.navigation.active_field, "isActive");
        assert_eq!(config.navigation.active_value, "active");
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = ViewConfig::from_toml_str(
            r#"
[render]
prune_stale_nodes = false

[binding]
attribute = "data-model"
"#,
        )
        .unwrap();
        assert!(!config.render.prune_stale_nodes);
        assert_eq!(config.render.max_depth, 16);
        assert_eq!(config.binding.attribute, "data-model");
    }

    #[test]
    fn test_validation_rejects_zero_depth() {
        let err = ViewConfig::from_toml_str("[render]\nmax_depth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_validation_rejects_blank_attribute() {
        let mut config = ViewConfig::default();
        config.binding.attribute = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = ViewConfig::from_toml_str("[render\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("<inline>"));
    }
}
