#![forbid(unsafe_code)]

//! Editor configuration as data.
//!
//! [`EditorConfig`] gathers the history limits, merge window, and defaults
//! for new documents. With the `config` feature it loads from TOML or JSON;
//! loading rejects values that fail [`EditorConfig::validate`].
//!
//! ```toml
//! [history]
//! max_size = 200
//! max_bytes = 33554432
//!
//! [history.merge]
//! window_ms = 1500
//!
//! [document]
//! width = 120
//! height = 40
//! ```
//!
//! Every field has a default, so partial files are fine.

#[cfg(feature = "config")]
use std::path::Path;

use glyphdeck_doc::Document;

use crate::history::HistoryConfig;

/// Defaults for newly created documents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DocumentDefaults {
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
    /// Prefix for generated layer names ("Layer 1", "Layer 2", ...).
    pub layer_name_prefix: String,
}

impl Default for DocumentDefaults {
    fn default() -> Self {
        Self {
            width: 80,
            height: 25,
            layer_name_prefix: "Layer".to_string(),
        }
    }
}

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub document: DocumentDefaults,
}

impl EditorConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str::<Self>(s)
            .map_err(ConfigError::Toml)?
            .validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(s)
            .map_err(ConfigError::Json)?
            .validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Serialize to pretty TOML.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSerialize)
    }

    /// Validate all parameters, returning a list of problems. An empty list
    /// means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.history.validate();
        let DocumentDefaults { width, height, .. } = self.document;
        if Document::check_size(width, height).is_err() {
            errors.push(format!(
                "document size must be between 1x1 and {max}x{max}, got {width}x{height}",
                max = glyphdeck_doc::MAX_DIMENSION
            ));
        }
        if self.document.layer_name_prefix.trim().is_empty() {
            errors.push("document.layer_name_prefix must not be blank".into());
        }
        errors
    }

    /// `Ok(self)` if valid, else [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            tracing::warn!(
                target: "glyphdeck.history",
                errors = errors.len(),
                "rejected editor config"
            );
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors from loading an [`EditorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "config")]
    #[error("TOML serialize error: {0}")]
    TomlSerialize(toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(serde_json::Error),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EditorConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.history.max_size, 100);
        assert_eq!(config.history.merge.window_ms, 2000);
        assert_eq!(config.document.width, 80);
    }

    #[test]
    fn validate_collects_every_problem() {
        let mut config = EditorConfig::default();
        config.history.max_size = 0;
        config.document.width = 0;
        config.document.layer_name_prefix = "  ".into();
        let errors = config.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(matches!(
            config.validated(),
            Err(ConfigError::Validation(list)) if list.len() == 3
        ));
    }

    #[cfg(feature = "config")]
    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EditorConfig::from_toml_str(
            "[history]\nmax_size = 7\n\n[history.merge]\nwindow_ms = 250\n",
        )
        .unwrap();
        assert_eq!(config.history.max_size, 7);
        assert_eq!(config.history.merge.window_ms, 250);
        assert_eq!(config.history.merge.max_merged_cells, 4096);
        assert!(config.history.merging_enabled);
        assert_eq!(config.document, DocumentDefaults::default());
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_round_trip_through_toml() {
        let config = EditorConfig::from_json_str(
            r#"{"history":{"max_bytes":1024,"merging_enabled":false},"document":{"width":10,"height":4}}"#,
        )
        .unwrap();
        assert_eq!(config.history.max_bytes, 1024);
        assert!(!config.history.merging_enabled);
        let toml = config.to_toml_string().unwrap();
        assert_eq!(EditorConfig::from_toml_str(&toml).unwrap(), config);
    }

    #[cfg(feature = "config")]
    #[test]
    fn invalid_values_are_rejected_on_load() {
        let err = EditorConfig::from_toml_str("[document]\nheight = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("document size"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn malformed_input_is_a_parse_error() {
        assert!(matches!(
            EditorConfig::from_toml_str("history = 3"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            EditorConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }
}
