//! Typed configuration for models and annotators.
//!
//! Configuration is a YAML document with two lists, `models` and `annotators`.
//! It is loaded once, validated up front and then shared read-only by every
//! front-end.
//!
//! ```yaml
//! models:
//!   - name: gpt-mini
//!     provider: openai
//!     model: gpt-4o-mini
//!     api_key_env: OPENAI_API_KEY
//! annotators:
//!   - name: stock-chat-tagging
//!     mode: multilabel
//!     instruction: Tag finance chat messages.
//!     labels: ["US Stock", "Accounting"]
//! ```

mod annotator;
mod loader;
mod model;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use annotator::{AnnotatorConfig, AnnotatorMode, DEFAULT_MAX_NEW_LABELS, UnsupportedModeError};
pub use loader::{
    DEFAULT_CONFIG_PATH, candidate_paths, load_config, merge_values, resolve_config_path,
};
pub use model::{DEFAULT_TIMEOUT, ModelConfig, Provider};

/// Errors raised while locating, reading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Tried:\n{}", format_tried(.tried))]
    NotFound { tried: Vec<PathBuf> },

    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed but does not have the expected shape
    /// (unknown mode, unknown provider, missing field, ...).
    #[error("Invalid configuration: {0}")]
    Schema(#[source] serde_yaml::Error),

    /// The document has the right shape but breaks a validation rule.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn format_tried(tried: &[PathBuf]) -> String {
    tried
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A requested annotator or model could not be selected.
///
/// This is a caller input error, distinct from a failed annotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Annotator '{0}' not found in config")]
    AnnotatorNotFound(String),
    #[error("No annotators configured")]
    NoAnnotators,
    #[error("Model '{0}' not found in config")]
    ModelNotFound(String),
    #[error("No models configured")]
    NoModels,
}

/// The full, validated configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub annotators: Vec<AnnotatorConfig>,
}

impl Config {
    /// Parses and validates a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Schema` for shape errors and `ConfigError::Invalid`
    /// for validation failures.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(ConfigError::Schema)?;
        Self::from_value(value)
    }

    /// Builds a validated configuration from an already merged YAML value.
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, ConfigError> {
        let value = match value {
            serde_yaml::Value::Null => serde_yaml::Value::Mapping(Default::default()),
            other => other,
        };
        let config: Self = serde_yaml::from_value(value).map_err(ConfigError::Schema)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every entry; the first failing rule is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for model in &self.models {
            model.validate().map_err(ConfigError::Invalid)?;
        }
        for annotator in &self.annotators {
            annotator.validate().map_err(ConfigError::Invalid)?;
        }
        Ok(())
    }

    /// Selects an annotator by name, or the first one when `name` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `LookupError` if the name is unknown or nothing is configured.
    pub fn annotator(&self, name: Option<&str>) -> Result<&AnnotatorConfig, LookupError> {
        match name {
            Some(name) => self
                .annotators
                .iter()
                .find(|a| a.name == name)
                .ok_or_else(|| LookupError::AnnotatorNotFound(name.to_string())),
            None => self.annotators.first().ok_or(LookupError::NoAnnotators),
        }
    }

    /// Selects a model by name, or the first one when `name` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `LookupError` if the name is unknown or nothing is configured.
    pub fn model(&self, name: Option<&str>) -> Result<&ModelConfig, LookupError> {
        match name {
            Some(name) => self
                .models
                .iter()
                .find(|m| m.name == name)
                .ok_or_else(|| LookupError::ModelNotFound(name.to_string())),
            None => self.models.first().ok_or(LookupError::NoModels),
        }
    }

    pub fn annotator_names(&self) -> Vec<String> {
        self.annotators.iter().map(|a| a.name.clone()).collect()
    }

    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name.clone()).collect()
    }
}
