//! Configuration for a form guard.

use crate::honeypot::DEFAULT_HONEYPOT_FIELDS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Guard configuration. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Trap field names. When set, only these are rendered.
    pub honeypot_fields: Vec<String>,

    /// Trigger label while idle
    pub submit_label: String,

    /// Trigger label while the submit handler is pending
    pub loading_label: String,

    /// Log every evaluation at debug level. Presentation only.
    pub debug: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            honeypot_fields: DEFAULT_HONEYPOT_FIELDS.iter().map(|f| f.to_string()).collect(),
            submit_label: "Submit".to_string(),
            loading_label: "Submitting...".to_string(),
            debug: false,
        }
    }
}

impl GuardConfig {
    pub fn with_honeypot_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.honeypot_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_labels(mut self, submit: impl Into<String>, loading: impl Into<String>) -> Self {
        self.submit_label = submit.into();
        self.loading_label = loading.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Load from `path`, or defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default configuration file location.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("formtrap")
            .join("config.json")
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(serde_json::Error),

    #[error("serialize error: {0}")]
    Serialize(serde_json::Error),
}
