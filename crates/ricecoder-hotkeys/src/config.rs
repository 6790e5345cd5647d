//! Engine configuration loaded from JSON or YAML

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::models::Platform;
use crate::timer::SequenceTimeout;

/// What happens when a sequence times out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Execute a pattern that is complete at expiry, cancel otherwise
    #[default]
    Submit,
    /// Always cancel
    Cancel,
}

fn default_timeout_ms() -> Option<u64> {
    Some(1000)
}

/// Hotkey engine configuration
///
/// A `null` timeout waits indefinitely for Enter or Escape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotkeyConfig {
    #[serde(default = "default_timeout_ms")]
    pub sequence_timeout_ms: Option<u64>,
    #[serde(default)]
    pub timeout_policy: TimeoutPolicy,
    /// Match keys typed into text fields
    #[serde(default)]
    pub enable_on_editable: bool,
    #[serde(default = "default_timeout_ms")]
    pub recorder_timeout_ms: Option<u64>,
    /// Keep focus in the recorder when Tab flushes a capture
    #[serde(default)]
    pub intercept_tab: bool,
    #[serde(default)]
    pub platform: Option<Platform>,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        HotkeyConfig {
            sequence_timeout_ms: default_timeout_ms(),
            timeout_policy: TimeoutPolicy::default(),
            enable_on_editable: false,
            recorder_timeout_ms: default_timeout_ms(),
            intercept_tab: false,
            platform: None,
        }
    }
}

impl HotkeyConfig {
    pub fn sequence_timeout(&self) -> SequenceTimeout {
        SequenceTimeout::from_millis(self.sequence_timeout_ms)
    }

    pub fn recorder_timeout(&self) -> SequenceTimeout {
        SequenceTimeout::from_millis(self.recorder_timeout_ms)
    }

    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::InvalidJson(e.to_string()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml(e.to_string()))
    }

    /// Load configuration, choosing the format by file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };
        tracing::debug!(path = %path.display(), "loaded hotkey config");
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.as_ref().display(), "using default hotkey config: {}", e);
                Self::default()
            }
        }
    }
}
