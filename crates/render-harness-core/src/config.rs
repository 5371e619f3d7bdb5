//! Configuration types for the render harness.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{Error, Result};

/// Harness configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HarnessConfig {
    /// Wait helper settings
    pub wait: WaitSettings,
    /// Markup comparison settings
    pub compare: CompareSettings,
}

impl HarnessConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: HarnessConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(format!("invalid YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.wait.default_timeout_ms == 0 {
            return Err(Error::Config(
                "wait.default_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.wait.event_buffer == 0 {
            return Err(Error::Config("wait.event_buffer must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Wait helper settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    /// Default wait timeout in milliseconds
    pub default_timeout_ms: u64,
    /// Render notification buffer size per subscription
    pub event_buffer: usize,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            default_timeout_ms: 1000,
            event_buffer: 16,
        }
    }
}

impl WaitSettings {
    /// Default wait timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

/// Markup comparison settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareSettings {
    /// Compare text with whitespace collapsed
    pub ignore_whitespace: bool,
    /// Ignore attribute declaration order
    pub ignore_attribute_order: bool,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            ignore_whitespace: true,
            ignore_attribute_order: true,
        }
    }
}
