//! Configuration types for Flowscribe

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::storage::DEFAULT_DIR_PREFIX;
use crate::{FlowscribeError, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Capture output settings
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Where capture roots are created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Parent directory of every capture root
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Capture root name prefix, followed by `_{epoch_seconds}`
    #[serde(default = "default_dir_prefix")]
    pub dir_prefix: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_dir_prefix() -> String {
    DEFAULT_DIR_PREFIX.to_string()
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            dir_prefix: default_dir_prefix(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FlowscribeError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| FlowscribeError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        let capture = &self.capture;

        if !capture.output_dir.is_dir() {
            return Err(FlowscribeError::ConfigError(format!(
                "Output directory does not exist: {}",
                capture.output_dir.display()
            )));
        }

        let prefix = &capture.dir_prefix;
        if prefix.is_empty() {
            return Err(FlowscribeError::ConfigError(
                "dir_prefix cannot be empty".to_string(),
            ));
        }

        if prefix.contains('/') || prefix.contains('\\') {
            return Err(FlowscribeError::ConfigError(
                "dir_prefix cannot contain path separators".to_string(),
            ));
        }

        if prefix.starts_with('.') {
            return Err(FlowscribeError::ConfigError(
                "dir_prefix cannot start with dot".to_string(),
            ));
        }

        if prefix.contains('\0') {
            return Err(FlowscribeError::ConfigError(
                "dir_prefix cannot contain null bytes".to_string(),
            ));
        }

        Ok(())
    }
}
