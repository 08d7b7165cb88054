//! Configuration schema
//!
//! Top-level TOML layout mirrors the sections callers care about:
//! `[application]`, `[protection]` (with `[protection.audit]`), and
//! `[logging]`. Every field not listed in a file takes its default, except
//! the salt, which has none on purpose.

use crate::anonymization::ProtectionConfig;
use crate::domain::{PipeguardError, Result};
use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipeguardConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Protection engine settings
    #[serde(default)]
    pub protection: ProtectionConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PipeguardConfig {
    /// Validate the full configuration
    pub fn validate(&self) -> Result<()> {
        self.application.validate()?;
        self.protection.validate()?;
        self.logging.validate()
    }
}

/// Application-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Display name used in logs
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_app_name() -> String {
    "pipeguard".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<()> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(PipeguardError::Configuration(format!(
                "application.log_level must be one of {LEVELS:?}, got '{}'",
                self.log_level
            )));
        }
        Ok(())
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write structured logs to a local file in addition to the console
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for local log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy: daily, hourly, or never
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

fn default_log_path() -> String {
    "./logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<()> {
        const ROTATIONS: &[&str] = &["daily", "hourly", "never"];
        if !ROTATIONS.contains(&self.local_rotation.to_lowercase().as_str()) {
            return Err(PipeguardError::Configuration(format!(
                "logging.local_rotation must be one of {ROTATIONS:?}, got '{}'",
                self.local_rotation
            )));
        }
        Ok(())
    }
}
