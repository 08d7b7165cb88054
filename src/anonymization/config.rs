//! Protection engine configuration

use crate::anonymization::models::Category;
use crate::config::SecretString;
use crate::domain::{PipeguardError, Result};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Minimum accepted salt length; a shorter salt makes tokens guessable
pub const MIN_SALT_LEN: usize = 16;

/// Configuration for the protection engine
///
/// The salt is mandatory: the engine refuses to initialize without one
/// rather than run with weak or absent tokenization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectionConfig {
    /// Process-wide hashing salt; read once at startup, immutable after
    pub salt: Option<SecretString>,

    /// Digest width in hex characters (8-32), fixed per deployment
    #[serde(default = "default_digest_width")]
    pub digest_width: usize,

    /// Redact ambiguous matches instead of passing them through
    #[serde(default)]
    pub strict_mode: bool,

    /// Matches below this confidence are treated as ambiguous
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Maximum recursion depth before truncation
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum total nodes walked before truncation
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    /// Categories to disable, by table label (e.g. "EMAIL")
    #[serde(default)]
    pub disabled_categories: Vec<String>,

    /// Optional external pattern table; embedded defaults otherwise
    pub pattern_table: Option<PathBuf>,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

fn default_digest_width() -> usize {
    12
}

fn default_confidence_threshold() -> f32 {
    0.8
}

fn default_max_depth() -> usize {
    64
}

fn default_max_nodes() -> usize {
    100_000
}

impl Default for ProtectionConfig {
    fn default() -> Self {
        Self {
            salt: None,
            digest_width: default_digest_width(),
            strict_mode: false,
            confidence_threshold: default_confidence_threshold(),
            max_depth: default_max_depth(),
            max_nodes: default_max_nodes(),
            disabled_categories: Vec::new(),
            pattern_table: None,
            audit: AuditConfig::default(),
        }
    }
}

impl ProtectionConfig {
    /// Validate the configuration
    ///
    /// A missing or short salt is fatal: the engine must not operate with
    /// weak tokenization.
    pub fn validate(&self) -> Result<()> {
        match &self.salt {
            None => {
                return Err(PipeguardError::Configuration(
                    "protection.salt is required (set PIPEGUARD_PROTECTION_SALT)".to_string(),
                ))
            }
            Some(salt) if salt.expose_secret().as_ref().len() < MIN_SALT_LEN => {
                return Err(PipeguardError::Configuration(format!(
                    "protection.salt must be at least {MIN_SALT_LEN} characters"
                )))
            }
            Some(_) => {}
        }

        if !(8..=32).contains(&self.digest_width) {
            return Err(PipeguardError::Configuration(format!(
                "protection.digest_width must be between 8 and 32, got {}",
                self.digest_width
            )));
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(PipeguardError::Configuration(format!(
                "protection.confidence_threshold must be within 0.0-1.0, got {}",
                self.confidence_threshold
            )));
        }

        if self.max_depth == 0 || self.max_nodes == 0 {
            return Err(PipeguardError::Configuration(
                "protection.max_depth and protection.max_nodes must be greater than zero"
                    .to_string(),
            ));
        }

        self.parse_disabled_categories()?;

        if let Some(ref path) = self.pattern_table {
            if !path.exists() {
                return Err(PipeguardError::Configuration(format!(
                    "Pattern table file not found: {}",
                    path.display()
                )));
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                return Err(PipeguardError::Configuration(format!(
                    "Pattern table must be a TOML file: {}",
                    path.display()
                )));
            }
        }

        self.audit.validate()
    }

    /// Parse the disabled-category labels into the enum set
    pub fn parse_disabled_categories(&self) -> Result<HashSet<Category>> {
        self.disabled_categories
            .iter()
            .map(|label| {
                Category::parse(label).ok_or_else(|| {
                    PipeguardError::Configuration(format!(
                        "Unknown category in protection.disabled_categories: {label}"
                    ))
                })
            })
            .collect()
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable the append-only audit record
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON lines instead of plain text
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/roundtrips.log")
}

fn default_audit_json_format() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled {
            if let Some(parent) = self.log_path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        PipeguardError::Configuration(format!(
                            "Failed to create audit log directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }
        Ok(())
    }
}
