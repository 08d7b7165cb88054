//! Domain error types
//!
//! All errors are domain-specific and don't expose third-party types.
//! Recoverable anonymization conditions (ambiguous classification,
//! structural truncation, token collisions, rehydration misses) are *not*
//! errors: they are handled locally and surfaced through the scrub report.

use thiserror::Error;

/// Main pipeguard error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum PipeguardError {
    /// Configuration-related errors (missing/weak salt is fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Pattern table errors (unknown category, invalid regex)
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// Transport errors from the AI reasoning collaborator
    #[error("Transport error: {0}")]
    Transport(String),

    /// A round trip was abandoned fail-closed at the named stage
    #[error("Round trip aborted at {stage}: {reason}")]
    Aborted { stage: &'static str, reason: String },

    /// Audit logging errors
    #[error("Audit error: {0}")]
    Audit(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl PipeguardError {
    /// Construct an abort error for the given round-trip stage
    pub fn aborted(stage: &'static str, reason: impl Into<String>) -> Self {
        Self::Aborted {
            stage,
            reason: reason.into(),
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for PipeguardError {
    fn from(err: std::io::Error) -> Self {
        PipeguardError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PipeguardError {
    fn from(err: serde_json::Error) -> Self {
        PipeguardError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PipeguardError {
    fn from(err: toml::de::Error) -> Self {
        PipeguardError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<regex::Error> for PipeguardError {
    fn from(err: regex::Error) -> Self {
        PipeguardError::Pattern(format!("Invalid regex: {err}"))
    }
}
