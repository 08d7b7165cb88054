//! Logging and observability
//!
//! Structured logging with JSON output, configurable levels, and optional
//! local file rotation. Nothing logged here may contain an original
//! sensitive value: round-trip logs carry context ids and counts only.

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a round trip
#[macro_export]
macro_rules! log_round_trip_start {
    ($context_id:expr) => {
        tracing::info!(
            context_id = %$context_id,
            "Starting round trip"
        );
    };
}

/// Log the completion of a round trip
#[macro_export]
macro_rules! log_round_trip_complete {
    ($context_id:expr, $substitutions:expr, $duration:expr) => {
        tracing::info!(
            context_id = %$context_id,
            substitutions = $substitutions,
            duration_ms = $duration.as_millis(),
            "Round trip completed"
        );
    };
}

/// Log an error with context
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
