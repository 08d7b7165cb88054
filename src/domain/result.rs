//! Result type alias for pipeguard
//!
//! Convenience alias using `PipeguardError` as the error type.

use super::errors::PipeguardError;

/// Result type alias for pipeguard operations
///
/// # Examples
///
/// ```
/// use pipeguard::domain::result::Result;
/// use pipeguard::domain::errors::PipeguardError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PipeguardError::Configuration("missing salt".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PipeguardError>;
