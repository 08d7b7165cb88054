//! Configuration loading and validation

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{ApplicationConfig, LoggingConfig, PipeguardConfig};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
