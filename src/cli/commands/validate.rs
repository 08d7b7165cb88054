//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the pipeguard configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        match config.validate() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Application: {}", config.application.name);
                println!("  Log Level: {}", config.application.log_level);
                println!("  Digest Width: {}", config.protection.digest_width);
                println!("  Strict Mode: {}", config.protection.strict_mode);
                println!(
                    "  Confidence Threshold: {}",
                    config.protection.confidence_threshold
                );
                println!(
                    "  Pattern Table: {}",
                    config
                        .protection
                        .pattern_table
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "(embedded defaults)".to_string())
                );
                if !config.protection.disabled_categories.is_empty() {
                    println!(
                        "  Disabled Categories: {:?}",
                        config.protection.disabled_categories
                    );
                }
                println!("  Audit Enabled: {}", config.protection.audit.enabled);
                println!("  Local Logging: {}", config.logging.local_enabled);
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2) // Configuration error exit code
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_creation() {
        let args = ValidateArgs {};
        let _ = format!("{args:?}");
    }
}
