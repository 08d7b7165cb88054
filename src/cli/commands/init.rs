//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "pipeguard.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing pipeguard configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set the hashing salt (at least 16 characters):");
                println!("     export PIPEGUARD_PROTECTION_SALT=<your-salt>");
                println!("  3. Validate configuration: pipeguard validate-config");
                println!("  4. Try it: pipeguard scrub build.json --report");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# pipeguard Configuration File
# Sensitive-data anonymization for CI/CD pipeline metadata

[application]
name = "pipeguard"
log_level = "info"

[protection]
# The salt is deliberately not stored here.
# Set it via: export PIPEGUARD_PROTECTION_SALT=<your-salt>
digest_width = 12
strict_mode = false

[logging]
local_enabled = false
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# pipeguard Configuration File
# Sensitive-data anonymization for CI/CD pipeline metadata
#
# Pipeline names, branches, credentials, emails, and other identifying
# values are replaced with deterministic tokens before a payload leaves
# the process; tokens in the response map back to the originals locally.

[application]
name = "pipeguard"
# Log level: trace, debug, info, warn, error
log_level = "info"

[protection]
# The salt drives deterministic hashing and must be at least 16 characters.
# Keep it out of this file; supply it via the environment:
#   export PIPEGUARD_PROTECTION_SALT=<your-salt>
#
# Tokens look like BRANCH_9f8e7d1a2b3c; width is the hex digest length (8-32).
digest_width = 12

# strict_mode redacts values that look sensitive but can't be classified
# confidently. Permissive (false) passes them through untouched.
strict_mode = false
confidence_threshold = 0.8

# Structural limits; subtrees beyond them are replaced with markers.
max_depth = 64
max_nodes = 100000

# Categories to switch off entirely, e.g. ["EMAIL", "URL"]
disabled_categories = []

# Custom classification rules; the embedded table is used when unset.
# pattern_table = "./patterns/ci_patterns.toml"

[protection.audit]
# Append-only record of completed round trips. Originals are stored as
# hashes, never plaintext.
enabled = false
log_path = "./audit/roundtrips.log"
json_format = true

[logging]
local_enabled = false
local_path = "./logs"
# Rotation: daily, hourly, never
local_rotation = "daily"
"#
        .to_string()
    }
}
