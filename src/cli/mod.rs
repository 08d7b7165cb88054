//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for pipeguard using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// pipeguard - sensitive-data anonymization for CI/CD pipeline metadata
#[derive(Parser, Debug)]
#[command(name = "pipeguard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "pipeguard.toml", env = "PIPEGUARD_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PIPEGUARD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Anonymize a JSON payload from a file or stdin
    Scrub(commands::scrub::ScrubArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
