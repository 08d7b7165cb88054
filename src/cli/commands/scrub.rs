//! Scrub command implementation
//!
//! Reads a JSON payload from a file or stdin, runs it through the
//! protection engine, and writes the anonymized copy to stdout or a file.
//! The correlation state is dropped on exit: this command is for inspecting
//! what would leave the process, not for running live round trips.

use crate::anonymization::ProtectionEngine;
use crate::config::load_config;
use clap::Args;
use std::fs;
use std::io::Read;

/// Arguments for the scrub command
#[derive(Args, Debug)]
pub struct ScrubArgs {
    /// Input JSON file; reads stdin when omitted or "-"
    pub input: Option<String>,

    /// Write the anonymized payload to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Print a scrub report to stderr
    #[arg(long)]
    pub report: bool,

    /// Redact ambiguous matches regardless of the configured mode
    #[arg(long)]
    pub strict: bool,
}

impl ScrubArgs {
    /// Execute the scrub command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Running scrub");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let mut protection = config.protection.clone();
        if self.strict {
            protection.strict_mode = true;
        }

        let engine = match ProtectionEngine::new(protection) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Failed to initialize protection engine: {e}");
                return Ok(2);
            }
        };

        let raw_text = match self.read_input() {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Failed to read input: {e}");
                return Ok(5);
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw_text) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Input is not valid JSON: {e}");
                return Ok(5);
            }
        };

        let scrubbed = engine.anonymize(&value);
        let rendered = serde_json::to_string_pretty(&scrubbed.payload)?;

        match &self.output {
            Some(path) => fs::write(path, rendered)?,
            None => println!("{rendered}"),
        }

        if self.report {
            eprint!("{}", scrubbed.report.format_console());
        }

        if !scrubbed.report.complete() {
            tracing::warn!("Input was truncated; the anonymized copy is partial");
        }

        Ok(0)
    }

    fn read_input(&self) -> std::io::Result<String> {
        match self.input.as_deref() {
            Some("-") | None => {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                Ok(buffer)
            }
            Some(path) => fs::read_to_string(path),
        }
    }
}
