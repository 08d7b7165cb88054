//! # pipeguard - Sensitive-Data Anonymization for CI/CD Metadata
//!
//! pipeguard tokenizes identifying and secret values in CI/CD pipeline
//! metadata before the payload is sent to an external AI reasoning service,
//! and maps the tokens in the answer back to the originals locally. The
//! external service only ever sees deterministic stand-ins like
//! `PIPELINE_a1b2c3d4e5f6`; the mapping never leaves the process.
//!
//! ## Architecture
//!
//! pipeguard follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`anonymization`] - Pattern registry, hasher, walker, and engine
//! - [`adapters`] - The reasoning-transport seam
//! - [`domain`] - Error types shared across layers
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pipeguard::anonymization::{ProtectionConfig, ProtectionEngine};
//! use pipeguard::config::secret_string;
//! use serde_json::json;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProtectionConfig {
//!         salt: Some(secret_string(std::env::var("PIPEGUARD_PROTECTION_SALT")?)),
//!         ..Default::default()
//!     };
//!     let engine = ProtectionEngine::new(config)?;
//!
//!     let scrubbed = engine.anonymize(&json!({
//!         "pipeline": "frontend-deploy",
//!         "branch": "release/2.3",
//!         "build": 42
//!     }));
//!     // scrubbed.payload is safe to transmit; scrubbed.context maps the
//!     // tokens in the response back to the originals.
//!
//!     let answer = "The failure in PIPELINE_a1b2c3d4e5f6 was a timeout.";
//!     let rehydrated = engine.rehydrate(answer, &scrubbed.context);
//!     println!("{}", rehydrated.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Round Trips
//!
//! The full outbound/inbound flow runs against anything implementing
//! [`adapters::ReasoningTransport`]:
//!
//! ```rust,no_run
//! # async fn example(
//! #     engine: &pipeguard::anonymization::ProtectionEngine,
//! #     transport: &dyn pipeguard::adapters::ReasoningTransport,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let raw = serde_json::json!({"branch": "release/2.3"});
//! let delivered = engine.round_trip(&raw, transport).await?;
//! println!("{}", delivered.answer);
//! # Ok(())
//! # }
//! ```
//!
//! A transport failure aborts the trip fail-closed; no partially processed
//! data is returned.
//!
//! ## Error Handling
//!
//! Fatal conditions use [`domain::PipeguardError`]; recoverable ones
//! (ambiguous matches, truncation, collisions, rehydration misses) are not
//! errors and surface through the scrub report instead.

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
