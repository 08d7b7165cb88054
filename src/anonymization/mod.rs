//! Sensitive-data anonymization engine
//!
//! Tokenizes CI/CD pipeline metadata before it leaves the process and maps
//! the tokens back when the answer returns. The engine is layered:
//!
//! - [`registry`] - Data-driven classification rules loaded from TOML
//! - [`hasher`] - Deterministic salted token digests
//! - [`context`] - Per-round-trip correlation between originals and tokens
//! - [`anonymizer`] - The recursive structural walker
//! - [`engine`] - The facade tying the layers into round trips
//! - [`audit`] - Append-only round-trip record, hashes only
//!
//! Original values never leave the process: outbound payloads carry tokens,
//! audit records carry hashes, and correlation state dies with its context.

pub mod anonymizer;
pub mod audit;
pub mod config;
pub mod context;
pub mod engine;
pub mod hasher;
pub mod models;
pub mod registry;
pub mod report;

pub use anonymizer::Anonymizer;
pub use config::{AuditConfig, ProtectionConfig};
pub use context::{AnonymizationContext, CorrelationStore};
pub use engine::{DeliveredAnswer, ProtectionEngine, RehydratedText, ScrubbedPayload};
pub use hasher::TokenHasher;
pub use models::{Category, CorrelationEntry, Token};
pub use registry::PatternRegistry;
pub use report::ScrubReport;
