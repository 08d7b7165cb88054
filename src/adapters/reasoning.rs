//! Reasoning transport trait
//!
//! The protection engine never talks to an AI service directly; it hands the
//! anonymized payload to whatever implements this trait. Keeping the seam
//! here lets the round-trip pipeline be tested against in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;

/// Outbound transport to an external reasoning service
///
/// Implementations receive only anonymized payloads; the engine guarantees
/// no plaintext original ever crosses this boundary.
#[async_trait]
pub trait ReasoningTransport: Send + Sync {
    /// Submit the anonymized payload and return the service's answer text
    async fn transmit(&self, payload: &Value) -> anyhow::Result<String>;
}
