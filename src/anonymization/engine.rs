//! Protection engine facade
//!
//! The engine owns the compiled pattern registry, the salted hasher, and the
//! audit logger, and exposes the three operations callers use: anonymize a
//! payload, rehydrate a response, and run the full outbound/inbound round
//! trip against a reasoning transport.
//!
//! A round trip moves through fixed stages: Raw, Anonymized, Transmitted,
//! ResponseReceived, Rehydrated, Delivered. Any failure between Anonymized
//! and Delivered abandons the trip fail-closed; no partially processed data
//! is ever returned.

use crate::adapters::ReasoningTransport;
use crate::anonymization::anonymizer::Anonymizer;
use crate::anonymization::audit::AuditLogger;
use crate::anonymization::config::ProtectionConfig;
use crate::anonymization::context::AnonymizationContext;
use crate::anonymization::hasher::TokenHasher;
use crate::anonymization::models::token_pattern;
use crate::anonymization::registry::PatternRegistry;
use crate::anonymization::report::ScrubReport;
use crate::domain::{PipeguardError, Result};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Marker emitted in place of a token the context cannot resolve
const UNRESOLVED_PREFIX: &str = "[UNRESOLVED:";

/// An anonymized payload together with its round-trip state
pub struct ScrubbedPayload {
    /// Leak-free copy of the input, isomorphic in shape
    pub payload: Value,
    /// Correlation state needed to rehydrate the response
    pub context: AnonymizationContext,
    /// What was substituted and what was truncated
    pub report: ScrubReport,
}

/// A response with tokens mapped back to originals
pub struct RehydratedText {
    /// Response text with every known token replaced by its original
    pub text: String,
    /// Tokens that did not originate in the supplied context
    pub unresolved: Vec<String>,
}

/// Final product of a completed round trip
#[derive(Debug)]
pub struct DeliveredAnswer {
    /// Rehydrated answer text
    pub answer: String,
    /// Combined scrub/rehydration report
    pub report: ScrubReport,
    /// Id of the context the trip ran under
    pub context_id: Uuid,
}

/// Long-lived anonymization engine
///
/// Built once from a validated [`ProtectionConfig`]; everything inside is
/// read-only after construction, so one engine serves concurrent round
/// trips without locking. Per-request state lives in the context each
/// operation creates or receives.
pub struct ProtectionEngine {
    registry: PatternRegistry,
    hasher: TokenHasher,
    /// Anchored matcher for whole-string token checks
    token_full_re: Regex,
    /// Word-bounded matcher for scanning response text
    token_scan_re: Regex,
    strict_mode: bool,
    confidence_threshold: f32,
    max_depth: usize,
    max_nodes: usize,
    audit: Option<AuditLogger>,
}

impl ProtectionEngine {
    /// Build an engine from configuration
    ///
    /// Fails fast on a missing or weak salt, an unloadable pattern table, or
    /// an unwritable audit location; a misconfigured engine must never start.
    pub fn new(config: ProtectionConfig) -> Result<Self> {
        config.validate()?;
        let disabled = config.parse_disabled_categories()?;

        let registry = match &config.pattern_table {
            Some(path) => PatternRegistry::from_file(path, &disabled),
            None => PatternRegistry::builtin(&disabled),
        }
        .map_err(|e| PipeguardError::Pattern(format!("{e:#}")))?;

        let salt = config.salt.clone().ok_or_else(|| {
            PipeguardError::Configuration("protection.salt is required".to_string())
        })?;
        let hasher = TokenHasher::new(salt, config.digest_width);

        let pattern = token_pattern(config.digest_width);
        let token_full_re = Regex::new(&format!("^{pattern}$"))?;
        let token_scan_re = Regex::new(&format!(r"\b{pattern}\b"))?;

        let audit = if config.audit.enabled {
            Some(AuditLogger::new(
                config.audit.log_path.clone(),
                config.audit.json_format,
            )?)
        } else {
            None
        };

        info!(
            rules = registry.len(),
            digest_width = config.digest_width,
            strict_mode = config.strict_mode,
            audit = config.audit.enabled,
            "Protection engine initialized"
        );

        Ok(Self {
            registry,
            hasher,
            token_full_re,
            token_scan_re,
            strict_mode: config.strict_mode,
            confidence_threshold: config.confidence_threshold,
            max_depth: config.max_depth,
            max_nodes: config.max_nodes,
            audit,
        })
    }

    /// Anonymize a payload, minting a fresh context for the round trip
    pub fn anonymize(&self, value: &Value) -> ScrubbedPayload {
        let mut context = AnonymizationContext::new();
        let mut report = ScrubReport::new();

        let anonymizer = Anonymizer::new(
            &self.registry,
            &self.hasher,
            &self.token_full_re,
            self.strict_mode,
            self.confidence_threshold,
            self.max_depth,
            self.max_nodes,
        );
        let payload = anonymizer.anonymize(value, &mut context, &mut report);

        debug!(
            context_id = %context.id(),
            nodes = report.nodes_visited,
            substitutions = report.total_substitutions(),
            complete = report.complete(),
            "Payload anonymized"
        );

        ScrubbedPayload {
            payload,
            context,
            report,
        }
    }

    /// Map tokens in response text back to their originals
    ///
    /// A token the context has never minted is replaced by an
    /// `[UNRESOLVED:<token>]` marker rather than passed through as if it
    /// were data, and reported to the caller.
    pub fn rehydrate(&self, text: &str, context: &AnonymizationContext) -> RehydratedText {
        let mut unresolved = Vec::new();
        let result = self
            .token_scan_re
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let token_text = &caps[0];
                match context.store().resolve_text(token_text) {
                    Some(original) => original.to_string(),
                    None => {
                        unresolved.push(token_text.to_string());
                        format!("{UNRESOLVED_PREFIX}{token_text}]")
                    }
                }
            });

        if !unresolved.is_empty() {
            warn!(
                context_id = %context.id(),
                count = unresolved.len(),
                "Response contained tokens foreign to this round trip"
            );
        }

        RehydratedText {
            text: result.into_owned(),
            unresolved,
        }
    }

    /// Run one full round trip: anonymize, transmit, rehydrate, deliver
    ///
    /// Transport failure abandons the trip; the caller gets an error and the
    /// per-trip state is dropped with it.
    pub async fn round_trip(
        &self,
        raw: &Value,
        transport: &dyn ReasoningTransport,
    ) -> Result<DeliveredAnswer> {
        let ScrubbedPayload {
            payload,
            context,
            mut report,
        } = self.anonymize(raw);
        info!(
            context_id = %context.id(),
            substitutions = report.total_substitutions(),
            "Round trip: payload anonymized"
        );

        let answer = transport
            .transmit(&payload)
            .await
            .map_err(|e| PipeguardError::aborted("Transmitted", format!("{e:#}")))?;
        info!(context_id = %context.id(), "Round trip: response received");

        let rehydrated = self.rehydrate(&answer, &context);
        report.unresolved_tokens = rehydrated.unresolved;
        info!(
            context_id = %context.id(),
            unresolved = report.unresolved_tokens.len(),
            "Round trip: response rehydrated"
        );

        if let Some(logger) = &self.audit {
            logger.log_round_trip(&context, &report)?;
        }

        Ok(DeliveredAnswer {
            answer: rehydrated.text,
            report,
            context_id: context.id(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use serde_json::json;

    fn engine() -> ProtectionEngine {
        let config = ProtectionConfig {
            salt: Some(secret_string("unit-test-salt-0123456789".to_string())),
            ..Default::default()
        };
        ProtectionEngine::new(config).unwrap()
    }

    #[test]
    fn test_engine_requires_salt() {
        let err = match ProtectionEngine::new(ProtectionConfig::default()) {
            Ok(_) => panic!("engine without a salt must refuse to initialize"),
            Err(e) => e,
        };
        assert!(matches!(err, PipeguardError::Configuration(_)));
    }

    #[test]
    fn test_anonymize_and_rehydrate_round_trip() {
        let engine = engine();
        let input = json!({
            "pipeline": "frontend-deploy",
            "branch": "release/2.3"
        });
        let scrubbed = engine.anonymize(&input);

        let pipeline_token = scrubbed.payload["pipeline"].as_str().unwrap();
        let branch_token = scrubbed.payload["branch"].as_str().unwrap();
        let answer = format!("The failure in {pipeline_token} on {branch_token} was a timeout.");

        let rehydrated = engine.rehydrate(&answer, &scrubbed.context);
        assert_eq!(
            rehydrated.text,
            "The failure in frontend-deploy on release/2.3 was a timeout."
        );
        assert!(rehydrated.unresolved.is_empty());
    }

    #[test]
    fn test_rehydrate_flags_foreign_tokens() {
        let engine = engine();
        let scrubbed = engine.anonymize(&json!({"branch": "main"}));

        let rehydrated = engine.rehydrate(
            "Check BRANCH_ffffffffffff for details.",
            &scrubbed.context,
        );
        assert_eq!(
            rehydrated.text,
            "Check [UNRESOLVED:BRANCH_ffffffffffff] for details."
        );
        assert_eq!(rehydrated.unresolved, vec!["BRANCH_ffffffffffff"]);
    }

    #[test]
    fn test_rehydrate_leaves_plain_text_alone() {
        let engine = engine();
        let scrubbed = engine.anonymize(&json!({}));
        let rehydrated = engine.rehydrate("No tokens here at all.", &scrubbed.context);
        assert_eq!(rehydrated.text, "No tokens here at all.");
    }

    #[test]
    fn test_contexts_do_not_cross() {
        let engine = engine();
        let first = engine.anonymize(&json!({"branch": "release/2.3"}));
        let second = engine.anonymize(&json!({"branch": "release/2.3"}));

        // Deterministic hashing: both trips mint the same token text,
        // and each context resolves it independently.
        assert_eq!(first.payload, second.payload);
        let token = first.payload["branch"].as_str().unwrap();
        assert_eq!(second.context.store().resolve_text(token), Some("release/2.3"));
    }
}
