//! Recursive structural anonymizer
//!
//! Walks arbitrary nested JSON and replaces every classified leaf with a
//! token, preserving container shape exactly: mappings keep their key set,
//! sequences keep their length and order, non-sensitive scalars pass
//! through untouched.
//!
//! The walk is bounded three ways, and every bound fails closed (the
//! offending subtree is replaced by a marker, never emitted raw):
//! - a visited-identity set on the active recursion path cuts cycles;
//! - a maximum depth;
//! - a maximum total node count.

use crate::anonymization::context::AnonymizationContext;
use crate::anonymization::hasher::TokenHasher;
use crate::anonymization::models::Category;
use crate::anonymization::registry::{PatternRegistry, RuleMatch};
use crate::anonymization::report::ScrubReport;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

/// Marker replacing a cyclic reference
pub const TRUNCATED_CYCLE: &str = "[TRUNCATED_CYCLE]";
/// Marker replacing substructure past the depth limit
pub const TRUNCATED_DEPTH: &str = "[TRUNCATED_DEPTH]";
/// Marker replacing substructure past the node budget
pub const TRUNCATED_SIZE: &str = "[TRUNCATED_SIZE]";

/// Structural walker applying the pattern registry and hasher
///
/// Borrowed read-only state comes from the engine; per-request mutation is
/// confined to the context and report passed into [`anonymize`](Self::anonymize).
pub struct Anonymizer<'a> {
    registry: &'a PatternRegistry,
    hasher: &'a TokenHasher,
    /// Anchored whole-string token matcher, for idempotent pass-through
    token_re: &'a Regex,
    strict_mode: bool,
    confidence_threshold: f32,
    max_depth: usize,
    max_nodes: usize,
}

struct WalkState {
    nodes: usize,
    /// Pointer identities of containers on the active recursion path
    on_path: HashSet<usize>,
}

impl<'a> Anonymizer<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: &'a PatternRegistry,
        hasher: &'a TokenHasher,
        token_re: &'a Regex,
        strict_mode: bool,
        confidence_threshold: f32,
        max_depth: usize,
        max_nodes: usize,
    ) -> Self {
        Self {
            registry,
            hasher,
            token_re,
            strict_mode,
            confidence_threshold,
            max_depth,
            max_nodes,
        }
    }

    /// Produce an isomorphic, leak-free copy of `value`
    pub fn anonymize(
        &self,
        value: &Value,
        ctx: &mut AnonymizationContext,
        report: &mut ScrubReport,
    ) -> Value {
        let mut state = WalkState {
            nodes: 0,
            on_path: HashSet::new(),
        };
        let result = self.walk(value, 0, &mut state, ctx, report);
        report.collisions = ctx.store().collisions();
        result
    }

    fn walk(
        &self,
        value: &Value,
        depth: usize,
        state: &mut WalkState,
        ctx: &mut AnonymizationContext,
        report: &mut ScrubReport,
    ) -> Value {
        state.nodes += 1;
        report.nodes_visited += 1;
        if state.nodes > self.max_nodes {
            report.size_truncations += 1;
            return Value::String(TRUNCATED_SIZE.to_string());
        }
        if depth > self.max_depth {
            report.depth_truncations += 1;
            return Value::String(TRUNCATED_DEPTH.to_string());
        }

        match value {
            Value::Object(map) => {
                let addr = value as *const Value as usize;
                if !state.on_path.insert(addr) {
                    report.cycle_truncations += 1;
                    return Value::String(TRUNCATED_CYCLE.to_string());
                }

                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, child) in map {
                    let replaced = self
                        .registry
                        .classify_field(key)
                        .and_then(|m| self.apply_field_match(m, child, ctx, report));
                    let new_child = match replaced {
                        Some(v) => v,
                        None => self.walk(child, depth + 1, state, ctx, report),
                    };
                    out.insert(key.clone(), new_child);
                }

                state.on_path.remove(&addr);
                Value::Object(out)
            }
            Value::Array(arr) => {
                let addr = value as *const Value as usize;
                if !state.on_path.insert(addr) {
                    report.cycle_truncations += 1;
                    return Value::String(TRUNCATED_CYCLE.to_string());
                }

                let out = arr
                    .iter()
                    .map(|child| self.walk(child, depth + 1, state, ctx, report))
                    .collect();

                state.on_path.remove(&addr);
                Value::Array(out)
            }
            Value::String(s) => self.scrub_string(s, ctx, report),
            other => other.clone(),
        }
    }

    /// Replace the entire value under a sensitive key, whatever its shape
    ///
    /// Returns `None` when the match is ambiguous under a permissive policy,
    /// telling the caller to recurse normally instead.
    fn apply_field_match(
        &self,
        m: RuleMatch,
        child: &Value,
        ctx: &mut AnonymizationContext,
        report: &mut ScrubReport,
    ) -> Option<Value> {
        // Already-tokenized values stay as they are
        if let Value::String(s) = child {
            if self.token_re.is_match(s) {
                return Some(child.clone());
            }
        }

        let category = if m.confidence >= self.confidence_threshold {
            m.category
        } else if self.strict_mode {
            report.strict_redactions += 1;
            Category::Redacted
        } else {
            return None;
        };

        let original = scalar_text(child);
        let token = ctx.store_mut().intern(self.hasher, category, &original);
        report.record_substitution(category);
        Some(Value::String(token.render()))
    }

    fn scrub_string(
        &self,
        text: &str,
        ctx: &mut AnonymizationContext,
        report: &mut ScrubReport,
    ) -> Value {
        if self.token_re.is_match(text) {
            return Value::String(text.to_string());
        }

        // Whole-scalar shape match replaces the scalar outright
        if let Some(m) = self.registry.classify_scalar(text) {
            if m.confidence >= self.confidence_threshold {
                let token = ctx.store_mut().intern(self.hasher, m.category, text);
                report.record_substitution(m.category);
                return Value::String(token.render());
            }
            if self.strict_mode {
                let token = ctx
                    .store_mut()
                    .intern(self.hasher, Category::Redacted, text);
                report.strict_redactions += 1;
                report.record_substitution(Category::Redacted);
                return Value::String(token.render());
            }
        }

        Value::String(self.scrub_text(text, ctx, report))
    }

    /// Replace sensitive fragments embedded in free text (console output,
    /// commit messages), leaving the rest of the text intact
    fn scrub_text(
        &self,
        text: &str,
        ctx: &mut AnonymizationContext,
        report: &mut ScrubReport,
    ) -> String {
        // Spans already holding tokens are off limits
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        let mut accepted: Vec<(usize, usize, Category, bool)> = Vec::new();

        for rule in self.registry.value_rules() {
            for caps in rule.regex.captures_iter(text) {
                let m = match caps.get(1) {
                    Some(g) => g,
                    None => caps.get(0).expect("capture 0 always present"),
                };
                let span = (m.start(), m.end());
                if overlaps(&claimed, span) {
                    continue;
                }
                if self.token_re.is_match(m.as_str()) {
                    claimed.push(span);
                    continue;
                }

                if rule.confidence >= self.confidence_threshold {
                    claimed.push(span);
                    accepted.push((span.0, span.1, rule.category, false));
                } else if self.strict_mode {
                    claimed.push(span);
                    accepted.push((span.0, span.1, Category::Redacted, true));
                }
                // Ambiguous under a permissive policy: leave the span open so
                // a lower-priority confident rule may still claim it.
            }
        }

        if accepted.is_empty() {
            return text.to_string();
        }

        accepted.sort_by_key(|&(start, _, _, _)| start);
        let mut result = String::with_capacity(text.len());
        let mut last = 0usize;
        for (start, end, category, was_ambiguous) in accepted {
            result.push_str(&text[last..start]);
            let token = ctx
                .store_mut()
                .intern(self.hasher, category, &text[start..end]);
            report.record_substitution(category);
            if was_ambiguous {
                report.strict_redactions += 1;
            }
            result.push_str(&token.render());
            last = end;
        }
        result.push_str(&text[last..]);
        result
    }
}

/// Textual form interned for a value replaced wholesale
///
/// Strings are taken verbatim; everything else (numbers, containers under a
/// sensitive key) uses its canonical JSON rendering so rehydration restores
/// the exact original text.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn overlaps(claimed: &[(usize, usize)], span: (usize, usize)) -> bool {
    claimed
        .iter()
        .any(|&(start, end)| span.0 < end && start < span.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::token_pattern;
    use crate::config::secret_string;
    use serde_json::json;
    use std::collections::HashSet as CategorySet;

    struct Fixture {
        registry: PatternRegistry,
        hasher: TokenHasher,
        token_re: Regex,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: PatternRegistry::builtin(&CategorySet::new()).unwrap(),
                hasher: TokenHasher::new(
                    secret_string("unit-test-salt-0123456789".to_string()),
                    12,
                ),
                token_re: Regex::new(&format!("^{}$", token_pattern(12))).unwrap(),
            }
        }

        fn anonymizer(&self, strict: bool) -> Anonymizer<'_> {
            Anonymizer::new(
                &self.registry,
                &self.hasher,
                &self.token_re,
                strict,
                0.8,
                64,
                100_000,
            )
        }

        fn limited(&self, max_depth: usize, max_nodes: usize) -> Anonymizer<'_> {
            Anonymizer::new(
                &self.registry,
                &self.hasher,
                &self.token_re,
                false,
                0.8,
                max_depth,
                max_nodes,
            )
        }
    }

    fn run(anonymizer: &Anonymizer<'_>, value: &Value) -> (Value, AnonymizationContext, ScrubReport) {
        let mut ctx = AnonymizationContext::new();
        let mut report = ScrubReport::new();
        let out = anonymizer.anonymize(value, &mut ctx, &mut report);
        (out, ctx, report)
    }

    #[test]
    fn test_sensitive_keys_tokenized_others_untouched() {
        let fixture = Fixture::new();
        let input = json!({
            "pipeline": "frontend-deploy",
            "branch": "release/2.3",
            "build": 42
        });
        let (out, _, report) = run(&fixture.anonymizer(false), &input);

        let pipeline = out["pipeline"].as_str().unwrap();
        let branch = out["branch"].as_str().unwrap();
        assert!(pipeline.starts_with("PIPELINE_"));
        assert!(branch.starts_with("BRANCH_"));
        assert_eq!(out["build"], json!(42));
        assert_eq!(report.total_substitutions(), 2);
    }

    #[test]
    fn test_structure_preserved() {
        let fixture = Fixture::new();
        let input = json!({
            "builds": [
                {"number": 1, "branch": "main"},
                {"number": 2, "branch": "develop"}
            ],
            "count": 2
        });
        let (out, _, _) = run(&fixture.anonymizer(false), &input);

        assert!(out.is_object());
        let builds = out["builds"].as_array().unwrap();
        assert_eq!(builds.len(), 2);
        assert_eq!(builds[0]["number"], json!(1));
        assert_eq!(builds[1]["number"], json!(2));
    }

    #[test]
    fn test_dedup_across_structure() {
        let fixture = Fixture::new();
        let input = json!({
            "owner": "org-acme",
            "nested": {"owner": "org-acme"}
        });
        let (out, _, _) = run(&fixture.anonymizer(false), &input);
        assert_eq!(out["owner"], out["nested"]["owner"]);
    }

    #[test]
    fn test_idempotence() {
        let fixture = Fixture::new();
        let input = json!({
            "pipeline": "frontend-deploy",
            "branch": "release/2.3",
            "log": "contact ops@example.com at 10.0.0.5",
            "build": 42
        });
        let anonymizer = fixture.anonymizer(false);
        let (once, _, _) = run(&anonymizer, &input);
        let (twice, _, report) = run(&anonymizer, &once);
        assert_eq!(once, twice);
        assert_eq!(report.total_substitutions(), 0);
    }

    #[test]
    fn test_sensitive_key_with_container_value() {
        let fixture = Fixture::new();
        let input = json!({
            "repository": {"name": "frontend", "host": "git.internal"}
        });
        let (out, ctx, _) = run(&fixture.anonymizer(false), &input);

        let token = out["repository"].as_str().unwrap();
        assert!(token.starts_with("REPO_"));
        // The whole container rehydrates to its canonical JSON text
        let original = ctx.store().resolve_text(token).unwrap();
        let parsed: Value = serde_json::from_str(original).unwrap();
        assert_eq!(parsed["name"], json!("frontend"));
    }

    #[test]
    fn test_free_text_scrubbing() {
        let fixture = Fixture::new();
        let input = json!({
            "console": "Started by jane.doe@example.com, pushed to https://git.example.com/acme/web with password = hunter2secret"
        });
        let (out, _, report) = run(&fixture.anonymizer(false), &input);

        let console = out["console"].as_str().unwrap();
        assert!(!console.contains("jane.doe@example.com"));
        assert!(!console.contains("git.example.com"));
        assert!(!console.contains("hunter2secret"));
        assert!(console.contains("EMAIL_"));
        assert!(console.contains("URL_"));
        assert!(console.contains("CREDENTIAL_"));
        assert!(console.contains("Started by "));
        assert!(report.total_substitutions() >= 3);
    }

    #[test]
    fn test_depth_truncation() {
        let fixture = Fixture::new();
        let mut value = json!("leaf");
        for _ in 0..10 {
            value = json!({ "inner": value });
        }
        let (out, _, report) = run(&fixture.limited(3, 100_000), &value);
        assert_eq!(report.depth_truncations, 1);
        assert!(!report.complete());
        assert!(out.to_string().contains(TRUNCATED_DEPTH));
    }

    #[test]
    fn test_node_budget_truncation() {
        let fixture = Fixture::new();
        let items: Vec<Value> = (0..100).map(|i| json!({ "number": i })).collect();
        let input = Value::Array(items);
        let (out, _, report) = run(&fixture.limited(64, 20), &input);

        assert!(report.size_truncations > 0);
        assert!(!report.complete());
        // Shape preserved: still an array of the same length
        assert_eq!(out.as_array().unwrap().len(), 100);
    }

    #[test]
    fn test_strict_mode_redacts_ambiguous() {
        let fixture = Fixture::new();
        // Heuristic name shapes carry confidence 0.7, below the 0.8 threshold
        let input = json!({ "note": "deployed to eks-prod-cluster" });

        let (permissive, _, _) = run(&fixture.anonymizer(false), &input);
        assert_eq!(permissive["note"], json!("deployed to eks-prod-cluster"));

        let (strict, _, report) = run(&fixture.anonymizer(true), &input);
        let note = strict["note"].as_str().unwrap();
        assert!(!note.contains("eks-prod-cluster"));
        assert!(note.contains("REDACTED_"));
        assert!(report.strict_redactions > 0);
    }

    #[test]
    fn test_null_and_bool_pass_through() {
        let fixture = Fixture::new();
        let input = json!({ "enabled": true, "parent": null, "ratio": 0.5 });
        let (out, _, report) = run(&fixture.anonymizer(false), &input);
        assert_eq!(out, input);
        assert_eq!(report.total_substitutions(), 0);
    }

    #[test]
    fn test_numeric_value_under_sensitive_key() {
        let fixture = Fixture::new();
        let input = json!({ "token": 12345 });
        let (out, ctx, _) = run(&fixture.anonymizer(false), &input);
        let token = out["token"].as_str().unwrap();
        assert!(token.starts_with("CREDENTIAL_"));
        assert_eq!(ctx.store().resolve_text(token), Some("12345"));
    }
}
