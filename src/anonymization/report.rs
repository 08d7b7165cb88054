//! Scrub reporting
//!
//! Every anonymization pass produces a [`ScrubReport`] describing what was
//! tokenized and which recoverable conditions occurred (truncation,
//! collisions, strict-mode redactions, unresolved tokens). Callers use it
//! to report partial coverage; nothing in it contains plaintext originals.

use crate::anonymization::models::Category;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Statistics for one anonymization round trip
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrubReport {
    /// Total nodes visited by the walker
    pub nodes_visited: usize,

    /// Substitutions by category
    pub substitutions_by_category: HashMap<Category, usize>,

    /// Subtrees replaced after the depth limit was hit
    pub depth_truncations: usize,

    /// Subtrees replaced after the node budget was exhausted
    pub size_truncations: usize,

    /// Cyclic references cut by the visited-identity guard
    pub cycle_truncations: usize,

    /// Ambiguous values redacted under strict mode
    pub strict_redactions: usize,

    /// Digest collisions disambiguated by the correlation store
    pub collisions: usize,

    /// Tokens in the AI response that did not originate in this context
    pub unresolved_tokens: Vec<String>,
}

impl ScrubReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one substitution
    pub fn record_substitution(&mut self, category: Category) {
        *self.substitutions_by_category.entry(category).or_insert(0) += 1;
    }

    /// Total substitutions across categories
    pub fn total_substitutions(&self) -> usize {
        self.substitutions_by_category.values().sum()
    }

    /// True when the whole input was protected without truncation
    pub fn complete(&self) -> bool {
        self.depth_truncations == 0 && self.size_truncations == 0 && self.cycle_truncations == 0
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let mut output = String::new();

        output.push_str("───────────────────────────────────────────\n");
        output.push_str("            SCRUB REPORT\n");
        output.push_str("───────────────────────────────────────────\n");
        output.push_str(&format!("  Nodes visited:       {}\n", self.nodes_visited));
        output.push_str(&format!(
            "  Substitutions:       {}\n",
            self.total_substitutions()
        ));
        output.push_str(&format!("  Strict redactions:   {}\n", self.strict_redactions));
        output.push_str(&format!("  Digest collisions:   {}\n", self.collisions));
        output.push_str(&format!(
            "  Truncations:         depth={} size={} cycle={}\n",
            self.depth_truncations, self.size_truncations, self.cycle_truncations
        ));

        if !self.substitutions_by_category.is_empty() {
            output.push_str("\n  By category:\n");
            let mut categories: Vec<_> = self.substitutions_by_category.iter().collect();
            categories.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
            for (category, count) in categories {
                output.push_str(&format!("    {:14} {:>5}\n", category.prefix(), count));
            }
        }

        if !self.unresolved_tokens.is_empty() {
            output.push_str("\n  Unresolved tokens:\n");
            for token in &self.unresolved_tokens {
                output.push_str(&format!("    {token}\n"));
            }
        }

        output.push_str("───────────────────────────────────────────\n");
        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_complete() {
        let report = ScrubReport::new();
        assert!(report.complete());
        assert_eq!(report.total_substitutions(), 0);
    }

    #[test]
    fn test_record_substitution() {
        let mut report = ScrubReport::new();
        report.record_substitution(Category::BranchName);
        report.record_substitution(Category::BranchName);
        report.record_substitution(Category::Email);
        assert_eq!(report.total_substitutions(), 3);
        assert_eq!(
            report.substitutions_by_category.get(&Category::BranchName),
            Some(&2)
        );
    }

    #[test]
    fn test_truncation_marks_incomplete() {
        let mut report = ScrubReport::new();
        report.depth_truncations = 1;
        assert!(!report.complete());
    }

    #[test]
    fn test_format_console() {
        let mut report = ScrubReport::new();
        report.nodes_visited = 12;
        report.record_substitution(Category::PipelineName);
        report.unresolved_tokens.push("BRANCH_ffffffffffff".to_string());

        let output = report.format_console();
        assert!(output.contains("SCRUB REPORT"));
        assert!(output.contains("PIPELINE"));
        assert!(output.contains("BRANCH_ffffffffffff"));
    }

    #[test]
    fn test_format_json_round_trips() {
        let mut report = ScrubReport::new();
        report.record_substitution(Category::Url);
        let json = report.format_json().unwrap();
        let parsed: ScrubReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total_substitutions(), 1);
    }
}
