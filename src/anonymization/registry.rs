//! Data-driven pattern table for sensitive-data classification
//!
//! Rules live in TOML (embedded defaults or an external file) and come in
//! two kinds: field rules match the key a value appears under, value rules
//! match the textual shape of the value itself. Overlaps resolve to the
//! highest priority; ties resolve to declaration order, which is stable
//! across runs.

use crate::anonymization::models::Category;
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

/// Field rule definition from TOML
#[derive(Debug, Clone, serde::Deserialize)]
struct FieldRuleDef {
    category: String,
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    key_patterns: Vec<String>,
    priority: i32,
    #[serde(default = "default_confidence")]
    confidence: f32,
}

/// Value rule definition from TOML
#[derive(Debug, Clone, serde::Deserialize)]
struct ValueRuleDef {
    category: String,
    patterns: Vec<String>,
    priority: i32,
    #[serde(default = "default_confidence")]
    confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

/// Pattern table container
#[derive(Debug, serde::Deserialize)]
struct PatternTable {
    #[serde(default)]
    field_rules: Vec<FieldRuleDef>,
    #[serde(default)]
    value_rules: Vec<ValueRuleDef>,
}

/// Compiled field-name rule
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub category: Category,
    keys: HashSet<String>,
    key_patterns: Vec<Regex>,
    pub priority: i32,
    pub confidence: f32,
    order: usize,
}

impl FieldRule {
    fn matches(&self, key_lower: &str) -> bool {
        self.keys.contains(key_lower) || self.key_patterns.iter().any(|re| re.is_match(key_lower))
    }
}

/// Compiled value-shape rule
#[derive(Debug, Clone)]
pub struct ValueRule {
    pub category: Category,
    pub regex: Regex,
    pub priority: i32,
    pub confidence: f32,
    order: usize,
}

/// Outcome of classifying a field name or a whole value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleMatch {
    pub category: Category,
    pub priority: i32,
    pub confidence: f32,
}

/// Priority-ordered rule registry
///
/// Built once at engine startup and shared read-only afterwards; concurrent
/// reads need no synchronization.
pub struct PatternRegistry {
    field_rules: Vec<FieldRule>,
    /// Sorted by (priority desc, declaration order asc)
    value_rules: Vec<ValueRule>,
}

impl PatternRegistry {
    /// Load a registry from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P, disabled: &HashSet<Category>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read pattern table: {}", path.as_ref().display())
        })?;
        Self::from_toml(&content, disabled)
    }

    /// Build a registry from TOML content
    pub fn from_toml(content: &str, disabled: &HashSet<Category>) -> Result<Self> {
        let table: PatternTable =
            toml::from_str(content).context("Failed to parse pattern table TOML")?;

        let mut field_rules = Vec::new();
        for (order, def) in table.field_rules.into_iter().enumerate() {
            let category = parse_category(&def.category)?;
            if disabled.contains(&category) {
                continue;
            }
            let key_patterns = def
                .key_patterns
                .iter()
                .map(|p| {
                    Regex::new(p).with_context(|| {
                        format!("Invalid key pattern for {}: {p}", def.category)
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            field_rules.push(FieldRule {
                category,
                keys: def.keys.iter().map(|k| k.to_lowercase()).collect(),
                key_patterns,
                priority: def.priority,
                confidence: def.confidence.clamp(0.0, 1.0),
                order,
            });
        }

        let mut value_rules = Vec::new();
        let mut order = 0usize;
        for def in table.value_rules {
            let category = parse_category(&def.category)?;
            if disabled.contains(&category) {
                order += def.patterns.len();
                continue;
            }
            for pattern in &def.patterns {
                let regex = Regex::new(pattern)
                    .with_context(|| format!("Invalid value pattern for {}: {pattern}", def.category))?;
                value_rules.push(ValueRule {
                    category,
                    regex,
                    priority: def.priority,
                    confidence: def.confidence.clamp(0.0, 1.0),
                    order,
                });
                order += 1;
            }
        }
        value_rules.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.order.cmp(&b.order)));

        Ok(Self {
            field_rules,
            value_rules,
        })
    }

    /// Build the registry from the embedded default table
    pub fn builtin(disabled: &HashSet<Category>) -> Result<Self> {
        let default_toml = include_str!("../../patterns/ci_patterns.toml");
        Self::from_toml(default_toml, disabled)
    }

    /// Classify a value by the field name it appears under
    ///
    /// Returns the highest-priority matching rule; ties resolve to the rule
    /// declared first in the table.
    pub fn classify_field(&self, field_name: &str) -> Option<RuleMatch> {
        let key = field_name.to_lowercase();
        self.field_rules
            .iter()
            .filter(|r| r.matches(&key))
            .max_by(|a, b| a.priority.cmp(&b.priority).then(b.order.cmp(&a.order)))
            .map(|r| RuleMatch {
                category: r.category,
                priority: r.priority,
                confidence: r.confidence,
            })
    }

    /// Classify a scalar whose entire text matches a value rule
    pub fn classify_scalar(&self, text: &str) -> Option<RuleMatch> {
        for rule in &self.value_rules {
            if let Some(m) = rule.regex.find(text) {
                if m.start() == 0 && m.end() == text.len() {
                    return Some(RuleMatch {
                        category: rule.category,
                        priority: rule.priority,
                        confidence: rule.confidence,
                    });
                }
            }
        }
        None
    }

    /// Value rules in resolution order (priority desc, declaration asc)
    pub fn value_rules(&self) -> &[ValueRule] {
        &self.value_rules
    }

    /// Number of compiled rules (field + value)
    pub fn len(&self) -> usize {
        self.field_rules.len() + self.value_rules.len()
    }

    /// True when no rules are enabled
    pub fn is_empty(&self) -> bool {
        self.field_rules.is_empty() && self.value_rules.is_empty()
    }
}

fn parse_category(s: &str) -> Result<Category> {
    Category::parse(s).with_context(|| format!("Unknown category in pattern table: {s}"))
}
