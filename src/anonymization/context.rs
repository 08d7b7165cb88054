//! Per-round-trip correlation state

use crate::anonymization::hasher::TokenHasher;
use crate::anonymization::models::{Category, CorrelationEntry, Token};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// Bidirectional mapping between original values and tokens
///
/// Owned exclusively by one [`AnonymizationContext`]; mutated only by the
/// anonymizer during the outbound pass, read-only during rehydration.
#[derive(Debug, Default)]
pub struct CorrelationStore {
    by_value: HashMap<(Category, String), Token>,
    by_token: HashMap<String, CorrelationEntry>,
    collisions: usize,
}

impl CorrelationStore {
    /// Intern a value under a category, minting a token on first sight
    ///
    /// Dedup-aware: the same `(category, value)` pair always returns the
    /// same token within this store. A digest collision with a *different*
    /// original appends a `-2`, `-3`, ... suffix so two distinct originals
    /// never share a token.
    pub fn intern(&mut self, hasher: &TokenHasher, category: Category, value: &str) -> Token {
        if let Some(token) = self.by_value.get(&(category, value.to_string())) {
            return token.clone();
        }

        let digest = hasher.digest(category, value);
        let mut candidate = Token::new(category, digest.clone());
        let mut attempt = 1u32;
        while self.by_token.contains_key(&candidate.render()) {
            attempt += 1;
            candidate = Token::new(category, format!("{digest}-{attempt}"));
        }
        if attempt > 1 {
            self.collisions += 1;
        }

        self.by_value
            .insert((category, value.to_string()), candidate.clone());
        self.by_token.insert(
            candidate.render(),
            CorrelationEntry {
                category,
                original: value.to_string(),
                token: candidate.clone(),
            },
        );
        candidate
    }

    /// Resolve a token back to its original value
    pub fn resolve(&self, token: &Token) -> Option<&str> {
        self.resolve_text(&token.render())
    }

    /// Resolve a rendered token string back to its original value
    pub fn resolve_text(&self, token_text: &str) -> Option<&str> {
        self.by_token.get(token_text).map(|e| e.original.as_str())
    }

    /// All recorded entries, for audit flushing
    pub fn entries(&self) -> impl Iterator<Item = &CorrelationEntry> {
        self.by_token.values()
    }

    /// Number of distinct values interned
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    /// True when nothing was interned
    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }

    /// Number of digest collisions disambiguated
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

/// State scoped to one outbound/inbound round trip
///
/// Created before outbound processing, consulted during rehydration, and
/// dropped when the round trip completes. Never shared across requests; a
/// concurrent round trip gets its own context, so per-request state needs
/// no locking.
#[derive(Debug)]
pub struct AnonymizationContext {
    id: Uuid,
    created_at: DateTime<Utc>,
    store: CorrelationStore,
}

impl AnonymizationContext {
    /// Create a fresh context for one round trip
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            store: CorrelationStore::default(),
        }
    }

    /// Unique id of this round trip
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Read access to the correlation store
    pub fn store(&self) -> &CorrelationStore {
        &self.store
    }

    /// Mutable access for the anonymizer pass
    pub(crate) fn store_mut(&mut self) -> &mut CorrelationStore {
        &mut self.store
    }
}

impl Default for AnonymizationContext {
    fn default() -> Self {
        Self::new()
    }
}
