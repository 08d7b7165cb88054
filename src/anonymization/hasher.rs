//! Deterministic salted token digests

use crate::anonymization::models::Category;
use crate::config::SecretString;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};

/// Deterministic, salted digest generator
///
/// Identical `(category, value)` pairs always yield the identical digest for
/// the lifetime of the process: the salt is read once at startup and never
/// re-derived. Output is lowercase hex truncated to the configured width,
/// so the URL-safe token character set holds by construction. Collisions
/// across distinct values are possible at narrow widths and are the
/// correlation store's job to detect, not this type's.
pub struct TokenHasher {
    salt: SecretString,
    width: usize,
}

impl TokenHasher {
    /// Create a hasher with a process-wide salt and fixed digest width
    ///
    /// The width is clamped to the 64 hex characters a SHA-256 digest
    /// yields; deployment bounds (8-32) are enforced by config validation.
    pub fn new(salt: SecretString, width: usize) -> Self {
        Self {
            salt,
            width: width.clamp(1, 64),
        }
    }

    /// Digest a value under a category
    pub fn digest(&self, category: Category, value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.expose_secret().as_ref().as_bytes());
        hasher.update(category.prefix().as_bytes());
        hasher.update(b"\x00");
        hasher.update(value.as_bytes());
        let result = hasher.finalize();
        let hex = format!("{result:x}");
        hex[..self.width].to_string()
    }

    /// Configured digest width in hex characters
    pub fn width(&self) -> usize {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn hasher(width: usize) -> TokenHasher {
        TokenHasher::new(secret_string("test-salt-0123456789".to_string()), width)
    }

    #[test]
    fn test_digest_is_deterministic() {
        let h = hasher(12);
        let a = h.digest(Category::BranchName, "release/2.3");
        let b = h.digest(Category::BranchName, "release/2.3");
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_width() {
        for width in [8, 12, 16, 32] {
            let d = hasher(width).digest(Category::PipelineName, "frontend-deploy");
            assert_eq!(d.len(), width);
            assert!(d.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_digest_depends_on_category() {
        let h = hasher(16);
        let as_branch = h.digest(Category::BranchName, "main");
        let as_pipeline = h.digest(Category::PipelineName, "main");
        assert_ne!(as_branch, as_pipeline);
    }

    #[test]
    fn test_digest_depends_on_salt() {
        let a = TokenHasher::new(secret_string("salt-one-0123456789".into()), 16)
            .digest(Category::UserName, "jdoe");
        let b = TokenHasher::new(secret_string("salt-two-0123456789".into()), 16)
            .digest(Category::UserName, "jdoe");
        assert_ne!(a, b);
    }

    #[test]
    fn test_width_clamped_to_digest_length() {
        let oversized = hasher(100);
        assert_eq!(oversized.width(), 64);
        let d = oversized.digest(Category::NodeName, "build-agent-07");
        assert_eq!(d.len(), 64);

        assert_eq!(hasher(0).width(), 1);
    }

    #[test]
    fn test_distinct_values_differ() {
        let h = hasher(32);
        assert_ne!(
            h.digest(Category::RepositoryName, "acme/frontend"),
            h.digest(Category::RepositoryName, "acme/backend")
        );
    }
}
