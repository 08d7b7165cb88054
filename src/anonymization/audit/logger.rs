//! Audit logger for anonymization round trips
//!
//! When audit mode is enabled, each completed round trip appends one record
//! of its correlation entries to a local file. Originals are written as
//! salted SHA-256 hashes, never plaintext.

use crate::anonymization::context::AnonymizationContext;
use crate::anonymization::report::ScrubReport;
use crate::domain::{PipeguardError, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Audit record for one round trip
#[derive(Debug, Serialize)]
struct AuditRecord {
    timestamp: String,
    context_id: String,
    substitutions: usize,
    collisions: usize,
    complete: bool,
    entries: Vec<AuditEntry>,
}

/// One correlation entry with a hashed original
#[derive(Debug, Serialize)]
struct AuditEntry {
    category: String,
    token: String,
    /// SHA-256 of the original value; plaintext never reaches the log
    original_hash: String,
}

/// Append-only audit logger
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
}

impl AuditLogger {
    /// Create a new audit logger, ensuring the parent directory exists
    pub fn new(log_path: PathBuf, json_format: bool) -> Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PipeguardError::Audit(format!(
                    "Failed to create audit log directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        Ok(Self {
            log_path,
            json_format,
        })
    }

    /// Flush one completed round trip to the audit record
    pub fn log_round_trip(&self, ctx: &AnonymizationContext, report: &ScrubReport) -> Result<()> {
        let record = AuditRecord {
            timestamp: ctx.created_at().to_rfc3339(),
            context_id: ctx.id().to_string(),
            substitutions: report.total_substitutions(),
            collisions: report.collisions,
            complete: report.complete(),
            entries: ctx
                .store()
                .entries()
                .map(|e| AuditEntry {
                    category: e.category.prefix().to_string(),
                    token: e.token.render(),
                    original_hash: hash_value(&e.original),
                })
                .collect(),
        };

        self.write_record(&record)
    }

    fn write_record(&self, record: &AuditRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| {
                PipeguardError::Audit(format!(
                    "Failed to open audit log {}: {e}",
                    self.log_path.display()
                ))
            })?;

        if self.json_format {
            let line = serde_json::to_string(record)
                .map_err(|e| PipeguardError::Audit(format!("Failed to serialize record: {e}")))?;
            writeln!(file, "{line}")
                .map_err(|e| PipeguardError::Audit(format!("Failed to write record: {e}")))?;
        } else {
            writeln!(
                file,
                "[{}] context={} substitutions={} collisions={} complete={}",
                record.timestamp,
                record.context_id,
                record.substitutions,
                record.collisions,
                record.complete
            )
            .map_err(|e| PipeguardError::Audit(format!("Failed to write record: {e}")))?;
        }

        Ok(())
    }
}

fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::hasher::TokenHasher;
    use crate::anonymization::models::Category;
    use crate::config::secret_string;
    use tempfile::tempdir;

    fn context_with_entry() -> AnonymizationContext {
        let hasher = TokenHasher::new(secret_string("unit-test-salt-0123456789".into()), 12);
        let mut ctx = AnonymizationContext::new();
        ctx.store_mut()
            .intern(&hasher, Category::PipelineName, "frontend-deploy");
        ctx
    }

    #[test]
    fn test_logger_creates_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.log");
        let logger = AuditLogger::new(path.clone(), true);
        assert!(logger.is_ok());
        assert!(path.parent().unwrap().exists());
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash_value("frontend-deploy"), hash_value("frontend-deploy"));
        assert_ne!(hash_value("frontend-deploy"), hash_value("backend-deploy"));
    }

    #[test]
    fn test_no_plaintext_in_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let logger = AuditLogger::new(path.clone(), true).unwrap();

        let ctx = context_with_entry();
        logger.log_round_trip(&ctx, &ScrubReport::new()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(&ctx.id().to_string()));
        assert!(content.contains("PIPELINE_"));
        assert!(!content.contains("frontend-deploy"));
    }

    #[test]
    fn test_plain_text_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let logger = AuditLogger::new(path.clone(), false).unwrap();

        logger
            .log_round_trip(&context_with_entry(), &ScrubReport::new())
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("substitutions=0"));
        assert!(content.contains("complete=true"));
    }

    #[test]
    fn test_appends_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let logger = AuditLogger::new(path.clone(), true).unwrap();

        logger
            .log_round_trip(&context_with_entry(), &ScrubReport::new())
            .unwrap();
        logger
            .log_round_trip(&context_with_entry(), &ScrubReport::new())
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
