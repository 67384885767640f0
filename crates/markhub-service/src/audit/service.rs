//! Audit trail service — fire-and-forget writes, bounded reads.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use markhub_core::result::AppResult;
use markhub_database::repositories::AuditLogRepository;
use markhub_entity::audit::{AuditEntry, CreateAuditEntry};

/// Default number of entries returned when the caller gives no limit.
pub const DEFAULT_QUERY_LIMIT: u32 = 100;
/// Hard cap on a single audit query.
const MAX_QUERY_LIMIT: u32 = 1000;

/// Records and queries the append-only audit trail.
#[derive(Debug, Clone)]
pub struct AuditService {
    repo: Arc<dyn AuditLogRepository>,
}

impl AuditService {
    /// Creates a new audit service.
    pub fn new(repo: Arc<dyn AuditLogRepository>) -> Self {
        Self { repo }
    }

    /// Append an audit entry.
    ///
    /// Fire-and-forget: a repository failure is logged and swallowed so
    /// that the calling mutation never fails on observability.
    pub async fn record(
        &self,
        file_id: Uuid,
        user: &str,
        action: &str,
        details: serde_json::Value,
    ) {
        let entry = CreateAuditEntry::new(file_id, user, action).with_details(details);
        if let Err(e) = self.repo.append(&entry).await {
            warn!(
                file_id = %file_id,
                action,
                error = %e,
                "Failed to write audit entry"
            );
        }
    }

    /// The most recent `limit` entries for a file, oldest of those
    /// first. Consumers display most-recent-first by reversing.
    pub async fn query(&self, file_id: Uuid, limit: u32) -> AppResult<Vec<AuditEntry>> {
        let limit = limit.clamp(1, MAX_QUERY_LIMIT);
        let mut entries = self.repo.recent(file_id, limit).await?;
        entries.reverse();
        Ok(entries)
    }
}
