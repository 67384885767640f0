//! In-memory audit log repository.

use std::sync::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use markhub_core::result::AppResult;
use markhub_entity::audit::{AuditEntry, CreateAuditEntry};

use crate::repositories::AuditLogRepository;

/// In-memory repository for the append-only audit trail.
#[derive(Debug, Default)]
pub struct MemoryAuditLogRepository {
    entries: Mutex<Vec<AuditEntry>>,
    next_id: AtomicI64,
}

impl MemoryAuditLogRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<AuditEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl AuditLogRepository for MemoryAuditLogRepository {
    async fn append(&self, entry: &CreateAuditEntry) -> AppResult<AuditEntry> {
        let stored = AuditEntry {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            file_id: entry.file_id,
            user: entry.user.clone(),
            action: entry.action.clone(),
            details: entry.details.clone(),
            created_at: Utc::now(),
        };
        self.entries().push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, file_id: Uuid, limit: u32) -> AppResult<Vec<AuditEntry>> {
        let entries = self.entries();
        Ok(entries
            .iter()
            .rev()
            .filter(|e| e.file_id == file_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
