//! Audit log repository implementation for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use markhub_core::error::{AppError, ErrorKind};
use markhub_core::result::AppResult;
use markhub_entity::audit::{AuditEntry, CreateAuditEntry};

use crate::repositories::AuditLogRepository;

/// PostgreSQL-backed repository for the append-only audit trail.
#[derive(Debug, Clone)]
pub struct PgAuditLogRepository {
    pool: PgPool,
}

impl PgAuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PgAuditLogRepository {
    async fn append(&self, entry: &CreateAuditEntry) -> AppResult<AuditEntry> {
        sqlx::query_as::<_, AuditEntry>(
            "INSERT INTO audit_log (file_id, username, action, details) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(entry.file_id)
        .bind(&entry.user)
        .bind(&entry.action)
        .bind(&entry.details)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append audit entry", e))
    }

    async fn recent(&self, file_id: Uuid, limit: u32) -> AppResult<Vec<AuditEntry>> {
        sqlx::query_as::<_, AuditEntry>(
            "SELECT * FROM audit_log WHERE file_id = $1 ORDER BY id DESC LIMIT $2",
        )
        .bind(file_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to query audit log", e))
    }
}
