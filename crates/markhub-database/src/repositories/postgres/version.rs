//! Version history repository implementation for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use markhub_core::error::{AppError, ErrorKind};
use markhub_core::result::AppResult;
use markhub_entity::document::DocumentVersion;

use crate::repositories::VersionRepository;

/// PostgreSQL-backed repository for the append-only version history.
#[derive(Debug, Clone)]
pub struct PgVersionRepository {
    pool: PgPool,
}

impl PgVersionRepository {
    /// Create a new version repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionRepository for PgVersionRepository {
    async fn create(&self, version: &DocumentVersion) -> AppResult<DocumentVersion> {
        sqlx::query_as::<_, DocumentVersion>(
            "INSERT INTO document_versions \
             (id, file_id, version_number, action, storage_path, size_bytes, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(version.id)
        .bind(version.file_id)
        .bind(version.version_number)
        .bind(&version.action)
        .bind(&version.storage_path)
        .bind(version.size_bytes)
        .bind(&version.created_by)
        .bind(version.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The (file_id, version_number) unique constraint turns a
            // lost race between two writers into a conflict.
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                AppError::conflict(format!(
                    "Version {} already exists for file {}",
                    version.version_number, version.file_id
                ))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create version", e)
            }
        })
    }

    async fn find(&self, file_id: Uuid, number: i32) -> AppResult<Option<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE file_id = $1 AND version_number = $2",
        )
        .bind(file_id)
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    async fn list(&self, file_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        sqlx::query_as::<_, DocumentVersion>(
            "SELECT * FROM document_versions WHERE file_id = $1 ORDER BY version_number ASC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    async fn delete_for_file(&self, file_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM document_versions WHERE file_id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete versions", e)
            })?;
        Ok(result.rows_affected())
    }
}
