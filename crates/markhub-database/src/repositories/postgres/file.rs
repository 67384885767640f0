//! File repository implementation for PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use markhub_core::error::{AppError, ErrorKind};
use markhub_core::result::AppResult;
use markhub_entity::document::{CreateDocument, DocumentFile};

use crate::repositories::FileRepository;

/// PostgreSQL-backed repository for document file records.
#[derive(Debug, Clone)]
pub struct PgFileRepository {
    pool: PgPool,
}

impl PgFileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRepository for PgFileRepository {
    async fn create(&self, data: &CreateDocument) -> AppResult<DocumentFile> {
        sqlx::query_as::<_, DocumentFile>(
            "INSERT INTO document_files (original_name, kind, ext) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.original_name)
        .bind(data.kind.as_str())
        .bind(&data.ext)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create file", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DocumentFile>> {
        sqlx::query_as::<_, DocumentFile>("SELECT * FROM document_files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn list(&self) -> AppResult<Vec<DocumentFile>> {
        sqlx::query_as::<_, DocumentFile>(
            "SELECT * FROM document_files ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn set_current_version(&self, id: Uuid, version: i32) -> AppResult<DocumentFile> {
        sqlx::query_as::<_, DocumentFile>(
            "UPDATE document_files SET current_version = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update current version", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM document_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;
        Ok(result.rows_affected() > 0)
    }
}
