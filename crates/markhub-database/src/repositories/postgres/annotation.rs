//! Annotation layer repository implementation for PostgreSQL.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use markhub_core::error::{AppError, ErrorKind};
use markhub_core::result::AppResult;
use markhub_entity::annotation::AnnotationLayer;

use crate::repositories::AnnotationRepository;

/// PostgreSQL-backed repository for per-user annotation layers.
///
/// The `pages` map is stored as a JSONB column; rows are mapped by hand
/// because the page-index keys arrive as JSON object keys.
#[derive(Debug, Clone)]
pub struct PgAnnotationRepository {
    pool: PgPool,
}

impl PgAnnotationRepository {
    /// Create a new annotation repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &PgRow) -> AppResult<AnnotationLayer> {
        let pages_value: serde_json::Value = row
            .try_get("pages")
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Missing pages column", e))?;
        let pages: BTreeMap<u32, serde_json::Value> = serde_json::from_value(pages_value)?;

        Ok(AnnotationLayer {
            file_id: row
                .try_get("file_id")
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Missing file_id", e))?,
            user: row
                .try_get("username")
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Missing username", e))?,
            revision: row
                .try_get("revision")
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Missing revision", e))?,
            pages,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Missing updated_at", e))?,
        })
    }
}

#[async_trait]
impl AnnotationRepository for PgAnnotationRepository {
    async fn find(&self, file_id: Uuid, user: &str) -> AppResult<Option<AnnotationLayer>> {
        let row = sqlx::query(
            "SELECT * FROM annotation_layers WHERE file_id = $1 AND username = $2",
        )
        .bind(file_id)
        .bind(user)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find layer", e))?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list(&self, file_id: Uuid) -> AppResult<Vec<AnnotationLayer>> {
        let rows = sqlx::query(
            "SELECT * FROM annotation_layers WHERE file_id = $1 ORDER BY username ASC",
        )
        .bind(file_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list layers", e))?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn put(
        &self,
        file_id: Uuid,
        user: &str,
        pages: &BTreeMap<u32, serde_json::Value>,
        expected_revision: i64,
    ) -> AppResult<AnnotationLayer> {
        let pages_value = serde_json::to_value(pages)?;

        let row = if expected_revision == 0 {
            // First save: insert-only, so a concurrent first save loses
            // cleanly instead of overwriting.
            sqlx::query(
                "INSERT INTO annotation_layers (file_id, username, pages, revision, updated_at) \
                 VALUES ($1, $2, $3, 1, NOW()) \
                 ON CONFLICT (file_id, username) DO NOTHING \
                 RETURNING *",
            )
            .bind(file_id)
            .bind(user)
            .bind(&pages_value)
            .fetch_optional(&self.pool)
            .await
        } else {
            sqlx::query(
                "UPDATE annotation_layers \
                 SET pages = $3, revision = revision + 1, updated_at = NOW() \
                 WHERE file_id = $1 AND username = $2 AND revision = $4 \
                 RETURNING *",
            )
            .bind(file_id)
            .bind(user)
            .bind(&pages_value)
            .bind(expected_revision)
            .fetch_optional(&self.pool)
            .await
        }
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save layer", e))?;

        match row {
            Some(row) => Self::map_row(&row),
            None => Err(AppError::conflict(format!(
                "Annotation layer for user '{user}' was modified concurrently; \
                 re-fetch and retry"
            ))),
        }
    }

    async fn delete(&self, file_id: Uuid, user: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM annotation_layers WHERE file_id = $1 AND username = $2",
        )
        .bind(file_id)
        .bind(user)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete layer", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_file(&self, file_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM annotation_layers WHERE file_id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete layers", e)
            })?;
        Ok(result.rows_affected())
    }
}
