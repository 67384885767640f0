//! Repository traits and backend dispatch.
//!
//! Services program against the traits defined here; the concrete
//! implementations live in [`postgres`] and [`memory`] and are selected
//! at startup by the `[database]` configuration section.

pub mod memory;
pub mod postgres;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use markhub_core::config::database::DatabaseConfig;
use markhub_core::error::AppError;
use markhub_core::result::AppResult;
use markhub_entity::annotation::AnnotationLayer;
use markhub_entity::audit::{AuditEntry, CreateAuditEntry};
use markhub_entity::document::{CreateDocument, DocumentFile, DocumentVersion};

use crate::connection::DatabasePool;

/// Repository for document file records.
#[async_trait]
pub trait FileRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Create a new file record with `current_version = 1`.
    async fn create(&self, data: &CreateDocument) -> AppResult<DocumentFile>;

    /// Find a file by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DocumentFile>>;

    /// List all files, most recently created first.
    async fn list(&self) -> AppResult<Vec<DocumentFile>>;

    /// Set a file's current version number.
    async fn set_current_version(&self, id: Uuid, version: i32) -> AppResult<DocumentFile>;

    /// Delete a file record. Returns `true` if a record was deleted.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Repository for the append-only version history.
#[async_trait]
pub trait VersionRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Append a version row. Version numbers are unique per file.
    async fn create(&self, version: &DocumentVersion) -> AppResult<DocumentVersion>;

    /// Find one version of a file by number.
    async fn find(&self, file_id: Uuid, number: i32) -> AppResult<Option<DocumentVersion>>;

    /// List a file's full history, ascending by version number.
    async fn list(&self, file_id: Uuid) -> AppResult<Vec<DocumentVersion>>;

    /// Discard a deleted file's entire history.
    async fn delete_for_file(&self, file_id: Uuid) -> AppResult<u64>;
}

/// Repository for per-user annotation layers.
#[async_trait]
pub trait AnnotationRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user's layer for a file.
    async fn find(&self, file_id: Uuid, user: &str) -> AppResult<Option<AnnotationLayer>>;

    /// List all saved layers for a file, ordered by user.
    async fn list(&self, file_id: Uuid) -> AppResult<Vec<AnnotationLayer>>;

    /// Full-replace save guarded by compare-and-swap on the revision
    /// token.
    ///
    /// `expected_revision` must be the revision the caller read (0 for a
    /// never-saved layer). A mismatch returns a conflict error and
    /// leaves the stored layer untouched.
    async fn put(
        &self,
        file_id: Uuid,
        user: &str,
        pages: &BTreeMap<u32, serde_json::Value>,
        expected_revision: i64,
    ) -> AppResult<AnnotationLayer>;

    /// Delete a user's layer. Returns `true` if a layer existed.
    async fn delete(&self, file_id: Uuid, user: &str) -> AppResult<bool>;

    /// Delete every user's layer for a file. Returns the number removed.
    async fn delete_for_file(&self, file_id: Uuid) -> AppResult<u64>;
}

/// Repository for the append-only audit trail.
#[async_trait]
pub trait AuditLogRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Append an audit entry.
    async fn append(&self, entry: &CreateAuditEntry) -> AppResult<AuditEntry>;

    /// The most recent `limit` entries for a file, newest first.
    async fn recent(&self, file_id: Uuid, limit: u32) -> AppResult<Vec<AuditEntry>>;
}

/// Bundle of all repositories behind their traits.
///
/// Constructed once at startup and shared via `Arc` clones, following
/// the same dispatch-on-config pattern as the blob storage manager.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// Document file records.
    pub files: Arc<dyn FileRepository>,
    /// Version history.
    pub versions: Arc<dyn VersionRepository>,
    /// Annotation layers.
    pub annotations: Arc<dyn AnnotationRepository>,
    /// Audit trail.
    pub audit: Arc<dyn AuditLogRepository>,
}

impl Repositories {
    /// Construct the backend selected by configuration.
    ///
    /// The PostgreSQL backend connects a pool and runs migrations; the
    /// memory backend needs no external services.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend.as_str() {
            "postgres" => {
                let pool = DatabasePool::connect(config).await?;
                crate::migration::run_migrations(pool.pool()).await?;
                Ok(Self::postgres(pool.into_pool()))
            }
            "memory" => {
                info!("Initializing in-memory repositories");
                Ok(Self::memory())
            }
            other => Err(AppError::configuration(format!(
                "Unknown database backend: '{other}'. Supported: postgres, memory"
            ))),
        }
    }

    /// Construct the PostgreSQL-backed repositories over an existing pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            files: Arc::new(postgres::PgFileRepository::new(pool.clone())),
            versions: Arc::new(postgres::PgVersionRepository::new(pool.clone())),
            annotations: Arc::new(postgres::PgAnnotationRepository::new(pool.clone())),
            audit: Arc::new(postgres::PgAuditLogRepository::new(pool)),
        }
    }

    /// Construct the in-memory repositories.
    pub fn memory() -> Self {
        Self {
            files: Arc::new(memory::MemoryFileRepository::new()),
            versions: Arc::new(memory::MemoryVersionRepository::new()),
            annotations: Arc::new(memory::MemoryAnnotationRepository::new()),
            audit: Arc::new(memory::MemoryAuditLogRepository::new()),
        }
    }
}
