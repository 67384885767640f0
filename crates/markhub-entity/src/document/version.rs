//! Document version entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable, numbered snapshot of a file's structural content.
///
/// Versions for a file form a total order by `version_number`; the
/// original upload is always version 1 and is never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentVersion {
    /// Unique version identifier.
    pub id: Uuid,
    /// The file this version belongs to.
    pub file_id: Uuid,
    /// Sequential version number, starting at 1.
    pub version_number: i32,
    /// Label describing what produced this version
    /// (e.g. `"upload"`, `"rotate"`, `"revert-to-v3"`, `"reset"`).
    pub action: String,
    /// Blob store handle for this version's content.
    pub storage_path: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// The user who created this version.
    pub created_by: String,
    /// When this version was created.
    pub created_at: DateTime<Utc>,
}
