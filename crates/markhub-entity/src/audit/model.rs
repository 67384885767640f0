//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable audit log entry recording a user action on a file.
///
/// The audit trail is append-only and consumed for display only; no
/// operation reads it back into a decision.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEntry {
    /// Monotonic entry identifier (insertion order).
    pub id: i64,
    /// The file the action was performed on.
    pub file_id: Uuid,
    /// The user who performed the action.
    #[sqlx(rename = "username")]
    pub user: String,
    /// The action that was performed (e.g. `"upload"`, `"annotate"`, `"reset"`).
    pub action: String,
    /// Additional details about the action (JSON).
    pub details: serde_json::Value,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a new audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditEntry {
    /// The file the action was performed on.
    pub file_id: Uuid,
    /// The user who performed the action.
    pub user: String,
    /// The action performed.
    pub action: String,
    /// Additional details.
    pub details: serde_json::Value,
}

impl CreateAuditEntry {
    /// Convenience constructor with empty details.
    pub fn new(file_id: Uuid, user: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            file_id,
            user: user.into(),
            action: action.into(),
            details: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Attach a details object.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
