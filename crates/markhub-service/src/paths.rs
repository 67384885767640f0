//! Blob store path layout.
//!
//! Originals live under `originals/`, later versions under a per-file
//! directory so a file deletion can drop them with one prefix delete.

use uuid::Uuid;

/// Path of the original upload (version 1).
pub fn original(file_id: Uuid, ext: &str) -> String {
    format!("originals/{file_id}.{ext}")
}

/// Path of a specific version's content.
pub fn version(file_id: Uuid, number: i32, ext: &str) -> String {
    format!("versions/{file_id}/v{number}.{ext}")
}

/// Prefix holding every version of a file except the original.
pub fn version_prefix(file_id: Uuid) -> String {
    format!("versions/{file_id}")
}
