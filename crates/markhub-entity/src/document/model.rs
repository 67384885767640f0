//! Document file entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use markhub_core::types::DocumentKind;

/// An annotatable document stored in MarkHub.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentFile {
    /// Unique file identifier.
    pub id: Uuid,
    /// The file name as uploaded (including extension).
    pub original_name: String,
    /// The structural kind of the document.
    #[sqlx(try_from = "String")]
    pub kind: DocumentKind,
    /// The file extension (lowercase, no dot).
    pub ext: String,
    /// The highest existing version number; 1 is the original upload.
    pub current_version: i32,
    /// When the file was uploaded.
    pub created_at: DateTime<Utc>,
    /// When the file was last structurally mutated.
    pub updated_at: DateTime<Utc>,
}

impl DocumentFile {
    /// MIME type of the document's content.
    pub fn content_type(&self) -> String {
        self.kind.content_type(&self.ext)
    }

    /// The original name without its extension.
    pub fn name_stem(&self) -> &str {
        self.original_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.original_name)
    }
}

/// Data required to create a new document record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    /// The file name as uploaded.
    pub original_name: String,
    /// The structural kind.
    pub kind: DocumentKind,
    /// The file extension (lowercase, no dot).
    pub ext: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_stem() {
        let file = DocumentFile {
            id: Uuid::new_v4(),
            original_name: "report.final.pdf".to_string(),
            kind: DocumentKind::Pdf,
            ext: "pdf".to_string(),
            current_version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(file.name_stem(), "report.final");
        assert_eq!(file.content_type(), "application/pdf");
    }
}
