//! In-memory file repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use markhub_core::error::AppError;
use markhub_core::result::AppResult;
use markhub_entity::document::{CreateDocument, DocumentFile};

use crate::repositories::FileRepository;

/// In-memory repository for document file records.
#[derive(Debug, Default)]
pub struct MemoryFileRepository {
    files: DashMap<Uuid, DocumentFile>,
}

impl MemoryFileRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileRepository for MemoryFileRepository {
    async fn create(&self, data: &CreateDocument) -> AppResult<DocumentFile> {
        let now = Utc::now();
        let file = DocumentFile {
            id: Uuid::new_v4(),
            original_name: data.original_name.clone(),
            kind: data.kind,
            ext: data.ext.clone(),
            current_version: 1,
            created_at: now,
            updated_at: now,
        };
        self.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DocumentFile>> {
        Ok(self.files.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> AppResult<Vec<DocumentFile>> {
        let mut files: Vec<DocumentFile> =
            self.files.iter().map(|entry| entry.value().clone()).collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(files)
    }

    async fn set_current_version(&self, id: Uuid, version: i32) -> AppResult<DocumentFile> {
        let mut entry = self
            .files
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;
        entry.current_version = version;
        entry.updated_at = Utc::now();
        Ok(entry.value().clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.files.remove(&id).is_some())
    }
}
