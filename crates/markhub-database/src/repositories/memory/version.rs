//! In-memory version history repository.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use markhub_core::error::AppError;
use markhub_core::result::AppResult;
use markhub_entity::document::DocumentVersion;

use crate::repositories::VersionRepository;

/// In-memory repository for the append-only version history.
#[derive(Debug, Default)]
pub struct MemoryVersionRepository {
    versions: DashMap<Uuid, Vec<DocumentVersion>>,
}

impl MemoryVersionRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VersionRepository for MemoryVersionRepository {
    async fn create(&self, version: &DocumentVersion) -> AppResult<DocumentVersion> {
        let mut history = self.versions.entry(version.file_id).or_default();
        if history
            .iter()
            .any(|v| v.version_number == version.version_number)
        {
            return Err(AppError::conflict(format!(
                "Version {} already exists for file {}",
                version.version_number, version.file_id
            )));
        }
        history.push(version.clone());
        Ok(version.clone())
    }

    async fn find(&self, file_id: Uuid, number: i32) -> AppResult<Option<DocumentVersion>> {
        Ok(self.versions.get(&file_id).and_then(|history| {
            history
                .iter()
                .find(|v| v.version_number == number)
                .cloned()
        }))
    }

    async fn list(&self, file_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        let mut history: Vec<DocumentVersion> = self
            .versions
            .get(&file_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        history.sort_by_key(|v| v.version_number);
        Ok(history)
    }

    async fn delete_for_file(&self, file_id: Uuid) -> AppResult<u64> {
        Ok(self
            .versions
            .remove(&file_id)
            .map(|(_, history)| history.len() as u64)
            .unwrap_or(0))
    }
}
