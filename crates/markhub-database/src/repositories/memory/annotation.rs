//! In-memory annotation layer repository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use markhub_core::error::AppError;
use markhub_core::result::AppResult;
use markhub_entity::annotation::AnnotationLayer;

use crate::repositories::AnnotationRepository;

/// In-memory repository for per-user annotation layers.
#[derive(Debug, Default)]
pub struct MemoryAnnotationRepository {
    layers: DashMap<(Uuid, String), AnnotationLayer>,
}

impl MemoryAnnotationRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnnotationRepository for MemoryAnnotationRepository {
    async fn find(&self, file_id: Uuid, user: &str) -> AppResult<Option<AnnotationLayer>> {
        Ok(self
            .layers
            .get(&(file_id, user.to_string()))
            .map(|entry| entry.value().clone()))
    }

    async fn list(&self, file_id: Uuid) -> AppResult<Vec<AnnotationLayer>> {
        let mut layers: Vec<AnnotationLayer> = self
            .layers
            .iter()
            .filter(|entry| entry.key().0 == file_id)
            .map(|entry| entry.value().clone())
            .collect();
        layers.sort_by(|a, b| a.user.cmp(&b.user));
        Ok(layers)
    }

    async fn put(
        &self,
        file_id: Uuid,
        user: &str,
        pages: &BTreeMap<u32, serde_json::Value>,
        expected_revision: i64,
    ) -> AppResult<AnnotationLayer> {
        let stale = || {
            AppError::conflict(format!(
                "Annotation layer for user '{user}' was modified concurrently; \
                 re-fetch and retry"
            ))
        };

        match self.layers.entry((file_id, user.to_string())) {
            Entry::Vacant(vacant) => {
                if expected_revision != 0 {
                    return Err(stale());
                }
                let layer = AnnotationLayer {
                    file_id,
                    user: user.to_string(),
                    revision: 1,
                    pages: pages.clone(),
                    updated_at: Some(Utc::now()),
                };
                vacant.insert(layer.clone());
                Ok(layer)
            }
            Entry::Occupied(mut occupied) => {
                if occupied.get().revision != expected_revision {
                    return Err(stale());
                }
                let layer = occupied.get_mut();
                layer.pages = pages.clone();
                layer.revision += 1;
                layer.updated_at = Some(Utc::now());
                Ok(layer.clone())
            }
        }
    }

    async fn delete(&self, file_id: Uuid, user: &str) -> AppResult<bool> {
        Ok(self.layers.remove(&(file_id, user.to_string())).is_some())
    }

    async fn delete_for_file(&self, file_id: Uuid) -> AppResult<u64> {
        let keys: Vec<(Uuid, String)> = self
            .layers
            .iter()
            .filter(|entry| entry.key().0 == file_id)
            .map(|entry| entry.key().clone())
            .collect();
        let mut removed = 0;
        for key in keys {
            if self.layers.remove(&key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
