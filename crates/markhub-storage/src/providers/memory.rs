//! In-memory blob store provider.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures::stream;

use markhub_core::error::AppError;
use markhub_core::result::AppResult;
use markhub_core::traits::storage::{BlobStore, ByteStream};

/// In-memory blob store, used by tests and single-node development.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Bytes>,
}

impl MemoryBlobStore {
    /// Create an empty blob store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let data = self.read_bytes(path).await?;
        Ok(Box::pin(stream::once(async move { Ok(data) })))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        self.blobs
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {path}")))
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        self.blobs.insert(path.to_string(), data);
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        self.blobs.remove(path);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> AppResult<()> {
        let prefix = format!("{}/", prefix.trim_end_matches('/'));
        self.blobs.retain(|key, _| !key.starts_with(&prefix));
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.blobs.contains_key(path))
    }
}
