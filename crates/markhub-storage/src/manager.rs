//! Storage manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use markhub_core::config::storage::StorageConfig;
use markhub_core::error::AppError;
use markhub_core::result::AppResult;
use markhub_core::traits::storage::{BlobStore, ByteStream};

use crate::providers::local::LocalBlobStore;
use crate::providers::memory::MemoryBlobStore;

/// Blob store manager that wraps the configured provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StorageManager {
    /// The inner blob store provider.
    inner: Arc<dyn BlobStore>,
}

impl StorageManager {
    /// Create a new storage manager from configuration.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let inner: Arc<dyn BlobStore> = match config.provider.as_str() {
            "local" => {
                info!(root = %config.root, "Initializing local blob store");
                Arc::new(LocalBlobStore::new(&config.root).await?)
            }
            "memory" => {
                info!("Initializing in-memory blob store");
                Arc::new(MemoryBlobStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'. Supported: local, memory"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a storage manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn BlobStore>) -> Self {
        Self { inner: provider }
    }

    /// Get a reference to the inner provider.
    pub fn provider(&self) -> &dyn BlobStore {
        self.inner.as_ref()
    }
}

#[async_trait]
impl BlobStore for StorageManager {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        self.inner.read(path).await
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        self.inner.read_bytes(path).await
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        self.inner.write(path, data).await
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        self.inner.delete(path).await
    }

    async fn delete_prefix(&self, prefix: &str) -> AppResult<()> {
        self.inner.delete_prefix(prefix).await
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        self.inner.exists(path).await
    }
}
