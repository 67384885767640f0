//! Blob store trait for pluggable content storage backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for blob storage backends.
///
/// Version content is stored under opaque path handles
/// (e.g. `originals/{file_id}.{ext}`, `versions/{file_id}/v{n}.{ext}`).
/// The trait is defined here in `markhub-core` and implemented in
/// `markhub-storage` for the local filesystem and an in-memory backend.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read a blob and return its byte stream.
    async fn read(&self, path: &str) -> AppResult<ByteStream>;

    /// Read a blob into memory as a complete byte buffer.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Write bytes to a blob at the given path, creating parents as needed.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Delete the blob at the given path.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Delete every blob whose path starts with the given prefix.
    async fn delete_prefix(&self, prefix: &str) -> AppResult<()>;

    /// Check whether a blob exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;
}
