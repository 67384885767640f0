//! Version history service — append, revert-by-copy, download.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use markhub_core::error::AppError;
use markhub_core::result::AppResult;
use markhub_core::traits::storage::{BlobStore, ByteStream};
use markhub_core::types::VersionSelector;
use markhub_database::repositories::{FileRepository, VersionRepository};
use markhub_entity::document::{DocumentFile, DocumentVersion};
use markhub_storage::StorageManager;

use crate::audit::AuditService;
use crate::context::RequestContext;
use crate::paths;

/// A downloaded version's bytes plus response metadata.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    /// The version's content.
    pub data: Bytes,
    /// MIME type of the content.
    pub content_type: String,
    /// Suggested download file name.
    pub filename: String,
}

/// A downloaded version as a byte stream plus response metadata.
pub struct DownloadStream {
    /// The version's content stream.
    pub stream: ByteStream,
    /// MIME type of the content.
    pub content_type: String,
    /// Suggested download file name.
    pub filename: String,
}

/// Manages the append-only version history of a file.
#[derive(Debug, Clone)]
pub struct VersionService {
    files: Arc<dyn FileRepository>,
    versions: Arc<dyn VersionRepository>,
    storage: Arc<StorageManager>,
    audit: Arc<AuditService>,
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(
        files: Arc<dyn FileRepository>,
        versions: Arc<dyn VersionRepository>,
        storage: Arc<StorageManager>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            files,
            versions,
            storage,
            audit,
        }
    }

    async fn require_file(&self, file_id: Uuid) -> AppResult<DocumentFile> {
        self.files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Append a new head version with the given content.
    ///
    /// Effect order is blob write, version row, current-version bump, so
    /// a failure part-way leaves the visible history untouched.
    pub async fn create_version(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        action: &str,
        content: Bytes,
    ) -> AppResult<DocumentVersion> {
        let file = self.require_file(file_id).await?;
        let next = file.current_version + 1;

        let storage_path = paths::version(file_id, next, &file.ext);
        let size_bytes = content.len() as i64;
        self.storage.write(&storage_path, content).await?;

        let version = DocumentVersion {
            id: Uuid::new_v4(),
            file_id,
            version_number: next,
            action: action.to_string(),
            storage_path,
            size_bytes,
            created_by: ctx.user.clone(),
            created_at: Utc::now(),
        };
        self.versions.create(&version).await?;
        self.files.set_current_version(file_id, next).await?;

        info!(
            user = %ctx.user,
            file_id = %file_id,
            version = next,
            action,
            "Created version"
        );
        self.audit
            .record(
                file_id,
                &ctx.user,
                action,
                serde_json::json!({ "version": next }),
            )
            .await;

        Ok(version)
    }

    /// Duplicate an existing version's content into a new head version.
    ///
    /// Versions above the target are never deleted; they stay reachable
    /// by direct download, only no longer current.
    pub async fn revert(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        target: i32,
    ) -> AppResult<DocumentVersion> {
        self.require_file(file_id).await?;

        let target_version = self
            .versions
            .find(file_id, target)
            .await?
            .ok_or_else(|| {
                AppError::invalid_version(format!(
                    "Version {target} does not exist for file {file_id}"
                ))
            })?;

        let content = self.storage.read_bytes(&target_version.storage_path).await?;
        self.create_version(ctx, file_id, &format!("revert-to-v{target}"), content)
            .await
    }

    /// Full version history, ascending.
    pub async fn list_versions(&self, file_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        self.require_file(file_id).await?;
        self.versions.list(file_id).await
    }

    async fn resolve_version(
        &self,
        file_id: Uuid,
        selector: VersionSelector,
    ) -> AppResult<(DocumentFile, DocumentVersion)> {
        let file = self.require_file(file_id).await?;
        let number = match selector {
            VersionSelector::Original => 1,
            VersionSelector::Current => file.current_version,
            VersionSelector::Number(n) => n,
        };

        let version = self.versions.find(file_id, number).await?.ok_or_else(|| {
            AppError::not_found(format!("Version {number} not found for file {file_id}"))
        })?;
        Ok((file, version))
    }

    fn download_filename(file: &DocumentFile, selector: VersionSelector) -> String {
        match selector {
            VersionSelector::Number(n) => format!("{}_v{}.{}", file.name_stem(), n, file.ext),
            _ => file.original_name.clone(),
        }
    }

    /// Download a version's content by selector, fully buffered.
    pub async fn download(
        &self,
        file_id: Uuid,
        selector: VersionSelector,
    ) -> AppResult<DownloadResult> {
        let (file, version) = self.resolve_version(file_id, selector).await?;
        let data = self.storage.read_bytes(&version.storage_path).await?;

        Ok(DownloadResult {
            data,
            content_type: file.content_type(),
            filename: Self::download_filename(&file, selector),
        })
    }

    /// Download a version's content by selector as a byte stream.
    pub async fn download_stream(
        &self,
        file_id: Uuid,
        selector: VersionSelector,
    ) -> AppResult<DownloadStream> {
        let (file, version) = self.resolve_version(file_id, selector).await?;
        let stream = self.storage.read(&version.storage_path).await?;

        Ok(DownloadStream {
            stream,
            content_type: file.content_type(),
            filename: Self::download_filename(&file, selector),
        })
    }
}
