//! File lifecycle service — upload, browse, delete.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use markhub_core::config::storage::StorageConfig;
use markhub_core::error::AppError;
use markhub_core::result::AppResult;
use markhub_core::traits::storage::BlobStore;
use markhub_core::types::DocumentKind;
use markhub_database::repositories::{AnnotationRepository, FileRepository, VersionRepository};
use markhub_entity::document::{CreateDocument, DocumentFile, DocumentVersion};
use markhub_storage::StorageManager;

use crate::audit::AuditService;
use crate::context::RequestContext;
use crate::paths;

/// Manages document file lifecycle: upload, listing, deletion.
#[derive(Debug, Clone)]
pub struct FileService {
    files: Arc<dyn FileRepository>,
    versions: Arc<dyn VersionRepository>,
    annotations: Arc<dyn AnnotationRepository>,
    storage: Arc<StorageManager>,
    audit: Arc<AuditService>,
    config: StorageConfig,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        files: Arc<dyn FileRepository>,
        versions: Arc<dyn VersionRepository>,
        annotations: Arc<dyn AnnotationRepository>,
        storage: Arc<StorageManager>,
        audit: Arc<AuditService>,
        config: StorageConfig,
    ) -> Self {
        Self {
            files,
            versions,
            annotations,
            storage,
            audit,
            config,
        }
    }

    /// Upload a new document. The upload becomes version 1.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        filename: &str,
        content: Bytes,
    ) -> AppResult<DocumentFile> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
            .ok_or_else(|| AppError::validation("File name has no extension"))?;

        if !self.config.is_extension_allowed(&ext) {
            return Err(AppError::validation(format!(
                "File type .{ext} not allowed"
            )));
        }
        if content.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        let file = self
            .files
            .create(&CreateDocument {
                original_name: filename.to_string(),
                kind: DocumentKind::from_extension(&ext),
                ext: ext.clone(),
            })
            .await?;

        let storage_path = paths::original(file.id, &ext);
        let size_bytes = content.len() as i64;
        if let Err(e) = self.storage.write(&storage_path, content).await {
            // Roll the record back so a failed upload leaves no trace.
            self.cleanup_failed_upload(file.id).await;
            return Err(e);
        }

        let version = DocumentVersion {
            id: Uuid::new_v4(),
            file_id: file.id,
            version_number: 1,
            action: "upload".to_string(),
            storage_path: storage_path.clone(),
            size_bytes,
            created_by: ctx.user.clone(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.versions.create(&version).await {
            self.cleanup_failed_upload(file.id).await;
            let _ = self.storage.delete(&storage_path).await;
            return Err(e);
        }

        info!(
            user = %ctx.user,
            file_id = %file.id,
            name = %file.original_name,
            size_bytes,
            "Uploaded file"
        );
        self.audit
            .record(
                file.id,
                &ctx.user,
                "upload",
                serde_json::json!({ "original_name": file.original_name }),
            )
            .await;

        Ok(file)
    }

    async fn cleanup_failed_upload(&self, file_id: Uuid) {
        if let Err(e) = self.files.delete(file_id).await {
            error!(file_id = %file_id, error = %e, "Failed to clean up aborted upload");
        }
    }

    /// All files, most recently uploaded first.
    pub async fn list_files(&self) -> AppResult<Vec<DocumentFile>> {
        self.files.list().await
    }

    /// One file's record.
    pub async fn get_file(&self, file_id: Uuid) -> AppResult<DocumentFile> {
        self.files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Delete a file, its whole version history, and every user's
    /// annotation layer. A deleted file's history is discarded, never
    /// renumbered.
    pub async fn delete_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<()> {
        let file = self.get_file(file_id).await?;

        self.annotations.delete_for_file(file_id).await?;
        self.versions.delete_for_file(file_id).await?;
        self.files.delete(file_id).await?;

        self.storage
            .delete(&paths::original(file_id, &file.ext))
            .await?;
        self.storage
            .delete_prefix(&paths::version_prefix(file_id))
            .await?;

        info!(user = %ctx.user, file_id = %file_id, "Deleted file");
        self.audit
            .record(file_id, &ctx.user, "delete", serde_json::json!({}))
            .await;
        Ok(())
    }
}
