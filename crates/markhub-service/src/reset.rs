//! Reset service — discard all annotation work and return a file to its
//! original content as a fresh head version.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use markhub_core::error::AppError;
use markhub_core::result::AppResult;
use markhub_core::traits::storage::BlobStore;
use markhub_database::repositories::{AnnotationRepository, FileRepository, VersionRepository};
use markhub_entity::document::DocumentVersion;
use markhub_storage::StorageManager;

use crate::context::RequestContext;
use crate::version::VersionService;

/// Restores a file to its original uploaded state.
///
/// Destructive: every user's annotation layer is removed outright (no
/// soft delete), and a new head version with version 1's content is
/// appended. History is never truncated.
#[derive(Debug, Clone)]
pub struct ResetService {
    files: Arc<dyn FileRepository>,
    version_rows: Arc<dyn VersionRepository>,
    annotations: Arc<dyn AnnotationRepository>,
    storage: Arc<StorageManager>,
    versions: Arc<VersionService>,
}

impl ResetService {
    /// Creates a new reset service.
    pub fn new(
        files: Arc<dyn FileRepository>,
        version_rows: Arc<dyn VersionRepository>,
        annotations: Arc<dyn AnnotationRepository>,
        storage: Arc<StorageManager>,
        versions: Arc<VersionService>,
    ) -> Self {
        Self {
            files,
            version_rows,
            annotations,
            storage,
            versions,
        }
    }

    /// Reset a file to its original content.
    pub async fn reset(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<DocumentVersion> {
        self.files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        let original = self.version_rows.find(file_id, 1).await?.ok_or_else(|| {
            AppError::internal(format!("Version 1 missing for file {file_id}"))
        })?;
        let content = self.storage.read_bytes(&original.storage_path).await?;

        // Append the restored version first; if that fails, nothing has
        // been discarded yet. `create_version` writes the one audit
        // entry for the reset.
        let version = self
            .versions
            .create_version(ctx, file_id, "reset", content)
            .await?;

        match self.annotations.delete_for_file(file_id).await {
            Ok(removed) => {
                info!(
                    user = %ctx.user,
                    file_id = %file_id,
                    layers_removed = removed,
                    version = version.version_number,
                    "Reset file to original"
                );
            }
            Err(e) => {
                warn!(
                    file_id = %file_id,
                    error = %e,
                    "Reset restored content but failed to remove annotation layers"
                );
                return Err(e);
            }
        }

        Ok(version)
    }
}
