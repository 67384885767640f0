//! Export service — fetches the inputs and delegates to the pipeline.

use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use markhub_core::error::AppError;
use markhub_core::result::AppResult;
use markhub_core::traits::storage::BlobStore;
use markhub_core::types::DocumentKind;
use markhub_database::repositories::{AnnotationRepository, FileRepository, VersionRepository};
use markhub_storage::StorageManager;

use crate::audit::AuditService;
use crate::context::RequestContext;
use crate::export::pipeline::{ExportPipeline, UserSelection};

/// A flattened export artifact.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// The flattened document bytes.
    pub data: Bytes,
    /// MIME type of the artifact.
    pub content_type: String,
    /// Suggested download file name.
    pub filename: String,
}

/// Produces flattened documents with selected users' layers burned in.
///
/// Export is read-only with respect to the version store: it never
/// creates a version or advances `current_version`.
#[derive(Debug, Clone)]
pub struct ExportService {
    files: Arc<dyn FileRepository>,
    versions: Arc<dyn VersionRepository>,
    annotations: Arc<dyn AnnotationRepository>,
    storage: Arc<StorageManager>,
    audit: Arc<AuditService>,
    pipeline: ExportPipeline,
}

impl ExportService {
    /// Creates a new export service.
    pub fn new(
        files: Arc<dyn FileRepository>,
        versions: Arc<dyn VersionRepository>,
        annotations: Arc<dyn AnnotationRepository>,
        storage: Arc<StorageManager>,
        audit: Arc<AuditService>,
        pipeline: ExportPipeline,
    ) -> Self {
        Self {
            files,
            versions,
            annotations,
            storage,
            audit,
            pipeline,
        }
    }

    /// Flatten the selected users' annotation layers onto the file's
    /// current content.
    pub async fn export(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        users: &[String],
    ) -> AppResult<ExportArtifact> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        if users.is_empty() {
            return Err(AppError::empty_selection("No users selected for export"));
        }
        let users: BTreeSet<&String> = users.iter().collect();

        // Users who never saved a layer contribute nothing; that is not
        // an error.
        let mut selections = Vec::new();
        for user in &users {
            if let Some(layer) = self.annotations.find(file_id, user).await? {
                selections.push(UserSelection {
                    user: layer.user,
                    pages: layer.pages,
                });
            }
        }

        let current = self
            .versions
            .find(file_id, file.current_version)
            .await?
            .ok_or_else(|| {
                AppError::internal(format!(
                    "Current version {} missing for file {file_id}",
                    file.current_version
                ))
            })?;
        let base = self.storage.read_bytes(&current.storage_path).await?;

        let data = self.pipeline.flatten(&base, file.kind, selections).await?;

        let (content_type, artifact_ext) = match file.kind {
            DocumentKind::Pdf => ("application/pdf".to_string(), "pdf"),
            // The image compositor always emits PNG so transparency and
            // exact pixels survive re-encoding.
            DocumentKind::Image => ("image/png".to_string(), "png"),
        };
        let filename = format!("{}_annotated.{artifact_ext}", file.name_stem());

        info!(
            user = %ctx.user,
            file_id = %file_id,
            selected = users.len(),
            bytes = data.len(),
            "Exported flattened document"
        );
        self.audit
            .record(
                file_id,
                &ctx.user,
                "export",
                serde_json::json!({ "users": users.iter().collect::<Vec<_>>() }),
            )
            .await;

        Ok(ExportArtifact {
            data,
            content_type,
            filename,
        })
    }
}
