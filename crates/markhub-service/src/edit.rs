//! Structural edit service — page rotation/deletion for PDFs, crop/
//! resize/rotate for images. Every successful edit appends exactly one
//! new version.

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use markhub_core::error::{AppError, ErrorKind};
use markhub_core::result::AppResult;
use markhub_core::types::{DocumentKind, VersionSelector};
use markhub_database::repositories::FileRepository;
use markhub_entity::document::{DocumentFile, DocumentVersion};
use markhub_render::transform;

use crate::context::RequestContext;
use crate::version::VersionService;

/// Applies structural transforms and records them as versions.
#[derive(Debug, Clone)]
pub struct EditService {
    files: Arc<dyn FileRepository>,
    versions: Arc<VersionService>,
}

impl EditService {
    /// Creates a new edit service.
    pub fn new(files: Arc<dyn FileRepository>, versions: Arc<VersionService>) -> Self {
        Self { files, versions }
    }

    async fn current_content(
        &self,
        file_id: Uuid,
        expected_kind: DocumentKind,
    ) -> AppResult<(DocumentFile, Bytes)> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        if file.kind != expected_kind {
            return Err(AppError::validation(format!(
                "Operation requires a {} document, file is {}",
                expected_kind, file.kind
            )));
        }
        let current = self
            .versions
            .download(file_id, VersionSelector::Current)
            .await?;
        Ok((file, current.data))
    }

    /// Rotate one PDF page by 90, 180, or 270 degrees.
    pub async fn rotate_pdf_page(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        page_index: u32,
        angle: i32,
    ) -> AppResult<DocumentVersion> {
        let (_, content) = self.current_content(file_id, DocumentKind::Pdf).await?;
        let rotated = run_transform(move || transform::pdf::rotate_page(&content, page_index, angle))
            .await?;
        self.versions
            .create_version(ctx, file_id, "rotate", rotated)
            .await
    }

    /// Delete one PDF page.
    pub async fn delete_pdf_page(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        page_index: u32,
    ) -> AppResult<DocumentVersion> {
        let (_, content) = self.current_content(file_id, DocumentKind::Pdf).await?;
        let smaller =
            run_transform(move || transform::pdf::delete_page(&content, page_index)).await?;
        self.versions
            .create_version(ctx, file_id, "delete-page", smaller)
            .await
    }

    /// Crop an image document.
    pub async fn crop_image(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    ) -> AppResult<DocumentVersion> {
        let (file, content) = self.current_content(file_id, DocumentKind::Image).await?;
        let format = transform::image::format_for_extension(&file.ext);
        let cropped = run_transform(move || {
            transform::image::crop(&content, format, left, top, right, bottom)
        })
        .await?;
        self.versions
            .create_version(ctx, file_id, "crop", cropped)
            .await
    }

    /// Resize an image document.
    pub async fn resize_image(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        width: u32,
        height: u32,
    ) -> AppResult<DocumentVersion> {
        let (file, content) = self.current_content(file_id, DocumentKind::Image).await?;
        let format = transform::image::format_for_extension(&file.ext);
        let resized =
            run_transform(move || transform::image::resize(&content, format, width, height))
                .await?;
        self.versions
            .create_version(ctx, file_id, "resize", resized)
            .await
    }

    /// Rotate an image document by 90, 180, or 270 degrees.
    pub async fn rotate_image(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        angle: i32,
    ) -> AppResult<DocumentVersion> {
        let (file, content) = self.current_content(file_id, DocumentKind::Image).await?;
        let format = transform::image::format_for_extension(&file.ext);
        let rotated =
            run_transform(move || transform::image::rotate(&content, format, angle)).await?;
        self.versions
            .create_version(ctx, file_id, "rotate", rotated)
            .await
    }
}

/// Run a CPU-bound transform off the async runtime.
async fn run_transform<F>(f: F) -> AppResult<Bytes>
where
    F: FnOnce() -> AppResult<Bytes> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Transform task panicked", e))?
}
