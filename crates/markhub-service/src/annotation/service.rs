//! Annotation layer service — per-user, per-page vector scenes.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use markhub_core::error::AppError;
use markhub_core::result::AppResult;
use markhub_database::repositories::{AnnotationRepository, FileRepository};
use markhub_entity::annotation::AnnotationLayer;
use markhub_entity::scene::VectorScene;

use crate::audit::AuditService;
use crate::context::RequestContext;

/// Manages per-user annotation layers.
///
/// A layer is one record per (file, user), fully replaced on each save.
/// Saves are guarded by a compare-and-swap revision token; a stale save
/// is rejected with a conflict so concurrent writers cannot silently
/// discard each other's pages.
#[derive(Debug, Clone)]
pub struct AnnotationService {
    files: Arc<dyn FileRepository>,
    annotations: Arc<dyn AnnotationRepository>,
    audit: Arc<AuditService>,
}

impl AnnotationService {
    /// Creates a new annotation service.
    pub fn new(
        files: Arc<dyn FileRepository>,
        annotations: Arc<dyn AnnotationRepository>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            files,
            annotations,
            audit,
        }
    }

    async fn require_file(&self, file_id: Uuid) -> AppResult<()> {
        self.files
            .find_by_id(file_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// A user's layer; an empty-but-valid default if they never saved.
    pub async fn get_layer(&self, file_id: Uuid, user: &str) -> AppResult<AnnotationLayer> {
        self.require_file(file_id).await?;
        Ok(self
            .annotations
            .find(file_id, user)
            .await?
            .unwrap_or_else(|| AnnotationLayer::empty(file_id, user)))
    }

    /// Full-replace save of a user's layer.
    ///
    /// `expected_revision` must be the revision the client read (0 for a
    /// never-saved layer); a stale value is a conflict and the caller
    /// should re-fetch and retry.
    pub async fn put_layer(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        user: &str,
        pages: BTreeMap<u32, serde_json::Value>,
        expected_revision: i64,
    ) -> AppResult<AnnotationLayer> {
        self.require_file(file_id).await?;
        let layer = self
            .annotations
            .put(file_id, user, &pages, expected_revision)
            .await?;

        info!(
            user = %ctx.user,
            layer_user = user,
            file_id = %file_id,
            pages = layer.pages.len(),
            revision = layer.revision,
            "Saved annotation layer"
        );
        self.audit
            .record(
                file_id,
                user,
                "annotate",
                serde_json::json!({ "pages": layer.pages.len() }),
            )
            .await;
        Ok(layer)
    }

    /// Replace one page's scene via read-merge-write of the whole layer.
    pub async fn save_page(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        user: &str,
        page_index: u32,
        scene: serde_json::Value,
    ) -> AppResult<AnnotationLayer> {
        let layer = self.get_layer(file_id, user).await?;
        let mut pages = layer.pages;
        pages.insert(page_index, scene);
        self.put_layer(ctx, file_id, user, pages, layer.revision)
            .await
    }

    /// All users' layers for a file, ordered by user.
    pub async fn list_layers(&self, file_id: Uuid) -> AppResult<Vec<AnnotationLayer>> {
        self.require_file(file_id).await?;
        self.annotations.list(file_id).await
    }

    /// Delete a user's layer. Idempotent; deleting an absent layer is a
    /// no-op.
    pub async fn delete_layer(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        user: &str,
    ) -> AppResult<()> {
        self.require_file(file_id).await?;
        let removed = self.annotations.delete(file_id, user).await?;
        if removed {
            info!(user = %ctx.user, layer_user = user, file_id = %file_id, "Deleted annotation layer");
            self.audit
                .record(file_id, user, "annotation-delete", serde_json::json!({}))
                .await;
        }
        Ok(())
    }

    /// One page's combined scene for an editing session: every other
    /// user's objects merged in read-only beneath the active user's
    /// editable ones.
    pub async fn combined_scene(
        &self,
        file_id: Uuid,
        page_index: u32,
        active_user: &str,
    ) -> AppResult<VectorScene> {
        self.require_file(file_id).await?;
        let layers = self.annotations.list(file_id).await?;

        let mut combined = VectorScene::default();
        for layer in &layers {
            if layer.user == active_user {
                continue;
            }
            let Some(value) = layer.pages.get(&page_index) else {
                continue;
            };
            match VectorScene::from_value(value) {
                Ok(scene) => {
                    for mut object in scene.objects {
                        object.set_locked(true);
                        combined.objects.push(object);
                    }
                }
                Err(e) => {
                    warn!(
                        file_id = %file_id,
                        user = %layer.user,
                        page = page_index,
                        error = %e,
                        "Skipping malformed stored scene"
                    );
                }
            }
        }

        if let Some(value) = layers
            .iter()
            .find(|l| l.user == active_user)
            .and_then(|l| l.pages.get(&page_index))
        {
            let scene = VectorScene::from_value(value)?;
            combined.objects.extend(scene.objects);
        }

        Ok(combined)
    }
}
