//! The flattening pipeline: rasterize selected users' scenes and
//! composite them onto the base document's pages.
//!
//! The pipeline is a pure compositor over supplied data — it never
//! touches the annotation store or version store itself. Its only
//! collaborators are the rasterizer and the per-kind page compositor.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;

use markhub_core::result::AppResult;
use markhub_core::traits::render::PageOverlay;
use markhub_core::types::DocumentKind;
use markhub_render::RenderEngine;

/// One selected user's per-page scenes, as fetched by the caller.
#[derive(Debug, Clone)]
pub struct UserSelection {
    /// The authoring user.
    pub user: String,
    /// Page index to opaque scene JSON.
    pub pages: std::collections::BTreeMap<u32, serde_json::Value>,
}

/// Flattens annotation layers onto a document.
#[derive(Debug, Clone)]
pub struct ExportPipeline {
    engine: RenderEngine,
}

impl ExportPipeline {
    /// Creates a pipeline over a render engine.
    pub fn new(engine: RenderEngine) -> Self {
        Self { engine }
    }

    /// Burn the selected users' scenes into the base document.
    ///
    /// Compositing order is a documented total order: ascending by user
    /// identifier, then ascending by page index within a user, so the
    /// same selection always produces byte-identical output. Page
    /// indices beyond the document's page count are dropped — structural
    /// edits may have removed pages since the annotation was drawn, and
    /// that is a normal case, not an error.
    pub async fn flatten(
        &self,
        base: &Bytes,
        kind: DocumentKind,
        mut selections: Vec<UserSelection>,
    ) -> AppResult<Bytes> {
        selections.sort_by(|a, b| a.user.cmp(&b.user));

        let compositor = self.engine.compositor_for(kind);
        let rasterizer = self.engine.rasterizer();
        let page_count = compositor.page_count(base).await?;

        let mut dimensions: HashMap<u32, (u32, u32)> = HashMap::new();
        let mut overlays: Vec<PageOverlay> = Vec::new();

        for selection in &selections {
            for (&page_index, scene) in &selection.pages {
                if page_index >= page_count {
                    debug!(
                        user = %selection.user,
                        page_index,
                        page_count,
                        "Dropping overlay for removed page"
                    );
                    continue;
                }

                let (width, height) = match dimensions.get(&page_index) {
                    Some(dims) => *dims,
                    None => {
                        let dims = compositor.page_dimensions(base, page_index).await?;
                        dimensions.insert(page_index, dims);
                        dims
                    }
                };

                // A rasterization failure fails the whole export; there
                // are no partial artifacts.
                let raster = rasterizer.rasterize(scene, width, height).await?;
                overlays.push(PageOverlay { page_index, raster });
            }
        }

        // The compositor stamps same-page overlays in slice order, which
        // here is ascending user order.
        overlays.sort_by_key(|o| o.page_index);
        compositor.composite(base, &overlays).await
    }
}
