//! Render engine bundling the rasterizer and per-kind compositors.

use std::sync::Arc;

use markhub_core::config::export::ExportConfig;
use markhub_core::traits::render::{PageCompositor, SceneRasterizer};
use markhub_core::types::DocumentKind;

use crate::compose::{ImageCompositor, PdfCompositor};
use crate::rasterizer::ScenePainter;

/// Bundle of rendering collaborators, constructed once at startup and
/// shared via `Arc` clones.
#[derive(Debug, Clone)]
pub struct RenderEngine {
    rasterizer: Arc<dyn SceneRasterizer>,
    pdf: Arc<dyn PageCompositor>,
    image: Arc<dyn PageCompositor>,
}

impl RenderEngine {
    /// Create an engine from export configuration.
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            rasterizer: Arc::new(ScenePainter::new(config)),
            pdf: Arc::new(PdfCompositor::new(config)),
            image: Arc::new(ImageCompositor::new()),
        }
    }

    /// The scene rasterizer.
    pub fn rasterizer(&self) -> Arc<dyn SceneRasterizer> {
        Arc::clone(&self.rasterizer)
    }

    /// The compositor for a document kind.
    pub fn compositor_for(&self, kind: DocumentKind) -> Arc<dyn PageCompositor> {
        match kind {
            DocumentKind::Pdf => Arc::clone(&self.pdf),
            DocumentKind::Image => Arc::clone(&self.image),
        }
    }
}
