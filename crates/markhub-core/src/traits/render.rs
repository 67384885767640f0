//! Rasterizer and page compositor traits for the export pipeline.
//!
//! Scenes cross this boundary as opaque JSON; only the rasterizer
//! implementation parses them into typed drawables. Documents cross it
//! as raw bytes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;
use crate::types::DocumentKind;

/// Converts a serialized vector scene into a transparent-background
/// RGBA raster of the requested pixel dimensions, encoded as PNG.
#[async_trait]
pub trait SceneRasterizer: Send + Sync + std::fmt::Debug + 'static {
    /// Rasterize `scene` to `width` x `height` pixels.
    ///
    /// A malformed scene or a painting failure is a rasterization error;
    /// callers treat it as fatal for the whole export.
    async fn rasterize(
        &self,
        scene: &serde_json::Value,
        width: u32,
        height: u32,
    ) -> AppResult<Bytes>;
}

/// An overlay raster bound for one page of a document.
#[derive(Debug, Clone)]
pub struct PageOverlay {
    /// 0-based page index in the base document.
    pub page_index: u32,
    /// PNG-encoded RGBA raster sized to the page's pixel dimensions.
    pub raster: Bytes,
}

/// Composites overlay rasters onto the pages of a base document.
///
/// One implementation exists per [`DocumentKind`]: PDF documents get
/// overlays stamped into their page content streams, raster images are
/// alpha-composited directly.
#[async_trait]
pub trait PageCompositor: Send + Sync + std::fmt::Debug + 'static {
    /// The document kind this compositor handles.
    fn kind(&self) -> DocumentKind;

    /// Number of pages in the document (1 for images).
    async fn page_count(&self, doc: &Bytes) -> AppResult<u32>;

    /// Pixel dimensions of the page at `index`.
    async fn page_dimensions(&self, doc: &Bytes, index: u32) -> AppResult<(u32, u32)>;

    /// Alpha-composite the overlays onto the document, in the order given.
    ///
    /// Overlays for the same page are stamped in slice order; pages with
    /// no overlays pass through unchanged.
    async fn composite(&self, doc: &Bytes, overlays: &[PageOverlay]) -> AppResult<Bytes>;
}
