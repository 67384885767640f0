//! Single-page image compositor.
//!
//! Raster documents are one-page documents: overlays for page 0 are
//! alpha-composited directly onto the decoded image. Output is always
//! PNG, regardless of the input encoding, so transparency survives.

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ImageEncoder, imageops};
use tracing::debug;

use markhub_core::error::{AppError, ErrorKind};
use markhub_core::result::AppResult;
use markhub_core::traits::render::{PageCompositor, PageOverlay};
use markhub_core::types::DocumentKind;

/// Compositor for raster image documents.
#[derive(Debug, Clone, Default)]
pub struct ImageCompositor;

impl ImageCompositor {
    /// Create an image compositor.
    pub fn new() -> Self {
        Self
    }
}

fn decode(doc: &Bytes) -> AppResult<image::RgbaImage> {
    image::load_from_memory(doc)
        .map(|img| img.to_rgba8())
        .map_err(|e| {
            AppError::with_source(ErrorKind::Validation, "Failed to decode image document", e)
        })
}

#[async_trait]
impl PageCompositor for ImageCompositor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Image
    }

    async fn page_count(&self, doc: &Bytes) -> AppResult<u32> {
        decode(doc)?;
        Ok(1)
    }

    async fn page_dimensions(&self, doc: &Bytes, index: u32) -> AppResult<(u32, u32)> {
        if index != 0 {
            return Err(AppError::not_found(format!("Page {index} out of range")));
        }
        let img = decode(doc)?;
        Ok(img.dimensions())
    }

    async fn composite(&self, doc: &Bytes, overlays: &[PageOverlay]) -> AppResult<Bytes> {
        let mut base = decode(doc)?;
        let (width, height) = base.dimensions();

        for overlay in overlays {
            if overlay.page_index != 0 {
                debug!(
                    page_index = overlay.page_index,
                    "Dropping overlay beyond document page count"
                );
                continue;
            }
            let decoded = image::load_from_memory(&overlay.raster)
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Rasterization,
                        "Failed to decode overlay raster",
                        e,
                    )
                })?
                .to_rgba8();
            // Tolerate rasters sized against stale dimensions.
            let decoded = if decoded.dimensions() != (width, height) {
                imageops::resize(&decoded, width, height, FilterType::Lanczos3)
            } else {
                decoded
            };
            imageops::overlay(&mut base, &decoded, 0, 0);
        }

        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(
                base.as_raw(),
                width,
                height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to encode composited image", e)
            })?;
        Ok(Bytes::from(out))
    }
}
