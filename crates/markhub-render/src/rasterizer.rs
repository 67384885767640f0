//! Vector scene rasterizer.
//!
//! Parses opaque scene JSON into the typed model and paints it onto a
//! transparent RGBA raster, object by object in scene order. Output is
//! PNG so the compositors can consume it without knowing pixel layout.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, Rgba, RgbaImage};

use markhub_core::config::export::ExportConfig;
use markhub_core::error::{AppError, ErrorKind};
use markhub_core::result::AppResult;
use markhub_core::traits::render::SceneRasterizer;
use markhub_entity::scene::{
    EllipseObject, Paint, RectObject, SceneObject, StrokeObject, VectorScene,
};

use crate::color::parse_color;
use crate::text::TextPainter;

/// Upper bound on raster dimensions, so one export cannot exhaust memory.
const MAX_DIMENSION: u32 = 16_384;

/// The default scene rasterizer.
#[derive(Debug, Clone)]
pub struct ScenePainter {
    /// Font family for text objects.
    font_family: String,
    /// Shared text painter; `FontSystem` is not `Sync`.
    text: Arc<Mutex<TextPainter>>,
}

impl ScenePainter {
    /// Create a rasterizer from export configuration.
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            font_family: config.font_family.clone(),
            text: Arc::new(Mutex::new(TextPainter::new())),
        }
    }

    fn text_painter(&self) -> MutexGuard<'_, TextPainter> {
        match self.text.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn paint(&self, scene: &VectorScene, width: u32, height: u32) -> AppResult<Bytes> {
        let mut img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

        for object in &scene.objects {
            match object {
                SceneObject::Stroke(stroke) => draw_stroke(&mut img, stroke),
                SceneObject::Rect(rect) => draw_rect(&mut img, rect),
                SceneObject::Ellipse(ellipse) => draw_ellipse(&mut img, ellipse),
                SceneObject::Text(text) => {
                    let color = stroke_color(&text.paint);
                    self.text_painter()
                        .draw(&mut img, text, &self.font_family, color);
                }
            }
        }

        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(
                img.as_raw(),
                width,
                height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Rasterization,
                    "Failed to encode overlay PNG",
                    e,
                )
            })?;
        Ok(Bytes::from(out))
    }
}

#[async_trait]
impl SceneRasterizer for ScenePainter {
    async fn rasterize(
        &self,
        scene: &serde_json::Value,
        width: u32,
        height: u32,
    ) -> AppResult<Bytes> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(AppError::rasterization(format!(
                "Invalid raster dimensions {width}x{height}"
            )));
        }

        let scene = VectorScene::from_value(scene).map_err(|e| {
            AppError::new(
                ErrorKind::Rasterization,
                format!("Malformed scene: {}", e.message),
            )
        })?;

        let painter = self.clone();
        tokio::task::spawn_blocking(move || painter.paint(&scene, width, height))
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Rasterization task panicked", e)
            })?
    }
}

/// Stroke color with object opacity applied.
fn stroke_color(paint: &Paint) -> [u8; 4] {
    let base = paint
        .stroke
        .as_deref()
        .map(parse_color)
        .unwrap_or([0, 0, 0, 255]);
    apply_opacity(base, paint.opacity)
}

/// Fill color with object opacity applied, if the object has a fill.
fn fill_color(paint: &Paint) -> Option<[u8; 4]> {
    paint
        .fill
        .as_deref()
        .map(parse_color)
        .map(|c| apply_opacity(c, paint.opacity))
}

fn apply_opacity(color: [u8; 4], opacity: f32) -> [u8; 4] {
    let alpha = (color[3] as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    [color[0], color[1], color[2], alpha]
}

/// Source-over blend of one pixel, clipped to the raster bounds.
pub(crate) fn blend_pixel(img: &mut RgbaImage, x: i32, y: i32, color: [u8; 4]) {
    if color[3] == 0 || x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let dst = img.get_pixel_mut(x as u32, y as u32);
    let sa = color[3] as u32;
    let da = dst[3] as u32;
    let out_a = sa + da * (255 - sa) / 255;
    if out_a == 0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for i in 0..3 {
        let sc = color[i] as u32;
        let dc = dst[i] as u32;
        dst[i] = ((sc * sa + dc * da * (255 - sa) / 255) / out_a) as u8;
    }
    dst[3] = out_a as u8;
}

/// Stamp a filled disc centered at `(cx, cy)`.
fn stamp_disc(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: [u8; 4]) {
    let r = radius.max(0.5);
    let x0 = (cx - r).floor() as i32;
    let x1 = (cx + r).ceil() as i32;
    let y0 = (cy - r).floor() as i32;
    let y1 = (cy + r).ceil() as i32;
    let r2 = r * r;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                blend_pixel(img, x, y, color);
            }
        }
    }
}

/// Draw a thick line segment by stamping discs along it.
fn draw_segment(img: &mut RgbaImage, a: [f32; 2], b: [f32; 2], width: f32, color: [u8; 4]) {
    let radius = (width / 2.0).max(0.5);
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let length = (dx * dx + dy * dy).sqrt();
    // Step at half the radius so stamps overlap into a solid stroke.
    let steps = ((length / (radius * 0.5).max(0.25)).ceil() as u32).max(1);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        stamp_disc(img, a[0] + dx * t, a[1] + dy * t, radius, color);
    }
}

fn draw_stroke(img: &mut RgbaImage, stroke: &StrokeObject) {
    let color = stroke_color(&stroke.paint);
    match stroke.points.as_slice() {
        [] => {}
        [point] => stamp_disc(
            img,
            point[0],
            point[1],
            (stroke.paint.stroke_width / 2.0).max(0.5),
            color,
        ),
        points => {
            for pair in points.windows(2) {
                draw_segment(img, pair[0], pair[1], stroke.paint.stroke_width, color);
            }
        }
    }
}

fn fill_span(img: &mut RgbaImage, x0: f32, y0: f32, x1: f32, y1: f32, color: [u8; 4]) {
    let xa = x0.min(x1).floor() as i32;
    let xb = x0.max(x1).ceil() as i32;
    let ya = y0.min(y1).floor() as i32;
    let yb = y0.max(y1).ceil() as i32;
    for y in ya..yb {
        for x in xa..xb {
            blend_pixel(img, x, y, color);
        }
    }
}

fn draw_rect(img: &mut RgbaImage, rect: &RectObject) {
    let (x0, y0) = (rect.x, rect.y);
    let (x1, y1) = (rect.x + rect.width, rect.y + rect.height);

    if let Some(fill) = fill_color(&rect.paint) {
        fill_span(img, x0, y0, x1, y1, fill);
    }
    if rect.paint.stroke.is_some() {
        let color = stroke_color(&rect.paint);
        let w = rect.paint.stroke_width;
        draw_segment(img, [x0, y0], [x1, y0], w, color);
        draw_segment(img, [x1, y0], [x1, y1], w, color);
        draw_segment(img, [x1, y1], [x0, y1], w, color);
        draw_segment(img, [x0, y1], [x0, y0], w, color);
    }
}

fn draw_ellipse(img: &mut RgbaImage, ellipse: &EllipseObject) {
    let rx = ellipse.rx.max(0.0);
    let ry = ellipse.ry.max(0.0);
    if rx == 0.0 || ry == 0.0 {
        return;
    }

    if let Some(fill) = fill_color(&ellipse.paint) {
        let x0 = (ellipse.cx - rx).floor() as i32;
        let x1 = (ellipse.cx + rx).ceil() as i32;
        let y0 = (ellipse.cy - ry).floor() as i32;
        let y1 = (ellipse.cy + ry).ceil() as i32;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let nx = (x as f32 + 0.5 - ellipse.cx) / rx;
                let ny = (y as f32 + 0.5 - ellipse.cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    blend_pixel(img, x, y, fill);
                }
            }
        }
    }

    if ellipse.paint.stroke.is_some() {
        let color = stroke_color(&ellipse.paint);
        let radius = (ellipse.paint.stroke_width / 2.0).max(0.5);
        let perimeter = std::f32::consts::PI * (rx + ry);
        let steps = ((perimeter / (radius * 0.5).max(0.25)).ceil() as u32).max(16);
        for i in 0..steps {
            let theta = i as f32 / steps as f32 * std::f32::consts::TAU;
            stamp_disc(
                img,
                ellipse.cx + rx * theta.cos(),
                ellipse.cy + ry * theta.sin(),
                radius,
                color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markhub_core::traits::render::SceneRasterizer as _;

    fn painter() -> ScenePainter {
        ScenePainter::new(&ExportConfig::default())
    }

    fn rect_scene() -> serde_json::Value {
        serde_json::json!({
            "objects": [{
                "kind": "rect",
                "x": 10.0, "y": 10.0, "width": 30.0, "height": 20.0,
                "paint": {"stroke": "#ff0000", "stroke_width": 2.0, "fill": "#00ff00"}
            }]
        })
    }

    #[tokio::test]
    async fn test_empty_scene_is_fully_transparent() {
        let png = painter()
            .rasterize(&serde_json::json!({"objects": []}), 16, 16)
            .await
            .unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[tokio::test]
    async fn test_rect_fill_and_outline() {
        let png = painter().rasterize(&rect_scene(), 64, 48).await.unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        // Interior is green, border is red, outside is transparent.
        assert_eq!(*img.get_pixel(25, 20), Rgba([0, 255, 0, 255]));
        assert_eq!(*img.get_pixel(10, 20), Rgba([255, 0, 0, 255]));
        assert_eq!(*img.get_pixel(60, 45), Rgba([0, 0, 0, 0]));
    }

    #[tokio::test]
    async fn test_stroke_covers_its_path() {
        let scene = serde_json::json!({
            "objects": [{
                "kind": "stroke",
                "points": [[5.0, 16.0], [27.0, 16.0]],
                "paint": {"stroke": "#0000ff", "stroke_width": 4.0}
            }]
        });
        let png = painter().rasterize(&scene, 32, 32).await.unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(*img.get_pixel(16, 16), Rgba([0, 0, 255, 255]));
        assert_eq!(*img.get_pixel(16, 2), Rgba([0, 0, 0, 0]));
    }

    #[tokio::test]
    async fn test_repeated_rasterization_is_byte_identical() {
        let p = painter();
        let first = p.rasterize(&rect_scene(), 64, 48).await.unwrap();
        let second = p.rasterize(&rect_scene(), 64, 48).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_zero_dimensions_rejected() {
        let err = painter()
            .rasterize(&rect_scene(), 0, 48)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Rasterization);
    }

    #[tokio::test]
    async fn test_malformed_scene_rejected() {
        let scene = serde_json::json!({"objects": [{"kind": "hexagon"}]});
        let err = painter().rasterize(&scene, 16, 16).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Rasterization);
    }

    #[tokio::test]
    async fn test_text_object_never_panics_without_fonts() {
        let scene = serde_json::json!({
            "objects": [{
                "kind": "text",
                "x": 2.0, "y": 2.0, "text": "hello", "font_size": 12.0,
                "paint": {"stroke": "#000000"}
            }]
        });
        // Glyph output depends on the host's font database; the call
        // must succeed either way.
        painter().rasterize(&scene, 64, 32).await.unwrap();
    }
}
