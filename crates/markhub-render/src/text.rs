//! Text painting via `cosmic-text`.
//!
//! Shapes text with the system font database and rasterizes glyphs into
//! the overlay raster. A host with no usable fonts paints nothing for
//! text objects; missing fonts are not a rasterization failure.

use std::fmt;

use cosmic_text::{Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache};
use image::RgbaImage;

use markhub_entity::scene::TextObject;

use crate::rasterizer::blend_pixel;

/// Stateful text painter wrapping a font system and glyph cache.
///
/// `FontSystem` is not `Sync`; the owning rasterizer serializes access
/// behind a mutex.
pub struct TextPainter {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl fmt::Debug for TextPainter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextPainter").finish_non_exhaustive()
    }
}

impl TextPainter {
    /// Create a painter over the system font database.
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    }

    /// Paint a text object into the raster, top-left anchored at
    /// `(obj.x, obj.y)`, clipped to the raster bounds.
    pub fn draw(&mut self, img: &mut RgbaImage, obj: &TextObject, family: &str, color: [u8; 4]) {
        if obj.text.is_empty() {
            return;
        }

        let font_size = obj.font_size.max(1.0);
        let metrics = Metrics::new(font_size, font_size * 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        let avail_w = (img.width() as f32 - obj.x).max(0.0);
        let avail_h = (img.height() as f32 - obj.y).max(0.0);
        buffer.set_size(&mut self.font_system, Some(avail_w), Some(avail_h));

        let attrs = Attrs::new().family(resolve_family(family));
        buffer.set_text(&mut self.font_system, &obj.text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let base = Color::rgba(color[0], color[1], color[2], color[3]);
        let origin_x = obj.x.round() as i32;
        let origin_y = obj.y.round() as i32;

        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            base,
            |x, y, w, h, pixel| {
                let rgba = [pixel.r(), pixel.g(), pixel.b(), pixel.a()];
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        blend_pixel(img, origin_x + x + dx, origin_y + y + dy, rgba);
                    }
                }
            },
        );
    }
}

impl Default for TextPainter {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a CSS-style family name onto a cosmic-text family.
fn resolve_family(family: &str) -> Family<'_> {
    match family {
        "sans-serif" => Family::SansSerif,
        "serif" => Family::Serif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        name => Family::Name(name),
    }
}
