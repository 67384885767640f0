//! PDF page compositor.
//!
//! Overlay rasters are embedded as image XObjects (FlateDecode RGB with
//! a DeviceGray SMask for alpha) and stamped over each page's existing
//! content stream, scaled to the page's MediaBox. Overlay coordinates
//! are in unrotated MediaBox space; /Rotate is not compensated.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use markhub_core::config::export::ExportConfig;
use markhub_core::error::{AppError, ErrorKind};
use markhub_core::result::AppResult;
use markhub_core::traits::render::{PageCompositor, PageOverlay};
use markhub_core::types::DocumentKind;

/// Fallback page size (US Letter, points) when no MediaBox is present.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Compositor for PDF documents.
#[derive(Debug, Clone)]
pub struct PdfCompositor {
    /// Pixels per PDF point when reporting page dimensions.
    raster_scale: f32,
}

impl PdfCompositor {
    /// Create a compositor from export configuration.
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            raster_scale: config.raster_scale.max(0.1),
        }
    }
}

#[async_trait]
impl PageCompositor for PdfCompositor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    async fn page_count(&self, doc: &Bytes) -> AppResult<u32> {
        let doc = load(doc)?;
        Ok(doc.get_pages().len() as u32)
    }

    async fn page_dimensions(&self, doc: &Bytes, index: u32) -> AppResult<(u32, u32)> {
        let doc = load(doc)?;
        let page_id = page_at(&doc, index)?;
        let (w, h) = media_box(&doc, page_id);
        Ok((
            (w * self.raster_scale).round().max(1.0) as u32,
            (h * self.raster_scale).round().max(1.0) as u32,
        ))
    }

    async fn composite(&self, doc_bytes: &Bytes, overlays: &[PageOverlay]) -> AppResult<Bytes> {
        if overlays.is_empty() {
            return Ok(doc_bytes.clone());
        }

        let mut doc = load(doc_bytes)?;
        let pages: Vec<ObjectId> = doc.get_pages().values().cloned().collect();

        // Group by page, preserving the caller's stamping order.
        let mut by_page: BTreeMap<u32, Vec<&PageOverlay>> = BTreeMap::new();
        for overlay in overlays {
            if (overlay.page_index as usize) < pages.len() {
                by_page.entry(overlay.page_index).or_default().push(overlay);
            } else {
                debug!(
                    page_index = overlay.page_index,
                    page_count = pages.len(),
                    "Dropping overlay beyond document page count"
                );
            }
        }

        let mut counter = 0usize;
        for (page_index, page_overlays) in by_page {
            let page_id = pages[page_index as usize];
            let (pw, ph) = media_box(&doc, page_id);

            let mut names = Vec::new();
            let mut ops = String::new();
            for overlay in page_overlays {
                counter += 1;
                let name = format!("MHov{counter}");
                let xobject_id = embed_overlay(&mut doc, &overlay.raster)?;
                ops.push_str(&format!("q\n{pw} 0 0 {ph} 0 0 cm\n/{name} Do\nQ\n"));
                names.push((name, xobject_id));
            }

            register_xobjects(&mut doc, page_id, &names)?;

            let existing = doc.get_page_content(page_id).map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to read page content", e)
            })?;
            // Wrap existing content in q/Q so a dangling graphics state
            // cannot displace the overlays.
            let mut content = Vec::with_capacity(existing.len() + ops.len() + 4);
            content.extend_from_slice(b"q\n");
            content.extend_from_slice(&existing);
            content.extend_from_slice(b"\nQ\n");
            content.extend_from_slice(ops.as_bytes());
            doc.change_page_content(page_id, content).map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to write page content", e)
            })?;
        }

        doc.compress();
        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to save PDF", e))?;
        Ok(Bytes::from(out))
    }
}

/// Parse a PDF from memory.
pub(crate) fn load(doc: &Bytes) -> AppResult<Document> {
    Document::load_mem(doc).map_err(|e| {
        AppError::with_source(ErrorKind::Validation, "Failed to parse PDF document", e)
    })
}

/// Object ID of the page at a 0-based index.
pub(crate) fn page_at(doc: &Document, index: u32) -> AppResult<ObjectId> {
    doc.get_pages()
        .values()
        .nth(index as usize)
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("Page {index} out of range")))
}

/// MediaBox dimensions (points) of a page, walking up the page tree for
/// inherited values.
pub(crate) fn media_box(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let Ok(dict) = doc.get_dictionary(id) else {
            break;
        };
        if let Ok(obj) = dict.get(b"MediaBox") {
            if let Some(rect) = rect_size(doc, obj) {
                return rect;
            }
        }
        current = dict
            .get(b"Parent")
            .ok()
            .and_then(|p| p.as_reference().ok());
    }
    DEFAULT_PAGE_SIZE
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    if let Object::Reference(id) = obj {
        doc.get_object(*id).unwrap_or(obj)
    } else {
        obj
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn rect_size(doc: &Document, obj: &Object) -> Option<(f32, f32)> {
    let array = resolve(doc, obj).as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let values: Vec<f32> = array
        .iter()
        .map(|v| number(resolve(doc, v)))
        .collect::<Option<_>>()?;
    Some(((values[2] - values[0]).abs(), (values[3] - values[1]).abs()))
}

/// Embed a PNG overlay as an image XObject with an SMask alpha channel.
fn embed_overlay(doc: &mut Document, png: &Bytes) -> AppResult<ObjectId> {
    let img = image::load_from_memory(png)
        .map_err(|e| {
            AppError::with_source(ErrorKind::Rasterization, "Failed to decode overlay raster", e)
        })?
        .to_rgba8();
    let (width, height) = img.dimensions();

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in img.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let mut smask_dict = Dictionary::new();
    smask_dict.set("Type", Object::Name(b"XObject".to_vec()));
    smask_dict.set("Subtype", Object::Name(b"Image".to_vec()));
    smask_dict.set("Width", Object::Integer(width as i64));
    smask_dict.set("Height", Object::Integer(height as i64));
    smask_dict.set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
    smask_dict.set("BitsPerComponent", Object::Integer(8));
    let smask_id = doc.add_object(Stream::new(smask_dict, alpha));

    let mut image_dict = Dictionary::new();
    image_dict.set("Type", Object::Name(b"XObject".to_vec()));
    image_dict.set("Subtype", Object::Name(b"Image".to_vec()));
    image_dict.set("Width", Object::Integer(width as i64));
    image_dict.set("Height", Object::Integer(height as i64));
    image_dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    image_dict.set("BitsPerComponent", Object::Integer(8));
    image_dict.set("SMask", Object::Reference(smask_id));
    Ok(doc.add_object(Stream::new(image_dict, rgb)))
}

/// Ensure the page has a direct Resources dictionary with a direct
/// XObject sub-dictionary, then register the overlay names in it.
///
/// An inherited Resources dictionary is cloned onto the page first so
/// sibling pages are unaffected.
fn register_xobjects(
    doc: &mut Document,
    page_id: ObjectId,
    entries: &[(String, ObjectId)],
) -> AppResult<()> {
    let mut resources: Dictionary = {
        let mut found = None;
        let mut current = Some(page_id);
        while let Some(id) = current {
            let Ok(dict) = doc.get_dictionary(id) else {
                break;
            };
            if let Ok(obj) = dict.get(b"Resources") {
                if let Object::Dictionary(d) = resolve(doc, obj) {
                    found = Some(d.clone());
                }
                break;
            }
            current = dict
                .get(b"Parent")
                .ok()
                .and_then(|p| p.as_reference().ok());
        }
        found.unwrap_or_default()
    };

    let mut xobjects: Dictionary = match resources.get(b"XObject") {
        Ok(obj) => match resolve(doc, obj) {
            Object::Dictionary(d) => d.clone(),
            _ => Dictionary::new(),
        },
        Err(_) => Dictionary::new(),
    };
    for (name, id) in entries {
        xobjects.set(name.as_str(), Object::Reference(*id));
    }
    resources.set("XObject", Object::Dictionary(xobjects));

    let page_dict = doc.get_dictionary_mut(page_id).map_err(|e| {
        AppError::with_source(ErrorKind::Internal, "Failed to access page dictionary", e)
    })?;
    page_dict.set("Resources", Object::Dictionary(resources));
    Ok(())
}
