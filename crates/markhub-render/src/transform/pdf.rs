//! PDF structural transforms: page rotation and deletion.

use bytes::Bytes;

use markhub_core::error::{AppError, ErrorKind};
use markhub_core::result::AppResult;

use lopdf::Object;

use crate::compose::pdf::{load, page_at};

/// Rotate one page by `angle` degrees clockwise (90, 180, or 270).
pub fn rotate_page(doc_bytes: &Bytes, page_index: u32, angle: i32) -> AppResult<Bytes> {
    if !matches!(angle, 90 | 180 | 270) {
        return Err(AppError::validation(format!(
            "Rotation angle must be 90, 180 or 270, got {angle}"
        )));
    }

    let mut doc = load(doc_bytes)?;
    let page_id = page_at(&doc, page_index)
        .map_err(|_| AppError::validation(format!("Page {page_index} out of range")))?;

    let current = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|dict| dict.get(b"Rotate").ok())
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);
    let rotation = (current + angle as i64).rem_euclid(360);

    let page_dict = doc.get_dictionary_mut(page_id).map_err(|e| {
        AppError::with_source(ErrorKind::Internal, "Failed to access page dictionary", e)
    })?;
    page_dict.set("Rotate", Object::Integer(rotation));

    save(doc)
}

/// Delete one page. Refuses to delete the only page of a document.
pub fn delete_page(doc_bytes: &Bytes, page_index: u32) -> AppResult<Bytes> {
    let mut doc = load(doc_bytes)?;
    let page_count = doc.get_pages().len() as u32;

    if page_count <= 1 {
        return Err(AppError::validation("Cannot delete the only page"));
    }
    if page_index >= page_count {
        return Err(AppError::validation(format!(
            "Page {page_index} out of range"
        )));
    }

    // lopdf numbers pages from 1.
    doc.delete_pages(&[page_index + 1]);
    save(doc)
}

fn save(mut doc: lopdf::Document) -> AppResult<Bytes> {
    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to save PDF", e))?;
    Ok(Bytes::from(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdoc::sample_pdf;

    #[test]
    fn test_rotate_page_sets_rotation() {
        let doc = sample_pdf(2, 612.0, 792.0);
        let rotated = rotate_page(&doc, 0, 90).unwrap();
        let parsed = lopdf::Document::load_mem(&rotated).unwrap();
        let page_id = *parsed.get_pages().values().next().unwrap();
        let rotation = parsed
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Rotate")
            .unwrap()
            .as_i64()
            .unwrap();
        assert_eq!(rotation, 90);

        // Rotating again accumulates and wraps.
        let rotated = rotate_page(&rotated, 0, 270).unwrap();
        let parsed = lopdf::Document::load_mem(&rotated).unwrap();
        let page_id = *parsed.get_pages().values().next().unwrap();
        let rotation = parsed
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Rotate")
            .unwrap()
            .as_i64()
            .unwrap();
        assert_eq!(rotation, 0);
    }

    #[test]
    fn test_rotate_rejects_odd_angles() {
        let doc = sample_pdf(1, 612.0, 792.0);
        assert!(rotate_page(&doc, 0, 45).is_err());
    }

    #[test]
    fn test_delete_page_shrinks_document() {
        let doc = sample_pdf(3, 612.0, 792.0);
        let smaller = delete_page(&doc, 1).unwrap();
        let parsed = lopdf::Document::load_mem(&smaller).unwrap();
        assert_eq!(parsed.get_pages().len(), 2);
    }

    #[test]
    fn test_delete_refuses_last_page() {
        let doc = sample_pdf(1, 612.0, 792.0);
        let err = delete_page(&doc, 0).unwrap_err();
        assert_eq!(err.kind, markhub_core::error::ErrorKind::Validation);
    }

    #[test]
    fn test_delete_out_of_range() {
        let doc = sample_pdf(2, 612.0, 792.0);
        assert!(delete_page(&doc, 5).is_err());
    }
}
