//! Page compositors, one per document kind.

pub mod image;
pub mod pdf;

pub use image::ImageCompositor;
pub use pdf::PdfCompositor;
