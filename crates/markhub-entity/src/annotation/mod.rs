//! Annotation layer entities.

pub mod layer;

pub use layer::AnnotationLayer;
