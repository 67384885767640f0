//! Annotation layer services.

pub mod service;

pub use service::AnnotationService;
