//! # markhub-entity
//!
//! Domain entity models for MarkHub. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`; row-shaped
//! entities additionally derive `sqlx::FromRow`.

pub mod annotation;
pub mod audit;
pub mod document;
pub mod scene;

pub use annotation::AnnotationLayer;
pub use audit::{AuditEntry, CreateAuditEntry};
pub use document::{CreateDocument, DocumentFile, DocumentVersion};
pub use scene::{Paint, SceneObject, VectorScene};
