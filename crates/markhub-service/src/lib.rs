//! # markhub-service
//!
//! Business logic service layer for MarkHub. Each service orchestrates
//! repositories, blob storage, and rendering collaborators to implement
//! application-level use cases.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod annotation;
pub mod audit;
pub mod context;
pub mod edit;
pub mod export;
pub mod file;
pub mod paths;
pub mod reset;
#[cfg(test)]
pub(crate) mod testutil;
pub mod version;

pub use annotation::AnnotationService;
pub use audit::AuditService;
pub use context::RequestContext;
pub use edit::EditService;
pub use export::{ExportArtifact, ExportPipeline, ExportService, UserSelection};
pub use file::FileService;
pub use reset::ResetService;
pub use version::{DownloadResult, DownloadStream, VersionService};
