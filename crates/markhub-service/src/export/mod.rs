//! Export pipeline and service.

pub mod pipeline;
pub mod service;

pub use pipeline::{ExportPipeline, UserSelection};
pub use service::{ExportArtifact, ExportService};
