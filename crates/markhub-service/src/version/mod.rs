//! Version history services.

pub mod service;

pub use service::{DownloadResult, DownloadStream, VersionService};
