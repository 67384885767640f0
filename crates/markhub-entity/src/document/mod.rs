//! Document domain entities.

pub mod model;
pub mod version;

pub use model::{CreateDocument, DocumentFile};
pub use version::DocumentVersion;
