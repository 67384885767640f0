//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Provider: `"local"` or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Root directory for the local provider.
    #[serde(default = "default_root")]
    pub root: String,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Allowed file extensions for upload (lowercase, no dot).
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_root() -> String {
    "data/blobs".to_string()
}

fn default_max_upload() -> u64 {
    50 * 1024 * 1024
}

fn default_allowed_extensions() -> Vec<String> {
    [
        "pdf", "png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl StorageConfig {
    /// Check whether a lowercase extension is allowed for upload.
    pub fn is_extension_allowed(&self, ext: &str) -> bool {
        self.allowed_extensions.iter().any(|e| e == ext)
    }
}
