//! Request DTOs with validation.
//!
//! Mutating requests carry an optional `user` field naming the acting
//! user; absent or empty values fall back to `"anonymous"`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Full-replace save of an annotation layer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PutLayerRequest {
    /// Page index to opaque scene JSON.
    pub pages: BTreeMap<u32, serde_json::Value>,
    /// The revision the client read (0 for a never-saved layer).
    #[validate(range(min = 0, message = "revision must be non-negative"))]
    pub revision: i64,
}

/// Replace one page's scene via read-merge-write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePageRequest {
    /// 0-based page index.
    pub page: u32,
    /// The page's new scene.
    pub scene: serde_json::Value,
}

/// Revert to an earlier version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevertRequest {
    /// The target version number.
    pub version: i32,
    /// Acting user.
    #[serde(default)]
    pub user: Option<String>,
}

/// Reset a file to its original content.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResetRequest {
    /// Acting user.
    #[serde(default)]
    pub user: Option<String>,
}

/// Export selected users' layers flattened onto the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    /// The users whose layers are burned in.
    pub users: Vec<String>,
    /// Acting user.
    #[serde(default)]
    pub user: Option<String>,
}

/// Rotate one PDF page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotatePageRequest {
    /// 0-based page index.
    pub page: u32,
    /// Clockwise angle: 90, 180, or 270.
    #[serde(default = "default_angle")]
    pub angle: i32,
    /// Acting user.
    #[serde(default)]
    pub user: Option<String>,
}

fn default_angle() -> i32 {
    90
}

/// Delete one PDF page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePageRequest {
    /// 0-based page index.
    pub page: u32,
    /// Acting user.
    #[serde(default)]
    pub user: Option<String>,
}

/// Crop an image document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropRequest {
    /// Left edge (pixels).
    pub left: u32,
    /// Top edge.
    pub top: u32,
    /// Right edge (exclusive).
    pub right: u32,
    /// Bottom edge (exclusive).
    pub bottom: u32,
    /// Acting user.
    #[serde(default)]
    pub user: Option<String>,
}

/// Resize an image document.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResizeRequest {
    /// Target width in pixels.
    #[validate(range(min = 1, message = "width must be positive"))]
    pub width: u32,
    /// Target height in pixels.
    #[validate(range(min = 1, message = "height must be positive"))]
    pub height: u32,
    /// Acting user.
    #[serde(default)]
    pub user: Option<String>,
}

/// Rotate an image document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateImageRequest {
    /// Clockwise angle: 90, 180, or 270.
    #[serde(default = "default_angle")]
    pub angle: i32,
    /// Acting user.
    #[serde(default)]
    pub user: Option<String>,
}
