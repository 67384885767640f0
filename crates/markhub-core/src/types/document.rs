//! Document kind and version selector types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The structural kind of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Multi-page PDF document.
    Pdf,
    /// Single-page raster image.
    Image,
}

impl DocumentKind {
    /// Return the kind as a string for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }

    /// Classify a lowercase file extension.
    pub fn from_extension(ext: &str) -> Self {
        if ext == "pdf" { Self::Pdf } else { Self::Image }
    }

    /// MIME type for a document of this kind with the given extension.
    pub fn content_type(&self, ext: &str) -> String {
        match self {
            Self::Pdf => "application/pdf".to_string(),
            Self::Image => match ext {
                "jpg" | "jpeg" => "image/jpeg".to_string(),
                "png" => "image/png".to_string(),
                "gif" => "image/gif".to_string(),
                "bmp" => "image/bmp".to_string(),
                "tiff" => "image/tiff".to_string(),
                "webp" => "image/webp".to_string(),
                other => format!("image/{other}"),
            },
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(Self::Pdf),
            "image" => Ok(Self::Image),
            other => Err(AppError::validation(format!(
                "Unknown document kind: '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for DocumentKind {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Selects which version of a file a download refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    /// Version 1, the original upload.
    Original,
    /// The highest existing version.
    Current,
    /// An explicit version number.
    Number(i32),
}

impl FromStr for VersionSelector {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "original" => Ok(Self::Original),
            "current" => Ok(Self::Current),
            other => other
                .parse::<i32>()
                .map(Self::Number)
                .map_err(|_| AppError::validation(format!("Invalid version selector: '{other}'"))),
        }
    }
}
