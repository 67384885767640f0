//! Export and rasterization configuration.

use serde::{Deserialize, Serialize};

/// Settings for the export pipeline's rasterization step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Pixels per PDF point when sizing overlay rasters (1.0 = 72 dpi).
    #[serde(default = "default_raster_scale")]
    pub raster_scale: f32,
    /// Font family used for text objects when the scene does not name one.
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            raster_scale: default_raster_scale(),
            font_family: default_font_family(),
        }
    }
}

fn default_raster_scale() -> f32 {
    2.0
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}
