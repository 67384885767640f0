//! Typed vector scene model.
//!
//! Annotation scenes are stored and transported as opaque JSON; this
//! module defines the shape that JSON takes when something actually has
//! to interpret it (the rasterizer, the read-only merge helper).
//!
//! A scene is a flat list of drawable objects. Each object is a tagged
//! variant carrying shared paint attributes plus kind-specific geometry;
//! the rasterizer dispatches on `kind`.

use serde::{Deserialize, Serialize};

use markhub_core::error::AppError;
use markhub_core::result::AppResult;

/// Shared paint attributes for a drawable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    /// Stroke color (`"#rrggbb"`, `"#rrggbbaa"`, or `rgb()/rgba()`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Stroke width in pixels.
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f32,
    /// Fill color; `None` leaves the interior unpainted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Object opacity in [0, 1], applied on top of color alpha.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            stroke: Some("#000000".to_string()),
            stroke_width: default_stroke_width(),
            fill: None,
            opacity: default_opacity(),
        }
    }
}

fn default_stroke_width() -> f32 {
    2.0
}

fn default_opacity() -> f32 {
    1.0
}

/// A freehand polyline stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeObject {
    /// Polyline vertices as `[x, y]` pairs.
    pub points: Vec<[f32; 2]>,
    /// Paint attributes.
    #[serde(default)]
    pub paint: Paint,
    /// Whether the object is read-only in the editor.
    #[serde(default)]
    pub locked: bool,
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectObject {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Paint attributes.
    #[serde(default)]
    pub paint: Paint,
    /// Whether the object is read-only in the editor.
    #[serde(default)]
    pub locked: bool,
}

/// An axis-aligned ellipse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipseObject {
    /// Center x.
    pub cx: f32,
    /// Center y.
    pub cy: f32,
    /// Horizontal radius.
    pub rx: f32,
    /// Vertical radius.
    pub ry: f32,
    /// Paint attributes.
    #[serde(default)]
    pub paint: Paint,
    /// Whether the object is read-only in the editor.
    #[serde(default)]
    pub locked: bool,
}

/// A positioned text item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    /// Baseline-left x.
    pub x: f32,
    /// Top y of the first line.
    pub y: f32,
    /// The text content.
    pub text: String,
    /// Font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Paint attributes; text is filled with `paint.stroke`.
    #[serde(default)]
    pub paint: Paint,
    /// Whether the object is read-only in the editor.
    #[serde(default)]
    pub locked: bool,
}

fn default_font_size() -> f32 {
    16.0
}

/// A drawable scene object, dispatched on `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SceneObject {
    /// Freehand stroke.
    Stroke(StrokeObject),
    /// Rectangle.
    Rect(RectObject),
    /// Ellipse.
    Ellipse(EllipseObject),
    /// Text item.
    Text(TextObject),
}

impl SceneObject {
    /// Whether the object is read-only in the editor.
    pub fn is_locked(&self) -> bool {
        match self {
            Self::Stroke(o) => o.locked,
            Self::Rect(o) => o.locked,
            Self::Ellipse(o) => o.locked,
            Self::Text(o) => o.locked,
        }
    }

    /// Set the read-only flag.
    pub fn set_locked(&mut self, locked: bool) {
        match self {
            Self::Stroke(o) => o.locked = locked,
            Self::Rect(o) => o.locked = locked,
            Self::Ellipse(o) => o.locked = locked,
            Self::Text(o) => o.locked = locked,
        }
    }
}

/// A serializable collection of drawable objects for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorScene {
    /// Drawable objects in paint order (first is painted first).
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

impl VectorScene {
    /// Parse a scene from its opaque JSON form.
    pub fn from_value(value: &serde_json::Value) -> AppResult<Self> {
        serde_json::from_value(value.clone()).map_err(AppError::from)
    }

    /// Serialize the scene into its opaque JSON form.
    pub fn to_value(&self) -> AppResult<serde_json::Value> {
        serde_json::to_value(self).map_err(AppError::from)
    }

    /// Whether the scene contains no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Append another scene's objects beneath this one's, marked locked.
    ///
    /// Used to overlay other users' objects read-only under the active
    /// user's editable ones: the merged objects paint first, and their
    /// interactivity flag is forced off.
    pub fn merge_locked(&mut self, other: &VectorScene) {
        let mut merged: Vec<SceneObject> = other
            .objects
            .iter()
            .cloned()
            .map(|mut obj| {
                obj.set_locked(true);
                obj
            })
            .collect();
        merged.append(&mut self.objects);
        self.objects = merged;
    }
}
