//! # markhub-render
//!
//! Rendering collaborators for MarkHub: the vector scene rasterizer,
//! the per-kind page compositors used by the export pipeline, and the
//! structural document transforms (page rotation/deletion, image
//! crop/resize/rotate).
//!
//! Scenes arrive as opaque JSON and are parsed into the typed model
//! from `markhub-entity` here, at the last moment before painting.

pub mod color;
pub mod compose;
pub mod engine;
pub mod rasterizer;
#[cfg(test)]
pub(crate) mod testdoc;
pub mod text;
pub mod transform;

pub use engine::RenderEngine;
pub use rasterizer::ScenePainter;
