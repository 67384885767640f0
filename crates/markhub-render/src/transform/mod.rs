//! Structural document transforms.
//!
//! Each transform takes the current version's bytes and returns the
//! bytes of the next version; persisting the result as a new version is
//! the caller's job.

pub mod image;
pub mod pdf;
