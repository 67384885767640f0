//! Shared types used across MarkHub crates.

pub mod document;

pub use document::{DocumentKind, VersionSelector};
