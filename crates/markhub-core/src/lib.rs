//! # markhub-core
//!
//! Core crate for MarkHub. Contains configuration schemas, collaborator
//! traits (repositories, blob storage, rasterizer, page compositor),
//! shared types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other MarkHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
