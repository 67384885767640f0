//! # markhub-api
//!
//! HTTP API layer for MarkHub built on Axum.
//!
//! Provides the REST endpoints over the file, version, annotation,
//! audit, export, reset, and edit services, plus middleware (request
//! logging, CORS, compression), DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use state::AppState;
