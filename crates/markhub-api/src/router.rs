//! Route definitions for the MarkHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = state.config.storage.max_upload_size_bytes as usize;

    let api_routes = Router::new()
        .merge(file_routes())
        .merge(version_routes())
        .merge(annotation_routes())
        .merge(edit_routes())
        .merge(export_routes())
        .merge(audit_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// File upload, browse, download, delete.
fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/files", get(handlers::file::list_files))
        .route("/files/upload", post(handlers::file::upload_file))
        .route("/files/{id}", get(handlers::file::get_file))
        .route("/files/{id}", delete(handlers::file::delete_file))
        .route("/files/{id}/download", get(handlers::file::download_file))
}

/// Version history, revert, reset.
fn version_routes() -> Router<AppState> {
    Router::new()
        .route("/files/{id}/versions", get(handlers::version::list_versions))
        .route(
            "/files/{id}/versions",
            post(handlers::version::create_version),
        )
        .route(
            "/files/{id}/versions/{ver}",
            get(handlers::version::download_version),
        )
        .route("/files/{id}/revert", post(handlers::version::revert))
        .route("/files/{id}/reset", post(handlers::reset::reset_file))
}

/// Per-user annotation layers.
fn annotation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files/{id}/annotations",
            get(handlers::annotation::list_layers),
        )
        .route(
            "/files/{id}/annotations/combined",
            get(handlers::annotation::combined_scene),
        )
        .route(
            "/files/{id}/annotations/{user}",
            get(handlers::annotation::get_layer),
        )
        .route(
            "/files/{id}/annotations/{user}",
            put(handlers::annotation::put_layer),
        )
        .route(
            "/files/{id}/annotations/{user}",
            delete(handlers::annotation::delete_layer),
        )
        .route(
            "/files/{id}/annotations/{user}/pages",
            post(handlers::annotation::save_page),
        )
}

/// Structural edits (each creates a new version).
fn edit_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files/{id}/pdf/rotate-page",
            post(handlers::edit::rotate_pdf_page),
        )
        .route(
            "/files/{id}/pdf/delete-page",
            post(handlers::edit::delete_pdf_page),
        )
        .route("/files/{id}/image/crop", post(handlers::edit::crop_image))
        .route(
            "/files/{id}/image/resize",
            post(handlers::edit::resize_image),
        )
        .route(
            "/files/{id}/image/rotate",
            post(handlers::edit::rotate_image),
        )
}

/// Flattened export.
fn export_routes() -> Router<AppState> {
    Router::new().route("/files/{id}/export", post(handlers::export::export_file))
}

/// Audit trail.
fn audit_routes() -> Router<AppState> {
    Router::new().route("/files/{id}/audit", get(handlers::audit::query_audit))
}

/// Health check.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
