//! Application builder — wires backends, services, router, and
//! middleware into an Axum app.

use std::sync::Arc;

use axum::Router;

use markhub_core::config::AppConfig;
use markhub_core::result::AppResult;
use markhub_database::Repositories;
use markhub_render::RenderEngine;
use markhub_service::annotation::AnnotationService;
use markhub_service::audit::AuditService;
use markhub_service::edit::EditService;
use markhub_service::export::{ExportPipeline, ExportService};
use markhub_service::file::FileService;
use markhub_service::reset::ResetService;
use markhub_service::version::VersionService;
use markhub_storage::StorageManager;

use crate::router::build_router;
use crate::state::AppState;

/// Construct the full application state from configuration.
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    // ── Backends ─────────────────────────────────────────────
    let repos = Repositories::connect(&config.database).await?;
    let storage = Arc::new(StorageManager::new(&config.storage).await?);
    let engine = RenderEngine::new(&config.export);

    // ── Services ─────────────────────────────────────────────
    let audit_service = Arc::new(AuditService::new(Arc::clone(&repos.audit)));
    let version_service = Arc::new(VersionService::new(
        Arc::clone(&repos.files),
        Arc::clone(&repos.versions),
        Arc::clone(&storage),
        Arc::clone(&audit_service),
    ));
    let file_service = Arc::new(FileService::new(
        Arc::clone(&repos.files),
        Arc::clone(&repos.versions),
        Arc::clone(&repos.annotations),
        Arc::clone(&storage),
        Arc::clone(&audit_service),
        config.storage.clone(),
    ));
    let annotation_service = Arc::new(AnnotationService::new(
        Arc::clone(&repos.files),
        Arc::clone(&repos.annotations),
        Arc::clone(&audit_service),
    ));
    let export_service = Arc::new(ExportService::new(
        Arc::clone(&repos.files),
        Arc::clone(&repos.versions),
        Arc::clone(&repos.annotations),
        Arc::clone(&storage),
        Arc::clone(&audit_service),
        ExportPipeline::new(engine),
    ));
    let reset_service = Arc::new(ResetService::new(
        Arc::clone(&repos.files),
        Arc::clone(&repos.versions),
        Arc::clone(&repos.annotations),
        Arc::clone(&storage),
        Arc::clone(&version_service),
    ));
    let edit_service = Arc::new(EditService::new(
        Arc::clone(&repos.files),
        Arc::clone(&version_service),
    ));

    Ok(AppState {
        config: Arc::new(config),
        repos,
        storage,
        file_service,
        version_service,
        annotation_service,
        audit_service,
        export_service,
        reset_service,
        edit_service,
    })
}

/// Build the complete Axum application from configuration.
pub async fn build_app(config: AppConfig) -> AppResult<Router> {
    let state = build_state(config).await?;
    Ok(build_router(state))
}
