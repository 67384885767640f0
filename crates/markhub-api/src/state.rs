//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use markhub_core::config::AppConfig;
use markhub_database::Repositories;
use markhub_service::annotation::AnnotationService;
use markhub_service::audit::AuditService;
use markhub_service::edit::EditService;
use markhub_service::export::ExportService;
use markhub_service::file::FileService;
use markhub_service::reset::ResetService;
use markhub_service::version::VersionService;
use markhub_storage::StorageManager;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration.
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Repository bundle (postgres or memory backend).
    pub repos: Repositories,
    /// Blob store manager.
    pub storage: Arc<StorageManager>,

    // ── Services ─────────────────────────────────────────────
    /// File lifecycle service.
    pub file_service: Arc<FileService>,
    /// Version history service.
    pub version_service: Arc<VersionService>,
    /// Annotation layer service.
    pub annotation_service: Arc<AnnotationService>,
    /// Audit trail service.
    pub audit_service: Arc<AuditService>,
    /// Export service.
    pub export_service: Arc<ExportService>,
    /// Reset service.
    pub reset_service: Arc<ResetService>,
    /// Structural edit service.
    pub edit_service: Arc<EditService>,
}
