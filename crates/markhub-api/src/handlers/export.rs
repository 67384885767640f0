//! Export handler.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::Response;
use uuid::Uuid;

use crate::dto::request::ExportRequest;
use crate::error::ApiResult;
use crate::handlers::context_for;
use crate::handlers::file::attachment_response;
use crate::state::AppState;

/// POST /api/files/{id}/export — flatten the selected users' layers
/// onto the current content and return the artifact.
pub async fn export_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExportRequest>,
) -> ApiResult<Response> {
    let ctx = context_for(payload.user);
    let artifact = state
        .export_service
        .export(&ctx, id, &payload.users)
        .await?;
    attachment_response(artifact.data, &artifact.content_type, &artifact.filename)
}
