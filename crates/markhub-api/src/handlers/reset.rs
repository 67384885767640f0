//! Reset handler.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use crate::dto::request::ResetRequest;
use crate::error::ApiResult;
use crate::handlers::context_for;
use crate::state::AppState;

/// POST /api/files/{id}/reset — discard all annotation layers and
/// restore the original content as a new head version.
pub async fn reset_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ResetRequest>>,
) -> ApiResult<Json<serde_json::Value>> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let ctx = context_for(payload.user);
    let version = state.reset_service.reset(&ctx, id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": version })))
}
