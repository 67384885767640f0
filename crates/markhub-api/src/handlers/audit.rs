//! Audit trail handler.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use markhub_service::audit::service::DEFAULT_QUERY_LIMIT;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/files/{id}/audit?limit=N
///
/// Returns the most recent entries oldest-first; clients reverse for
/// most-recent-first display.
pub async fn query_audit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<serde_json::Value>> {
    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<u32>().ok())
        .unwrap_or(DEFAULT_QUERY_LIMIT);

    let entries = state.audit_service.query(id, limit).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": entries })))
}
