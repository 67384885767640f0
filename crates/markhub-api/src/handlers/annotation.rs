//! Annotation layer handlers.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;
use validator::Validate;

use markhub_core::error::AppError;

use crate::dto::request::{PutLayerRequest, SavePageRequest};
use crate::error::ApiResult;
use crate::handlers::context_for;
use crate::state::AppState;

/// GET /api/files/{id}/annotations
pub async fn list_layers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let layers = state.annotation_service.list_layers(id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": layers })))
}

/// GET /api/files/{id}/annotations/{user}
pub async fn get_layer(
    State(state): State<AppState>,
    Path((id, user)): Path<(Uuid, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let layer = state.annotation_service.get_layer(id, &user).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": layer })))
}

/// PUT /api/files/{id}/annotations/{user} — full replace under the
/// compare-and-swap revision guard.
pub async fn put_layer(
    State(state): State<AppState>,
    Path((id, user)): Path<(Uuid, String)>,
    Json(payload): Json<PutLayerRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let ctx = context_for(Some(user.clone()));
    let layer = state
        .annotation_service
        .put_layer(&ctx, id, &user, payload.pages, payload.revision)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": layer })))
}

/// POST /api/files/{id}/annotations/{user}/pages — replace one page's
/// scene via read-merge-write.
pub async fn save_page(
    State(state): State<AppState>,
    Path((id, user)): Path<(Uuid, String)>,
    Json(payload): Json<SavePageRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let ctx = context_for(Some(user.clone()));
    let layer = state
        .annotation_service
        .save_page(&ctx, id, &user, payload.page, payload.scene)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": layer })))
}

/// DELETE /api/files/{id}/annotations/{user}
pub async fn delete_layer(
    State(state): State<AppState>,
    Path((id, user)): Path<(Uuid, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let ctx = context_for(Some(user.clone()));
    state.annotation_service.delete_layer(&ctx, id, &user).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/files/{id}/annotations/combined?page=N&user=U
///
/// One page's combined scene: other users' objects locked beneath the
/// active user's editable ones.
pub async fn combined_scene(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<serde_json::Value>> {
    let page = params
        .get("page")
        .ok_or_else(|| AppError::validation("page query parameter is required"))?
        .parse::<u32>()
        .map_err(|_| AppError::validation("Invalid page index"))?;
    let user = params
        .get("user")
        .cloned()
        .unwrap_or_else(|| "anonymous".to_string());

    let scene = state
        .annotation_service
        .combined_scene(id, page, &user)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": scene })))
}
