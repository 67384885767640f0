//! Structural edit handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;
use validator::Validate;

use markhub_core::error::AppError;

use crate::dto::request::{
    CropRequest, DeletePageRequest, ResizeRequest, RotateImageRequest, RotatePageRequest,
};
use crate::error::ApiResult;
use crate::handlers::context_for;
use crate::state::AppState;

/// POST /api/files/{id}/pdf/rotate-page
pub async fn rotate_pdf_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RotatePageRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let ctx = context_for(payload.user);
    let version = state
        .edit_service
        .rotate_pdf_page(&ctx, id, payload.page, payload.angle)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": version })))
}

/// POST /api/files/{id}/pdf/delete-page
pub async fn delete_pdf_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeletePageRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let ctx = context_for(payload.user);
    let version = state
        .edit_service
        .delete_pdf_page(&ctx, id, payload.page)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": version })))
}

/// POST /api/files/{id}/image/crop
pub async fn crop_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CropRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let ctx = context_for(payload.user);
    let version = state
        .edit_service
        .crop_image(
            &ctx,
            id,
            payload.left,
            payload.top,
            payload.right,
            payload.bottom,
        )
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": version })))
}

/// POST /api/files/{id}/image/resize
pub async fn resize_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResizeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let ctx = context_for(payload.user);
    let version = state
        .edit_service
        .resize_image(&ctx, id, payload.width, payload.height)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": version })))
}

/// POST /api/files/{id}/image/rotate
pub async fn rotate_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RotateImageRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let ctx = context_for(payload.user);
    let version = state
        .edit_service
        .rotate_image(&ctx, id, payload.angle)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": version })))
}
