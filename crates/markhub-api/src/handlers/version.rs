//! Version history handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use bytes::Bytes;
use uuid::Uuid;

use markhub_core::error::AppError;
use markhub_core::types::VersionSelector;

use crate::dto::request::RevertRequest;
use crate::error::ApiResult;
use crate::handlers::context_for;
use crate::handlers::file::stream_response;
use crate::state::AppState;

/// GET /api/files/{id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let versions = state.version_service.list_versions(id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": versions }),
    ))
}

/// POST /api/files/{id}/versions — multipart with `file`, `action`,
/// and optional `user` fields; appends the content as a new version.
pub async fn create_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let mut user: Option<String> = None;
    let mut action: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(String::from);
        match name.as_deref() {
            Some("user") => {
                user = Some(field.text().await.map_err(|e| {
                    AppError::validation(format!("Invalid user field: {e}"))
                })?);
            }
            Some("action") => {
                action = Some(field.text().await.map_err(|e| {
                    AppError::validation(format!("Invalid action field: {e}"))
                })?);
            }
            Some("file") => {
                data = Some(field.bytes().await.map_err(|e| {
                    AppError::validation(format!("Failed to read upload: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::validation("No content provided"))?;
    if data.is_empty() {
        return Err(AppError::validation("Version content is empty").into());
    }
    let action = action.unwrap_or_else(|| "edit".to_string());

    let ctx = context_for(user);
    let version = state
        .version_service
        .create_version(&ctx, id, &action, data)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": version })),
    ))
}

/// GET /api/files/{id}/versions/{ver}
pub async fn download_version(
    State(state): State<AppState>,
    Path((id, ver)): Path<(Uuid, i32)>,
) -> ApiResult<Response> {
    let result = state
        .version_service
        .download_stream(id, VersionSelector::Number(ver))
        .await?;
    stream_response(result)
}

/// POST /api/files/{id}/revert
pub async fn revert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RevertRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let ctx = context_for(payload.user);
    let version = state
        .version_service
        .revert(&ctx, id, payload.version)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": version })))
}
