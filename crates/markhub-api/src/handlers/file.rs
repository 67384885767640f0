//! File upload, browse, download, delete handlers.

use std::collections::HashMap;

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use uuid::Uuid;

use markhub_core::error::AppError;
use markhub_core::types::VersionSelector;

use crate::error::ApiResult;
use crate::handlers::context_for;
use crate::state::AppState;

/// GET /api/files
pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let files = state.file_service.list_files().await?;
    Ok(Json(serde_json::json!({ "success": true, "data": files })))
}

/// POST /api/files/upload — multipart upload with `file` and optional
/// `user` fields.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let mut user: Option<String> = None;
    let mut filename: Option<String> = None;
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
            Some("file") => {
                filename = field.file_name().map(String::from);
                data = Some(field.bytes().await.map_err(|e| {
                    AppError::validation(format!("Failed to read upload: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let filename = filename.ok_or_else(|| AppError::validation("No file provided"))?;
    let data = data.ok_or_else(|| AppError::validation("No file provided"))?;

    let ctx = context_for(user);
    let file = state.file_service.upload(&ctx, &filename, data).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": file })),
    ))
}

/// GET /api/files/{id} — file record plus its version history.
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let file = state.file_service.get_file(id).await?;
    let versions = state.version_service.list_versions(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": { "file": file, "versions": versions }
    })))
}

/// DELETE /api/files/{id}?user=...
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<serde_json::Value>> {
    let ctx = context_for(params.get("user").cloned());
    state.file_service.delete_file(&ctx, id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/files/{id}/download?version=original|current|N
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    let selector = params
        .get("version")
        .map(|s| s.parse::<VersionSelector>())
        .transpose()?
        .unwrap_or(VersionSelector::Current);

    let result = state.version_service.download_stream(id, selector).await?;
    stream_response(result)
}

/// Build an attachment response streaming from the blob store.
pub(crate) fn stream_response(
    result: markhub_service::DownloadStream,
) -> ApiResult<Response> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", result.filename),
        )
        .body(Body::from_stream(result.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;
    Ok(response)
}

/// Build an attachment response from bytes.
pub(crate) fn attachment_response(
    data: Bytes,
    content_type: &str,
    filename: &str,
) -> ApiResult<Response> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;
    Ok(response)
}
