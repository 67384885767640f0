//! Integration tests for file upload, browse, download, delete.

use http::StatusCode;

use crate::helpers::{TestApp, png_fixture};

#[tokio::test]
async fn test_upload_and_get_file() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    let response = app.request("GET", &format!("/api/files/{id}"), None).await;
    assert_eq!(response.status, StatusCode::OK);

    let file = &response.body["data"]["file"];
    assert_eq!(file["original_name"], "photo.png");
    assert_eq!(file["kind"], "image");
    assert_eq!(file["current_version"], 1);

    let versions = response.body["data"]["versions"].as_array().unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0]["action"], "upload");
    assert_eq!(versions[0]["created_by"], "alice");
}

#[tokio::test]
async fn test_upload_rejects_disallowed_extension() {
    let app = TestApp::new().await;
    let response = app
        .multipart(
            "/api/files/upload",
            "alice",
            None,
            "script.sh",
            "text/plain",
            b"#!/bin/sh\n",
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_list_files() {
    let app = TestApp::new().await;
    app.upload_png("one.png", "alice").await;
    app.upload_png("two.png", "bob").await;

    let response = app.request("GET", "/api/files", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_get_unknown_file_is_404() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "GET",
            "/api/files/00000000-0000-0000-0000-999999999999",
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_download_roundtrips_content() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    let response = app
        .request("GET", &format!("/api/files/{id}/download"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes.as_ref(), png_fixture().as_slice());
}

#[tokio::test]
async fn test_delete_file() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    let response = app
        .request("DELETE", &format!("/api/files/{id}?user=alice"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request("GET", &format!("/api/files/{id}"), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["storage"], "available");
}

#[tokio::test]
async fn test_audit_trail_is_recorded() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    let response = app
        .request("GET", &format!("/api/files/{id}/audit?limit=10"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let entries = response.body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "upload");
    assert_eq!(entries[0]["user"], "alice");
}
