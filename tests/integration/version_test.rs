//! Integration tests for version history, revert, reset, and
//! structural edits.

use http::StatusCode;

use crate::helpers::{TestApp, rect_scene};

#[tokio::test]
async fn test_revert_scenario() {
    let app = TestApp::new().await;
    let id = app.upload_pdf("doc.pdf", "alice", 3).await;
    let original = app
        .request(
            "GET",
            &format!("/api/files/{id}/download?version=original"),
            None,
        )
        .await
        .bytes;

    // Two structural edits: versions 2 and 3.
    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/pdf/rotate-page"),
            Some(serde_json::json!({"page": 0, "angle": 90, "user": "alice"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["version_number"], 2);

    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/pdf/delete-page"),
            Some(serde_json::json!({"page": 2, "user": "alice"})),
        )
        .await;
    assert_eq!(response.body["data"]["version_number"], 3);

    // Revert to the original: a NEW version 4, history intact.
    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/revert"),
            Some(serde_json::json!({"version": 1, "user": "alice"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["version_number"], 4);
    assert_eq!(response.body["data"]["action"], "revert-to-v1");

    let response = app.request("GET", &format!("/api/files/{id}"), None).await;
    assert_eq!(response.body["data"]["file"]["current_version"], 4);
    assert_eq!(
        response.body["data"]["versions"].as_array().unwrap().len(),
        4
    );

    let current = app
        .request(
            "GET",
            &format!("/api/files/{id}/download?version=current"),
            None,
        )
        .await
        .bytes;
    assert_eq!(current, original);

    // Version 3 is still reachable by direct download.
    let response = app
        .request("GET", &format!("/api/files/{id}/versions/3"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_revert_to_missing_version() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/revert"),
            Some(serde_json::json!({"version": 9, "user": "alice"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "INVALID_VERSION");
}

#[tokio::test]
async fn test_create_version_via_upload() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    let response = app
        .multipart(
            &format!("/api/files/{id}/versions"),
            "alice",
            Some("merge"),
            "photo.png",
            "image/png",
            &crate::helpers::png_fixture(),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["data"]["version_number"], 2);
    assert_eq!(response.body["data"]["action"], "merge");
}

#[tokio::test]
async fn test_image_edit_chain() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/image/crop"),
            Some(serde_json::json!({
                "left": 2, "top": 2, "right": 10, "bottom": 10, "user": "alice"
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);

    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/image/resize"),
            Some(serde_json::json!({"width": 20, "height": 30, "user": "alice"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let current = app
        .request(
            "GET",
            &format!("/api/files/{id}/download?version=current"),
            None,
        )
        .await
        .bytes;
    let img = image::load_from_memory(&current).unwrap();
    assert_eq!((img.width(), img.height()), (20, 30));

    // Invalid resize is rejected without touching history.
    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/image/resize"),
            Some(serde_json::json!({"width": 0, "height": 30, "user": "alice"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.request("GET", &format!("/api/files/{id}"), None).await;
    assert_eq!(response.body["data"]["file"]["current_version"], 3);
}

#[tokio::test]
async fn test_reset_scenario() {
    let app = TestApp::new().await;
    let id = app.upload_pdf("doc.pdf", "carol", 2).await;
    let original = app
        .request(
            "GET",
            &format!("/api/files/{id}/download?version=original"),
            None,
        )
        .await
        .bytes;

    // Build up three versions and two annotation layers.
    app.request(
        "POST",
        &format!("/api/files/{id}/pdf/rotate-page"),
        Some(serde_json::json!({"page": 0, "angle": 90, "user": "carol"})),
    )
    .await;
    app.request(
        "POST",
        &format!("/api/files/{id}/pdf/rotate-page"),
        Some(serde_json::json!({"page": 0, "angle": 90, "user": "carol"})),
    )
    .await;
    for user in ["alice", "bob"] {
        let response = app
            .request(
                "POST",
                &format!("/api/files/{id}/annotations/{user}/pages"),
                Some(serde_json::json!({
                    "page": 0,
                    "scene": rect_scene(1.0, 1.0, 4.0, 4.0, "#ff0000")
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/reset"),
            Some(serde_json::json!({"user": "carol"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["version_number"], 4);
    assert_eq!(response.body["data"]["action"], "reset");

    // Every user's layer is gone.
    let response = app
        .request("GET", &format!("/api/files/{id}/annotations"), None)
        .await;
    assert_eq!(response.body["data"].as_array().unwrap().len(), 0);

    // The new head equals the original content.
    let current = app
        .request(
            "GET",
            &format!("/api/files/{id}/download?version=current"),
            None,
        )
        .await
        .bytes;
    assert_eq!(current, original);

    // Exactly one "reset" audit entry, attributed to carol.
    let response = app
        .request("GET", &format!("/api/files/{id}/audit?limit=50"), None)
        .await;
    let resets: Vec<_> = response.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["action"] == "reset")
        .collect();
    assert_eq!(resets.len(), 1);
    assert_eq!(resets[0]["user"], "carol");
}
