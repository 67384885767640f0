//! Integration tests for the export pipeline.

use http::StatusCode;

use crate::helpers::{TestApp, rect_scene};

#[tokio::test]
async fn test_empty_selection_is_rejected() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/export"),
            Some(serde_json::json!({"users": [], "user": "alice"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "EMPTY_SELECTION");
}

#[tokio::test]
async fn test_image_export_burns_in_layers() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    app.request(
        "POST",
        &format!("/api/files/{id}/annotations/alice/pages"),
        Some(serde_json::json!({
            "page": 0,
            "scene": rect_scene(2.0, 2.0, 4.0, 4.0, "#ff0000")
        })),
    )
    .await;

    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/export"),
            Some(serde_json::json!({"users": ["alice"], "user": "alice"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let img = image::load_from_memory(&response.bytes).unwrap().to_rgba8();
    assert_eq!(*img.get_pixel(4, 4), image::Rgba([255, 0, 0, 255]));
    assert_eq!(*img.get_pixel(12, 12), image::Rgba([255, 255, 255, 255]));
}

#[tokio::test]
async fn test_multi_user_pdf_export() {
    let app = TestApp::new().await;
    let id = app.upload_pdf("doc.pdf", "alice", 2).await;

    // alice annotates page 0; bob annotates pages 0 and 1.
    app.request(
        "POST",
        &format!("/api/files/{id}/annotations/alice/pages"),
        Some(serde_json::json!({
            "page": 0,
            "scene": rect_scene(10.0, 10.0, 50.0, 50.0, "#ff0000")
        })),
    )
    .await;
    for page in [0, 1] {
        app.request(
            "POST",
            &format!("/api/files/{id}/annotations/bob/pages"),
            Some(serde_json::json!({
                "page": page,
                "scene": rect_scene(20.0, 20.0, 50.0, 50.0, "#0000ff")
            })),
        )
        .await;
    }

    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/export"),
            Some(serde_json::json!({"users": ["alice", "bob"], "user": "alice"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let doc = lopdf::Document::load_mem(&response.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 2);

    // Page 0 carries two overlays (alice's, then bob's), page 1 one.
    let pages: Vec<_> = doc.get_pages().values().cloned().collect();
    let first = String::from_utf8_lossy(&doc.get_page_content(pages[0]).unwrap()).to_string();
    let second = String::from_utf8_lossy(&doc.get_page_content(pages[1]).unwrap()).to_string();
    assert_eq!(first.matches(" Do").count(), 2, "page 0: {first}");
    assert_eq!(second.matches(" Do").count(), 1, "page 1: {second}");
}

#[tokio::test]
async fn test_user_with_no_layer_is_harmless() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/export"),
            Some(serde_json::json!({"users": ["nobody"], "user": "alice"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_repeated_export_is_byte_identical() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    app.request(
        "POST",
        &format!("/api/files/{id}/annotations/alice/pages"),
        Some(serde_json::json!({
            "page": 0,
            "scene": rect_scene(2.0, 2.0, 4.0, 4.0, "#ff0000")
        })),
    )
    .await;

    let body = serde_json::json!({"users": ["alice", "bob"], "user": "alice"});
    let first = app
        .request("POST", &format!("/api/files/{id}/export"), Some(body.clone()))
        .await;
    let second = app
        .request("POST", &format!("/api/files/{id}/export"), Some(body))
        .await;
    assert_eq!(first.bytes, second.bytes);
}

#[tokio::test]
async fn test_out_of_range_pages_are_dropped() {
    let app = TestApp::new().await;
    let id = app.upload_pdf("doc.pdf", "alice", 2).await;

    // An annotation on a page that a structural edit later removed.
    for page in [1, 7] {
        app.request(
            "POST",
            &format!("/api/files/{id}/annotations/alice/pages"),
            Some(serde_json::json!({
                "page": page,
                "scene": rect_scene(10.0, 10.0, 40.0, 40.0, "#00ff00")
            })),
        )
        .await;
    }
    app.request(
        "POST",
        &format!("/api/files/{id}/pdf/delete-page"),
        Some(serde_json::json!({"page": 1, "user": "alice"})),
    )
    .await;

    // Both annotated pages are now out of range; export still succeeds.
    let response = app
        .request(
            "POST",
            &format!("/api/files/{id}/export"),
            Some(serde_json::json!({"users": ["alice"], "user": "alice"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let doc = lopdf::Document::load_mem(&response.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[tokio::test]
async fn test_export_does_not_advance_version() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    app.request(
        "POST",
        &format!("/api/files/{id}/export"),
        Some(serde_json::json!({"users": ["alice"], "user": "alice"})),
    )
    .await;

    let response = app.request("GET", &format!("/api/files/{id}"), None).await;
    assert_eq!(response.body["data"]["file"]["current_version"], 1);
}
