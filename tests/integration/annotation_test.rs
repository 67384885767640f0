//! Integration tests for annotation layers.

use http::StatusCode;

use crate::helpers::{TestApp, rect_scene};

#[tokio::test]
async fn test_get_layer_defaults_to_empty() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    let response = app
        .request("GET", &format!("/api/files/{id}/annotations/alice"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["revision"], 0);
    assert_eq!(
        response.body["data"]["pages"].as_object().unwrap().len(),
        0
    );
}

#[tokio::test]
async fn test_put_get_roundtrip() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    let pages = serde_json::json!({
        "0": rect_scene(1.0, 1.0, 4.0, 4.0, "#ff0000"),
        "2": rect_scene(2.0, 2.0, 3.0, 3.0, "#00ff00"),
    });
    let response = app
        .request(
            "PUT",
            &format!("/api/files/{id}/annotations/alice"),
            Some(serde_json::json!({"pages": pages, "revision": 0})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["data"]["revision"], 1);

    let response = app
        .request("GET", &format!("/api/files/{id}/annotations/alice"), None)
        .await;
    assert_eq!(response.body["data"]["pages"], pages);
    assert!(response.body["data"]["updated_at"].is_string());
}

#[tokio::test]
async fn test_stale_revision_is_conflict() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    let pages = serde_json::json!({"0": rect_scene(1.0, 1.0, 4.0, 4.0, "#ff0000")});
    app.request(
        "PUT",
        &format!("/api/files/{id}/annotations/alice"),
        Some(serde_json::json!({"pages": pages, "revision": 0})),
    )
    .await;

    // A writer that read before the first save must not clobber it.
    let response = app
        .request(
            "PUT",
            &format!("/api/files/{id}/annotations/alice"),
            Some(serde_json::json!({"pages": {}, "revision": 0})),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");

    // Retry with the fresh revision succeeds.
    let response = app
        .request(
            "PUT",
            &format!("/api/files/{id}/annotations/alice"),
            Some(serde_json::json!({"pages": {}, "revision": 1})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["revision"], 2);
}

#[tokio::test]
async fn test_save_page_merges() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    for page in [0, 3] {
        let response = app
            .request(
                "POST",
                &format!("/api/files/{id}/annotations/alice/pages"),
                Some(serde_json::json!({
                    "page": page,
                    "scene": rect_scene(1.0, 1.0, 2.0, 2.0, "#0000ff")
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    let response = app
        .request("GET", &format!("/api/files/{id}/annotations/alice"), None)
        .await;
    let pages = response.body["data"]["pages"].as_object().unwrap();
    assert_eq!(pages.len(), 2);
    assert!(pages.contains_key("0"));
    assert!(pages.contains_key("3"));
}

#[tokio::test]
async fn test_list_layers_sorted_by_user() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    for user in ["carol", "alice", "bob"] {
        app.request(
            "POST",
            &format!("/api/files/{id}/annotations/{user}/pages"),
            Some(serde_json::json!({
                "page": 0,
                "scene": rect_scene(1.0, 1.0, 2.0, 2.0, "#0000ff")
            })),
        )
        .await;
    }

    let response = app
        .request("GET", &format!("/api/files/{id}/annotations"), None)
        .await;
    let users: Vec<&str> = response.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["user"].as_str().unwrap())
        .collect();
    assert_eq!(users, vec!["alice", "bob", "carol"]);
}

#[tokio::test]
async fn test_delete_layer_is_idempotent() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    app.request(
        "POST",
        &format!("/api/files/{id}/annotations/alice/pages"),
        Some(serde_json::json!({
            "page": 0,
            "scene": rect_scene(1.0, 1.0, 2.0, 2.0, "#0000ff")
        })),
    )
    .await;

    for _ in 0..2 {
        let response = app
            .request(
                "DELETE",
                &format!("/api/files/{id}/annotations/alice"),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let response = app
        .request("GET", &format!("/api/files/{id}/annotations/alice"), None)
        .await;
    assert_eq!(response.body["data"]["revision"], 0);
}

#[tokio::test]
async fn test_combined_scene_marks_other_users_locked() {
    let app = TestApp::new().await;
    let id = app.upload_png("photo.png", "alice").await;

    for user in ["alice", "bob"] {
        app.request(
            "POST",
            &format!("/api/files/{id}/annotations/{user}/pages"),
            Some(serde_json::json!({
                "page": 0,
                "scene": rect_scene(1.0, 1.0, 2.0, 2.0, "#0000ff")
            })),
        )
        .await;
    }

    let response = app
        .request(
            "GET",
            &format!("/api/files/{id}/annotations/combined?page=0&user=alice"),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let objects = response.body["data"]["objects"].as_array().unwrap();
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0]["locked"], true);
    assert_eq!(objects[1]["locked"], false);
}

#[tokio::test]
async fn test_unknown_file_is_404() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "GET",
            "/api/files/00000000-0000-0000-0000-999999999999/annotations/alice",
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
