//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use bytes::Bytes;
use http::{Request, StatusCode};
use lopdf::{Document, Object, Stream, dictionary};
use serde_json::Value;
use tower::ServiceExt;

use markhub_core::config::AppConfig;

const BOUNDARY: &str = "markhub-test-boundary";

/// Test application context.
pub struct TestApp {
    /// The Axum router for making test requests.
    pub router: Router,
}

/// A captured response.
pub struct TestResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Parsed JSON body (`Null` for binary responses).
    pub body: Value,
    /// Raw body bytes.
    pub bytes: Bytes,
}

impl TestApp {
    /// Create a new test application over in-memory backends.
    pub async fn new() -> Self {
        let config =
            AppConfig::load("tests/fixtures/test_config.toml").expect("Failed to load test config");
        let router = markhub_api::build_app(config)
            .await
            .expect("Failed to build app");
        Self { router }
    }

    /// Issue a request with an optional JSON body.
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("send request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            body,
            bytes,
        }
    }

    /// Issue a multipart request with `user`, optional `action`, and a
    /// `file` field.
    pub async fn multipart(
        &self,
        path: &str,
        user: &str,
        action: Option<&str>,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> TestResponse {
        let mut body = Vec::new();
        push_text_field(&mut body, "user", user);
        if let Some(action) = action {
            push_text_field(&mut body, "action", action);
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("build multipart request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("send request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            body,
            bytes,
        }
    }

    /// Upload a PNG fixture; returns the file id.
    pub async fn upload_png(&self, name: &str, user: &str) -> String {
        let response = self
            .multipart("/api/files/upload", user, None, name, "image/png", &png_fixture())
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["data"]["id"]
            .as_str()
            .expect("file id")
            .to_string()
    }

    /// Upload an n-page PDF fixture; returns the file id.
    pub async fn upload_pdf(&self, name: &str, user: &str, pages: usize) -> String {
        let response = self
            .multipart(
                "/api/files/upload",
                user,
                None,
                name,
                "application/pdf",
                &pdf_fixture(pages),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["data"]["id"]
            .as_str()
            .expect("file id")
            .to_string()
    }
}

fn push_text_field(body: &mut Vec<u8>, name: &str, value: &str) {
    body.extend_from_slice(
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
            .as_bytes(),
    );
}

/// A 16x16 white PNG.
pub fn png_fixture() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(16, 16, image::Rgba([255, 255, 255, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode fixture PNG");
    out.into_inner()
}

/// An n-page Letter-sized PDF.
pub fn pdf_fixture(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for _ in 0..pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, b"q\nQ".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("build fixture PDF");
    out
}

/// A one-rectangle scene covering `(x, y)..(x+w, y+h)`.
pub fn rect_scene(x: f64, y: f64, w: f64, h: f64, color: &str) -> Value {
    serde_json::json!({
        "objects": [{
            "kind": "rect",
            "x": x, "y": y, "width": w, "height": h,
            "paint": {"stroke": color, "stroke_width": 1.0, "fill": color}
        }]
    })
}
