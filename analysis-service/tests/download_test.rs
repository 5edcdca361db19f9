//! `POST /download` is a placeholder that acknowledges any request.

mod common;

use analysis_service::services::providers::MockVisionProvider;
use analysis_service::startup::build_router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{multipart_request, test_state, RawPart, TestDirs};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn post_download(request: Request<Body>) -> (StatusCode, Value) {
    let dirs = TestDirs::new();
    let state = test_state(&dirs, Arc::new(MockVisionProvider::new("unused")), |_| {}).await;

    let response = build_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn download_without_body_succeeds() {
    let request = Request::builder()
        .method("POST")
        .uri("/download")
        .body(Body::empty())
        .unwrap();

    let (status, body) = post_download(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn download_ignores_json_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/download")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"results":"A fern","format":"pdf"}"#))
        .unwrap();

    let (status, body) = post_download(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn download_ignores_garbage_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/download")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = post_download(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn download_ignores_multipart_body() {
    let request = multipart_request(
        "/download",
        &[RawPart {
            name: "image",
            file_name: Some("leaf.png"),
            content_type: Some("image/png"),
            data: b"\x89PNG",
        }],
    );

    let (status, body) = post_download(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
}
