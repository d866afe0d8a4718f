//! Integration tests for sketch upload and static file serving.

mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_json, build_test_app, get, post_empty, post_multipart};

#[tokio::test]
async fn sketch_upload_stores_file_and_returns_public_url() {
    let (app, config) = build_test_app();

    let response = post_multipart(
        app,
        "/api/upload-sketch",
        "sketch",
        Some("stage sketch.png"),
        b"\x89PNGsketch",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    let url = body["sketch_url"].as_str().unwrap();
    // Sanitized filename, absolute URL.
    assert!(url.ends_with("/uploads/stage_sketch.png"), "url was {url}");
    assert!(url.starts_with("http://"));

    assert!(config.upload_dir.join("stage_sketch.png").exists());
}

#[tokio::test]
async fn sketch_upload_without_file_is_400() {
    let (app, _config) = build_test_app();

    let response = post_empty(app, "/api/upload-sketch").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stored_uploads_are_served_statically() {
    let (app, config) = build_test_app();

    std::fs::write(config.upload_dir.join("room.png"), b"pngbytes").unwrap();

    let response = get(app.clone(), "/uploads/room.png").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], b"pngbytes");

    let response = get(app, "/uploads/missing.png").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
