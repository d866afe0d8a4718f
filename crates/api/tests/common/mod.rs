//! Shared helpers for API integration tests.
#![allow(dead_code)] // not every test binary uses every helper

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use stagekit_api::config::ServerConfig;
use stagekit_api::router::build_app_router;
use stagekit_api::state::AppState;
use stagekit_core::lifecycle::JobQueue;
use stagekit_vision::VisionClient;

/// Build a test `ServerConfig` rooted in a unique temp directory so
/// parallel tests never share upload or artifact state.
///
/// The model and vision URLs point at TCP port 9 (discard), so upstream
/// calls fail fast with a connection error instead of hanging.
pub fn test_config() -> ServerConfig {
    let root = std::env::temp_dir().join(format!(
        "stagekit-test-{}",
        uuid::Uuid::new_v4().simple()
    ));
    std::fs::create_dir_all(root.join("uploads")).unwrap();
    std::fs::create_dir_all(root.join("generated_models")).unwrap();

    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        max_body_bytes: 64 * 1024 * 1024,
        model_url: "http://127.0.0.1:9/perfect_stage_corrected.glb".to_string(),
        model_filename: "perfect_stage_corrected.glb".to_string(),
        upload_dir: root.join("uploads"),
        artifact_dir: root.join("generated_models"),
        public_dir: root.join("public"),
        vision_url: "http://127.0.0.1:9".to_string(),
        job_retention_secs: 0,
        retention_sweep_interval_secs: 3600,
    }
}

/// Build the full application router with all middleware layers.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same stack (CORS, request ID, timeout, body limit, panic
/// recovery) that production uses. Returns the config alongside the
/// router so tests can inspect the storage directories.
pub fn build_test_app() -> (Router, ServerConfig) {
    let config = test_config();
    let http = reqwest::Client::new();

    let state = AppState {
        jobs: Arc::new(JobQueue::new()),
        config: Arc::new(config.clone()),
        vision: VisionClient::with_client(http.clone(), config.vision_url.clone()),
        http,
    };

    (build_app_router(state, &config), config)
}

/// GET a path and return the raw response.
pub async fn get(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST a JSON body.
pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST with an empty body and no content type.
pub async fn post_empty(app: Router, path: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST a urlencoded form body.
pub async fn post_form(app: Router, path: &str, body: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// POST a single-field multipart body. `filename` switches the field
/// between a file part and a plain text part.
pub async fn post_multipart(
    app: Router,
    path: &str,
    field: &str,
    filename: Option<&str>,
    data: &[u8],
) -> Response<Body> {
    const BOUNDARY: &str = "stagekit-test-boundary";

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    match filename {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        ),
        None => body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
        ),
    }
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body into bytes.
pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Parse a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}
