//! Sketch upload.
//!
//! Stores the uploaded sketch and hands back a public URL the generation
//! pipeline can fetch it from; workers run out-of-process, so the URL
//! must be absolute.

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use stagekit_core::naming::sanitize_filename;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/upload-sketch
///
/// Multipart `sketch` file field. The returned URL is built from the
/// request's Host header (honouring `x-forwarded-proto` behind a
/// reverse proxy).
pub async fn upload_sketch(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("sketch") {
            let filename = sanitize_filename(field.file_name().unwrap_or("sketch.png"));
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            upload = Some((filename, data));
        }
    }

    let Some((filename, data)) = upload else {
        return Err(AppError::BadRequest("No file uploaded".to_string()));
    };

    let path = state.config.upload_dir.join(&filename);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("failed to store sketch: {e}")))?;

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let sketch_url = format!("{scheme}://{host}/uploads/{filename}");

    tracing::info!(file = %filename, url = %sketch_url, "Sketch uploaded");

    Ok(Json(json!({ "status": "ok", "sketch_url": sketch_url })))
}
