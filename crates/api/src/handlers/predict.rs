//! Synchronous prediction: image segmentation via the vision sidecar, or
//! a placeholder layout from a text prompt.
//!
//! Stateless; shares nothing with the job queue beyond the transport
//! layer.

use axum::body::Bytes;
use axum::extract::{Form, FromRequest, Multipart, Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use stagekit_core::naming::sanitize_filename;
use stagekit_core::scene::objects_from_prompt;
use stagekit_vision::VisionError;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Urlencoded form body for the prompt-only variant.
#[derive(Debug, Deserialize)]
pub struct PromptForm {
    pub prompt: String,
}

/// POST /predict
///
/// Multipart `image` field: store the upload, run it through the
/// segmentation sidecar, and return the detections. A `prompt` field
/// (multipart or urlencoded): derive a placeholder object layout.
/// 400 when neither is provided.
pub async fn predict(State(state): State<AppState>, request: Request) -> AppResult<Response> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let mut image: Option<(String, Bytes)> = None;
        let mut prompt: Option<String> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            match field.name() {
                Some("image") => {
                    let filename = sanitize_filename(field.file_name().unwrap_or("upload.png"));
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    image = Some((filename, data));
                }
                Some("prompt") => {
                    prompt = Some(
                        field
                            .text()
                            .await
                            .map_err(|e| AppError::BadRequest(e.to_string()))?,
                    );
                }
                _ => {} // ignore unknown fields
            }
        }

        if let Some((filename, data)) = image {
            return predict_image(&state, filename, data).await;
        }
        if let Some(prompt) = prompt {
            return Ok(predict_prompt(&prompt));
        }
        return Err(AppError::BadRequest("No image or prompt provided".to_string()));
    }

    // The prompt also arrives as a urlencoded form field from older
    // frontend builds.
    match Form::<PromptForm>::from_request(request, &()).await {
        Ok(Form(form)) => Ok(predict_prompt(&form.prompt)),
        Err(_) => Err(AppError::BadRequest("No image or prompt provided".to_string())),
    }
}

/// Image branch: persist the upload, call the sidecar, echo detections.
async fn predict_image(state: &AppState, filename: String, data: Bytes) -> AppResult<Response> {
    let path = state.config.upload_dir.join(&filename);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("failed to store upload: {e}")))?;

    let detections = state
        .vision
        .segment(&filename, data.to_vec())
        .await
        .map_err(|e| match e {
            VisionError::Api { status, body } => {
                AppError::Upstream(format!("segmentation failed ({status}): {body}"))
            }
            other => AppError::Upstream(other.to_string()),
        })?;

    tracing::info!(file = %filename, detections = detections.len(), "Image segmented");

    Ok(Json(json!({
        "status": "ok",
        "source": "image",
        "results": detections,
        "segmented_image": format!("/uploads/{filename}"),
    }))
    .into_response())
}

/// Prompt branch: keyword heuristic, no external calls.
fn predict_prompt(prompt: &str) -> Response {
    let objects = objects_from_prompt(prompt);

    tracing::info!(prompt = %prompt, objects = objects.len(), "Prompt layout generated");

    Json(json!({
        "status": "ok",
        "source": "prompt",
        "prompt": prompt,
        "objects": objects,
    }))
    .into_response()
}
