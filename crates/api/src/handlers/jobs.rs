//! Handlers for the generation job queue: client-facing enqueue/status/
//! result plus the worker claim/complete/fail protocol.

use std::net::SocketAddr;

use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, FromRequest, Multipart, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;

use stagekit_core::lifecycle::result_url;
use stagekit_core::naming::artifact_filename;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request body for POST /generate.
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

/// Optional request body for POST /job/next.
#[derive(Debug, Default, Deserialize)]
pub struct ClaimRequest {
    #[serde(default)]
    pub worker_id: Option<String>,
}

/// JSON form of POST /job/{job_id}/complete.
#[derive(Debug, Default, Deserialize)]
pub struct CompleteRequest {
    #[serde(default)]
    pub model_url: Option<String>,
}

/// Request body for POST /job/{job_id}/fail.
#[derive(Debug, Deserialize)]
pub struct FailRequest {
    #[serde(default)]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Enqueue
// ---------------------------------------------------------------------------

/// POST /generate
///
/// Create a new generation job from a prompt. Returns 201 with the job
/// id; the job starts `queued` and is picked up by a polling worker.
pub async fn enqueue(
    State(state): State<AppState>,
    Json(input): Json<EnqueueRequest>,
) -> AppResult<impl IntoResponse> {
    let prompt = input.prompt.unwrap_or_default();
    let job = state.jobs.create(&prompt, input.meta)?;

    tracing::info!(job_id = %job.id, "Job enqueued");

    Ok((StatusCode::CREATED, Json(json!({ "job_id": job.id }))))
}

// ---------------------------------------------------------------------------
// Status / result
// ---------------------------------------------------------------------------

/// GET /status/{job_id}
///
/// The full job record minus `meta` (the creation payload is private to
/// the submitter and the worker).
pub async fn status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let job = state.jobs.status(&job_id)?;
    Ok(Json(job.public_view()))
}

/// GET /result/{job_id}
///
/// Stream the stored artifact for a file-backed result, or return the
/// external URL for a URL-backed one. 404 until the job is `done`,
/// with a message distinct from an unknown id.
pub async fn result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Response> {
    let result = state.jobs.result(&job_id)?;

    let Some(file) = result.file else {
        return Ok(Json(json!({ "url": result.url })).into_response());
    };

    let path = state.config.artifact_dir.join(&file);
    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        AppError::InternalError(format!("artifact {} unreadable: {e}", path.display()))
    })?;
    let stream = ReaderStream::new(file);

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "model/gltf-binary")
        .body(Body::from_stream(stream))
        .unwrap())
}

// ---------------------------------------------------------------------------
// Worker protocol
// ---------------------------------------------------------------------------

/// POST /job/next
///
/// Claim the oldest queued job for the calling worker. The worker may
/// identify itself in an optional JSON body; otherwise its socket
/// address is used. Returns the full record (including `meta`, which the
/// worker may need for generation parameters), or 204 with an empty
/// body when nothing is queued.
pub async fn claim_next(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Response> {
    // Socket address fallback for workers that do not identify themselves.
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string());

    // The body is optional; workers may POST with no payload at all.
    let body = Bytes::from_request(request, &())
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let input: ClaimRequest = if body.is_empty() {
        ClaimRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    let worker_id = input
        .worker_id
        .or(peer)
        .unwrap_or_else(|| "unknown".to_string());

    match state.jobs.claim(&worker_id) {
        Some(job) => {
            tracing::info!(job_id = %job.id, worker_id = %worker_id, "Job claimed");
            Ok(Json(job.full_view()).into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// POST /job/{job_id}/complete
///
/// Worker completion report, in one of two forms: multipart with a
/// `model` file field (the artifact is stored under the artifact dir as
/// `{job_id}__{filename}`), or JSON `{"model_url": ...}` for externally
/// hosted results. 400 when neither is supplied, 409 when the job is not
/// running.
pub async fn complete(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    request: Request,
) -> AppResult<Response> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        return complete_with_upload(&state, &job_id, multipart).await;
    }

    let body = Bytes::from_request(request, &())
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let input: CompleteRequest = if body.is_empty() {
        CompleteRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    let Some(url) = input.model_url else {
        return Err(AppError::BadRequest("no model provided".to_string()));
    };

    let job = state.jobs.complete_with_url(&job_id, &url)?;
    tracing::info!(job_id = %job.id, url = %url, "Job completed with external result URL");

    Ok(Json(json!({ "status": "ok", "url": url })).into_response())
}

/// Store an uploaded artifact and mark the job done.
async fn complete_with_upload(
    state: &AppState,
    job_id: &str,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("model") {
            let filename = field.file_name().unwrap_or("model.glb").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            upload = Some((filename, data));
        }
    }

    let Some((filename, data)) = upload else {
        return Err(AppError::BadRequest("no model provided".to_string()));
    };

    // 404 for unknown jobs before anything touches the disk.
    state.jobs.status(job_id)?;

    let out_name = artifact_filename(job_id, &filename);
    let out_path = state.config.artifact_dir.join(&out_name);
    tokio::fs::write(&out_path, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("failed to store artifact: {e}")))?;

    let job = state.jobs.complete_with_artifact(job_id, &out_name)?;

    tracing::info!(
        job_id = %job.id,
        file = %out_name,
        bytes = data.len(),
        "Job completed with uploaded artifact",
    );

    Ok(Json(json!({ "status": "ok", "file": result_url(job_id) })).into_response())
}

/// POST /job/{job_id}/fail
///
/// Worker failure report. Marks a running job failed with the given
/// error message.
pub async fn fail(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(input): Json<FailRequest>,
) -> AppResult<impl IntoResponse> {
    let error = input
        .error
        .unwrap_or_else(|| "generation failed".to_string());
    let job = state.jobs.fail(&job_id, &error)?;

    tracing::warn!(job_id = %job.id, error = %error, "Job failed");

    Ok(Json(json!({ "status": "ok" })))
}

// ---------------------------------------------------------------------------
// Debug
// ---------------------------------------------------------------------------

/// GET /_jobs
///
/// Debug listing of every job record, `meta` included.
pub async fn list_all(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let jobs: Vec<_> = state.jobs.list().iter().map(|j| j.full_view()).collect();
    Ok(Json(jobs))
}
