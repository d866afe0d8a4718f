//! Streaming proxy for the static stage model asset.
//!
//! The GLB lives on a GitHub release; GitHub rejects requests without a
//! browser-ish User-Agent, so the proxy sets one and follows redirects.
//! The body is streamed through without buffering.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;

use stagekit_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /model/{filename}
///
/// Stream the upstream model asset through to the client. Only the
/// configured filename is exposed; anything else is 404.
pub async fn proxy_model(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    if filename != state.config.model_filename {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "ModelAsset",
            id: filename,
        }));
    }

    let upstream = state
        .http
        .get(&state.config.model_url)
        .header(header::USER_AGENT, "Mozilla/5.0")
        .header(header::ACCEPT, "*/*")
        .send()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    let status = upstream.status();
    if status != reqwest::StatusCode::OK {
        return Err(AppError::Upstream(format!(
            "GitHub returned {}",
            status.as_u16()
        )));
    }

    tracing::info!(file = %filename, "Proxying model asset");

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "model/gltf-binary")
        .body(Body::from_stream(upstream.bytes_stream()))
        .unwrap())
}
