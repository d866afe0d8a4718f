//! Route definitions for the generation job queue.
//!
//! Paths are part of the worker protocol; deployed workers poll them by
//! name, so they live at the root rather than under an API prefix.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Job queue routes mounted at the root.
///
/// ```text
/// POST /generate              -> enqueue
/// GET  /status/{job_id}       -> status
/// GET  /result/{job_id}       -> result
/// POST /job/next              -> claim_next (worker)
/// POST /job/{job_id}/complete -> complete (worker)
/// POST /job/{job_id}/fail     -> fail (worker)
/// GET  /_jobs                 -> list_all (debug)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(jobs::enqueue))
        .route("/status/{job_id}", get(jobs::status))
        .route("/result/{job_id}", get(jobs::result))
        .route("/job/next", post(jobs::claim_next))
        .route("/job/{job_id}/complete", post(jobs::complete))
        .route("/job/{job_id}/fail", post(jobs::fail))
        .route("/_jobs", get(jobs::list_all))
}
