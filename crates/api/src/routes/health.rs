//! Liveness probe.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Routes mounted at the root.
///
/// ```text
/// GET /ping -> ping
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/ping", get(ping))
}

/// GET /ping
///
/// Cheap liveness check; no dependencies are touched.
async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "backend alive" }))
}
