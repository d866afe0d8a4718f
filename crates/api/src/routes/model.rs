//! Route definition for the proxied stage model asset.

use axum::routing::get;
use axum::Router;

use crate::handlers::model_proxy;
use crate::state::AppState;

/// Model asset route mounted at the root.
///
/// ```text
/// GET /model/{filename} -> proxy_model
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/model/{filename}", get(model_proxy::proxy_model))
}
