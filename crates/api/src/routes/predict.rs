//! Route definition for synchronous prediction.

use axum::routing::post;
use axum::Router;

use crate::handlers::predict;
use crate::state::AppState;

/// Prediction route mounted at the root.
///
/// ```text
/// POST /predict -> predict (image segmentation or prompt layout)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/predict", post(predict::predict))
}
