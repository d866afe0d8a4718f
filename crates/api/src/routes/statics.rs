//! Static file serving and sketch upload.
//!
//! Client uploads, frontend assets, and the SPA index are served
//! straight from disk.

use axum::routing::post;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

use crate::config::ServerConfig;
use crate::handlers::sketch;
use crate::state::AppState;

/// Static routes mounted at the root.
///
/// ```text
/// POST /api/upload-sketch -> upload_sketch
/// GET  /uploads/{..}      -> client uploads
/// GET  /assets/{..}       -> frontend assets
/// GET  /                  -> frontend index.html
/// ```
pub fn router(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .route("/api/upload-sketch", post(sketch::upload_sketch))
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .nest_service("/assets", ServeDir::new(config.public_dir.join("assets")))
        .route_service("/", ServeFile::new(config.public_dir.join("index.html")))
}
