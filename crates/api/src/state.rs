use std::sync::Arc;

use stagekit_core::lifecycle::JobQueue;
use stagekit_vision::VisionClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// In-memory job queue, the system of record for generation jobs.
    pub jobs: Arc<JobQueue>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Segmentation sidecar client.
    pub vision: VisionClient,
    /// Shared HTTP client for the upstream model proxy.
    pub http: reqwest::Client,
}
