//! HTTP client for the stagekit job-queue worker protocol
//! (claim, complete, fail).

use std::path::Path;

use serde::Deserialize;

/// A job record as returned by the claim endpoint. Only the fields the
/// worker acts on are decoded; the rest of the record is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimedJob {
    pub id: String,
    pub prompt: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

/// Errors from the queue API.
#[derive(Debug, thiserror::Error)]
pub enum QueueClientError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The queue API returned a non-2xx status code.
    #[error("Queue API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The artifact file could not be read for upload.
    #[error("Artifact unreadable: {0}")]
    Io(#[from] std::io::Error),
}

/// Client for one stagekit API server, bound to a worker identity.
pub struct QueueClient {
    client: reqwest::Client,
    api_url: String,
    worker_id: String,
}

impl QueueClient {
    /// Create a new client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://127.0.0.1:5000`.
    /// * `worker_id` - Identity reported with every claim.
    pub fn new(api_url: String, worker_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            worker_id,
        }
    }

    /// Claim the next queued job. `None` when the queue is empty (204).
    pub async fn claim_next(&self) -> Result<Option<ClaimedJob>, QueueClientError> {
        let response = self
            .client
            .post(format!("{}/job/next", self.api_url))
            .json(&serde_json::json!({ "worker_id": self.worker_id }))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let response = Self::check_status(response).await?;
        Ok(Some(response.json().await?))
    }

    /// Upload a generated artifact for a claimed job.
    pub async fn complete_with_file(
        &self,
        job_id: &str,
        path: &Path,
    ) -> Result<(), QueueClientError> {
        let data = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("model.glb")
            .to_string();

        let part = reqwest::multipart::Part::bytes(data).file_name(filename);
        let form = reqwest::multipart::Form::new().part("model", part);

        let response = self
            .client
            .post(format!("{}/job/{job_id}/complete", self.api_url))
            .multipart(form)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Report an externally hosted result.
    pub async fn complete_with_url(
        &self,
        job_id: &str,
        model_url: &str,
    ) -> Result<(), QueueClientError> {
        let response = self
            .client
            .post(format!("{}/job/{job_id}/complete", self.api_url))
            .json(&serde_json::json!({ "model_url": model_url }))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Report a failed generation attempt.
    pub async fn fail(&self, job_id: &str, error: &str) -> Result<(), QueueClientError> {
        let response = self
            .client
            .post(format!("{}/job/{job_id}/fail", self.api_url))
            .json(&serde_json::json!({ "error": error }))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn check_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, QueueClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(QueueClientError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}
