//! REST client for the object-segmentation sidecar.
//!
//! The segmentation model (a pretrained YOLO variant) runs as a separate
//! HTTP service; this crate wraps its `/predict` endpoint behind a
//! narrow, typed interface so the API server never touches inference
//! internals.

use serde::{Deserialize, Serialize};

/// HTTP client for a single segmentation sidecar instance.
#[derive(Clone)]
pub struct VisionClient {
    client: reqwest::Client,
    api_url: String,
}

/// Axis-aligned bounding box in image pixel coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// One detected object instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Human-readable class name, e.g. `"chair"`.
    pub name: String,
    /// Numeric class index in the model's label set.
    pub class: u32,
    pub confidence: f64,
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
}

/// Errors from the segmentation sidecar.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The sidecar returned a non-2xx status code.
    #[error("Segmentation API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl VisionClient {
    /// Create a new client for a segmentation sidecar.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://127.0.0.1:8000`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful
    /// for connection pooling with the rest of the server).
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Run segmentation on one image, returning the detected instances.
    ///
    /// Sends `POST /predict` with the image as a multipart `image` field.
    pub async fn segment(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<Detection>, VisionError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(format!("{}/predict", self.api_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
