use std::path::PathBuf;

/// Upstream location of the static stage model, a GitHub release asset.
const DEFAULT_MODEL_URL: &str =
    "https://github.com/Harsha-k04/Stagenix-backend/releases/download/v1.0/perfect_stage_corrected.glb?raw=1";

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    /// A lone `*` allows any origin (without credentials).
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`; artifact uploads
    /// and the upstream proxy can be slow).
    pub request_timeout_secs: u64,
    /// Maximum accepted request body size in bytes (default: 512 MiB;
    /// workers upload whole GLB files in one request).
    pub max_body_bytes: usize,
    /// Upstream URL of the static stage model asset.
    pub model_url: String,
    /// Filename under which the proxied model asset is exposed.
    pub model_filename: String,
    /// Directory for client uploads (images, sketches).
    pub upload_dir: PathBuf,
    /// Directory for worker-uploaded generation artifacts.
    pub artifact_dir: PathBuf,
    /// Directory of static frontend files served at `/`.
    pub public_dir: PathBuf,
    /// Base URL of the segmentation sidecar.
    pub vision_url: String,
    /// Terminal jobs older than this many seconds are evicted by the
    /// retention sweep. `0` disables eviction.
    pub job_retention_secs: u64,
    /// How often the retention sweep runs.
    pub retention_sweep_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                      |
    /// |---------------------------------|------------------------------|
    /// | `HOST`                          | `0.0.0.0`                    |
    /// | `PORT`                          | `5000`                       |
    /// | `CORS_ORIGINS`                  | `*`                          |
    /// | `REQUEST_TIMEOUT_SECS`          | `120`                        |
    /// | `MAX_BODY_MB`                   | `512`                        |
    /// | `MODEL_URL`                     | GitHub release asset URL     |
    /// | `MODEL_FILENAME`                | `perfect_stage_corrected.glb`|
    /// | `UPLOAD_DIR`                    | `uploads`                    |
    /// | `ARTIFACT_DIR`                  | `generated_models`           |
    /// | `PUBLIC_DIR`                    | `public`                     |
    /// | `VISION_URL`                    | `http://127.0.0.1:8000`      |
    /// | `JOB_RETENTION_SECS`            | `86400` (`0` disables)       |
    /// | `RETENTION_SWEEP_INTERVAL_SECS` | `3600`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_body_mb: usize = std::env::var("MAX_BODY_MB")
            .unwrap_or_else(|_| "512".into())
            .parse()
            .expect("MAX_BODY_MB must be a valid usize");

        let model_url =
            std::env::var("MODEL_URL").unwrap_or_else(|_| DEFAULT_MODEL_URL.into());

        let model_filename = std::env::var("MODEL_FILENAME")
            .unwrap_or_else(|_| "perfect_stage_corrected.glb".into());

        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));

        let artifact_dir = PathBuf::from(
            std::env::var("ARTIFACT_DIR").unwrap_or_else(|_| "generated_models".into()),
        );

        let public_dir =
            PathBuf::from(std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".into()));

        let vision_url =
            std::env::var("VISION_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".into());

        let job_retention_secs: u64 = std::env::var("JOB_RETENTION_SECS")
            .unwrap_or_else(|_| "86400".into())
            .parse()
            .expect("JOB_RETENTION_SECS must be a valid u64");

        let retention_sweep_interval_secs: u64 =
            std::env::var("RETENTION_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "3600".into())
                .parse()
                .expect("RETENTION_SWEEP_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_body_bytes: max_body_mb * 1024 * 1024,
            model_url,
            model_filename,
            upload_dir,
            artifact_dir,
            public_dir,
            vision_url,
            job_retention_secs,
            retention_sweep_interval_secs,
        }
    }
}
