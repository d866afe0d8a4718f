//! Reference polling worker.
//!
//! Claims queued jobs from a stagekit API server, runs a configured
//! generator command for each, and reports the produced artifact (or the
//! failure) back. Stands in for the hosted GPU workers in local setups.

mod client;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use client::{ClaimedJob, QueueClient};

/// Worker configuration from environment variables.
///
/// | Env Var              | Default                  |
/// |----------------------|--------------------------|
/// | `API_URL`            | `http://127.0.0.1:5000`  |
/// | `WORKER_ID`          | `$HOSTNAME` or `worker-local` |
/// | `POLL_INTERVAL_SECS` | `5`                      |
/// | `GENERATOR_CMD`      | (required)               |
/// | `WORK_DIR`           | `worker_output`          |
#[derive(Debug, Clone)]
struct WorkerConfig {
    api_url: String,
    worker_id: String,
    poll_interval: Duration,
    /// Shell command template producing a GLB; `{prompt}` and `{output}`
    /// are substituted before it is handed to `sh -c`.
    generator_cmd: Option<String>,
    work_dir: PathBuf,
}

impl WorkerConfig {
    fn from_env() -> Self {
        let api_url =
            std::env::var("API_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".into());

        let worker_id = std::env::var("WORKER_ID")
            .or_else(|_| std::env::var("HOSTNAME"))
            .unwrap_or_else(|_| "worker-local".into());

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");

        let generator_cmd = std::env::var("GENERATOR_CMD").ok();

        let work_dir =
            PathBuf::from(std::env::var("WORK_DIR").unwrap_or_else(|_| "worker_output".into()));

        Self {
            api_url,
            worker_id,
            poll_interval: Duration::from_secs(poll_interval_secs),
            generator_cmd,
            work_dir,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stagekit_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();
    tracing::info!(
        api_url = %config.api_url,
        worker_id = %config.worker_id,
        "Worker starting",
    );

    if config.generator_cmd.is_none() {
        tracing::error!(
            "GENERATOR_CMD must be set (shell template with {{prompt}} and {{output}} placeholders)"
        );
        return;
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.work_dir).await {
        tracing::error!(error = %e, "Failed to create work directory");
        return;
    }

    let queue = QueueClient::new(config.api_url.clone(), config.worker_id.clone());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT, stopping worker");
                return;
            }
            () = poll_once(&queue, &config) => {}
        }
    }
}

/// One poll iteration: claim a job if available, otherwise idle.
async fn poll_once(queue: &QueueClient, config: &WorkerConfig) {
    match queue.claim_next().await {
        Ok(Some(job)) => {
            tracing::info!(job_id = %job.id, prompt = %job.prompt, "Claimed job");
            process_job(queue, config, &job).await;
        }
        Ok(None) => {
            tokio::time::sleep(config.poll_interval).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Claim failed, backing off");
            tokio::time::sleep(config.poll_interval).await;
        }
    }
}

/// Run the generator for one claimed job and report the outcome.
async fn process_job(queue: &QueueClient, config: &WorkerConfig, job: &ClaimedJob) {
    match generate(config, job).await {
        Ok(artifact) => match queue.complete_with_file(&job.id, &artifact).await {
            Ok(()) => {
                tracing::info!(
                    job_id = %job.id,
                    artifact = %artifact.display(),
                    "Job completed",
                );
            }
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "Failed to report completion");
            }
        },
        Err(e) => {
            tracing::warn!(job_id = %job.id, error = %e, "Generation failed");
            if let Err(report) = queue.fail(&job.id, &format!("{e:#}")).await {
                tracing::error!(job_id = %job.id, error = %report, "Failed to report failure");
            }
        }
    }
}

/// Invoke the generator command, returning the produced artifact path.
async fn generate(config: &WorkerConfig, job: &ClaimedJob) -> anyhow::Result<PathBuf> {
    let template = config
        .generator_cmd
        .as_deref()
        .context("GENERATOR_CMD is not configured")?;

    let output_path = config.work_dir.join(format!("{}.glb", job.id));
    let cmd = template
        .replace("{prompt}", &job.prompt)
        .replace("{output}", &output_path.to_string_lossy());

    tracing::debug!(job_id = %job.id, cmd = %cmd, "Running generator");

    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(&cmd)
        .output()
        .await
        .context("failed to spawn generator command")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("generator exited with {}: {}", output.status, stderr.trim());
    }

    if !output_path.exists() {
        anyhow::bail!(
            "generator produced no artifact at {}",
            output_path.display()
        );
    }

    Ok(output_path)
}
