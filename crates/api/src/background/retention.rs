//! Periodic eviction of aged terminal jobs.
//!
//! The job map lives in memory and otherwise grows for the lifetime of
//! the process. Jobs that finished more than the retention window ago
//! are dropped; queued and running jobs are never touched.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use stagekit_core::lifecycle::JobQueue;

/// Run the retention sweep loop until cancelled.
///
/// `retention_secs == 0` disables eviction entirely; the task still
/// parks on the cancellation token so shutdown behaves uniformly.
pub async fn run(
    jobs: Arc<JobQueue>,
    retention_secs: u64,
    sweep_interval: Duration,
    cancel: CancellationToken,
) {
    if retention_secs == 0 {
        tracing::info!("Job retention disabled, sweeper idle");
        cancel.cancelled().await;
        return;
    }

    let mut interval = tokio::time::interval(sweep_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::seconds(retention_secs as i64);
                let evicted = jobs.evict_terminal_before(cutoff);
                if evicted > 0 {
                    tracing::info!(evicted, "Evicted aged terminal jobs");
                }
            }
            _ = cancel.cancelled() => {
                tracing::info!("Retention sweeper stopped");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_sweeper_exits_on_cancel() {
        let jobs = Arc::new(JobQueue::new());
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run(
            Arc::clone(&jobs),
            0,
            Duration::from_secs(3600),
            cancel.clone(),
        ));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop promptly")
            .unwrap();
    }

    #[tokio::test]
    async fn sweep_evicts_aged_terminal_jobs() {
        let jobs = Arc::new(JobQueue::new());
        let job = jobs.create("stage", None).unwrap();
        jobs.claim("w1").unwrap();
        jobs.complete_with_url(&job.id, "https://example.com/a.glb")
            .unwrap();

        // Cutoff in the near future: the just-finished job predates it.
        let evicted = jobs.evict_terminal_before(Utc::now() + chrono::Duration::seconds(1));
        assert_eq!(evicted, 1);
        assert!(jobs.list().is_empty());
    }
}
