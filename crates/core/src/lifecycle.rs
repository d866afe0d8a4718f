//! Job lifecycle state machine.
//!
//! `queued → running → done` and `running → failed`; terminal states are
//! final. Every transition happens atomically inside the store's lock, so
//! concurrent workers can race on the same endpoints safely.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::error::CoreError;
use crate::job::{Job, JobResult, JobState, JobStatus};
use crate::store::JobStore;

/// Retrieval path for a file-backed result.
pub fn result_url(job_id: &str) -> String {
    format!("/result/{job_id}")
}

/// Lifecycle operations over a [`JobStore`].
///
/// The only way jobs are created or transitioned; handlers never touch
/// the store directly.
#[derive(Default)]
pub struct JobQueue {
    store: JobStore,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new queued job. Rejects an empty or whitespace-only
    /// prompt. `meta` defaults to an empty object.
    pub fn create(&self, prompt: &str, meta: Option<Value>) -> Result<Job, CoreError> {
        if prompt.trim().is_empty() {
            return Err(CoreError::Validation("missing prompt".to_string()));
        }

        let job = Job {
            id: Uuid::new_v4().simple().to_string(),
            seq: 0, // assigned by the store
            prompt: prompt.to_string(),
            meta: meta.unwrap_or_else(|| Value::Object(Default::default())),
            created_at: Utc::now(),
            state: JobState::Queued,
        };

        self.store.insert(job)
    }

    /// Claim the oldest queued job for `worker_id`.
    ///
    /// The scan and the transition share one lock acquisition, so for any
    /// two concurrent claims at most one wins a given job. Returns `None`
    /// when nothing is queued, without mutating the store.
    pub fn claim(&self, worker_id: &str) -> Option<Job> {
        self.store.scan_claim(
            |job| job.status() == JobStatus::Queued,
            |job| {
                job.state = JobState::Running {
                    worker_id: worker_id.to_string(),
                    started_at: Utc::now(),
                };
            },
        )
    }

    /// Mark a running job done with an artifact stored under the given
    /// filename; the result URL is the derived `/result/{id}` path.
    pub fn complete_with_artifact(&self, id: &str, file: &str) -> Result<Job, CoreError> {
        let result = JobResult {
            file: Some(file.to_string()),
            url: result_url(id),
        };
        self.finish(id, |worker_id, started_at| JobState::Done {
            worker_id,
            started_at,
            finished_at: Utc::now(),
            result,
        })
    }

    /// Mark a running job done with an externally hosted result URL.
    pub fn complete_with_url(&self, id: &str, url: &str) -> Result<Job, CoreError> {
        let result = JobResult {
            file: None,
            url: url.to_string(),
        };
        self.finish(id, |worker_id, started_at| JobState::Done {
            worker_id,
            started_at,
            finished_at: Utc::now(),
            result,
        })
    }

    /// Mark a running job failed with a human-readable message.
    pub fn fail(&self, id: &str, error_msg: &str) -> Result<Job, CoreError> {
        let error = error_msg.to_string();
        self.finish(id, |worker_id, started_at| JobState::Failed {
            worker_id,
            started_at,
            finished_at: Utc::now(),
            error,
        })
    }

    /// Shared running → terminal transition. Rejects with `Conflict` when
    /// the job is not currently running, so queued jobs cannot skip the
    /// claim step and terminal jobs stay terminal.
    fn finish<F>(&self, id: &str, make_state: F) -> Result<Job, CoreError>
    where
        F: FnOnce(String, DateTime<Utc>) -> JobState,
    {
        self.store.mutate(id, |job| match &job.state {
            JobState::Running {
                worker_id,
                started_at,
            } => {
                job.state = make_state(worker_id.clone(), *started_at);
                Ok(())
            }
            other => Err(CoreError::Conflict(format!(
                "job {id} is {}, expected running",
                other.status().as_str()
            ))),
        })
    }

    /// Full record for a known id.
    pub fn status(&self, id: &str) -> Result<Job, CoreError> {
        self.store.get(id).ok_or(CoreError::NotFound {
            entity: "Job",
            id: id.to_string(),
        })
    }

    /// The result reference, available only once the job is done.
    /// A known-but-unfinished job is `ResultNotReady`, distinguishable
    /// from an unknown id.
    pub fn result(&self, id: &str) -> Result<JobResult, CoreError> {
        let job = self.status(id)?;
        match job.state {
            JobState::Done { result, .. } => Ok(result),
            _ => Err(CoreError::ResultNotReady { id: id.to_string() }),
        }
    }

    /// Snapshot of every job in creation order.
    pub fn list(&self) -> Vec<Job> {
        self.store.list()
    }

    /// Evict terminal jobs that finished before `cutoff`.
    pub fn evict_terminal_before(&self, cutoff: DateTime<Utc>) -> usize {
        self.store.evict_terminal_before(cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn created_job_is_queued_with_only_creation_fields() {
        let queue = JobQueue::new();
        let job = queue.create("sunset wedding stage", None).unwrap();

        assert_eq!(job.status(), JobStatus::Queued);
        assert_eq!(job.prompt, "sunset wedding stage");
        assert_eq!(job.meta, json!({}));
        assert_matches!(job.state, JobState::Queued);
        assert_eq!(job.id.len(), 32); // uuid4 hex
    }

    #[test]
    fn empty_prompt_rejected() {
        let queue = JobQueue::new();
        assert_matches!(queue.create("", None), Err(CoreError::Validation(_)));
        assert_matches!(queue.create("   ", None), Err(CoreError::Validation(_)));
    }

    #[test]
    fn claim_transitions_exactly_one_queued_job() {
        let queue = JobQueue::new();
        let created = queue.create("first", None).unwrap();
        queue.create("second", None).unwrap();

        let claimed = queue.claim("w1").unwrap();
        assert_eq!(claimed.id, created.id);
        assert_matches!(
            &claimed.state,
            JobState::Running { worker_id, .. } if worker_id == "w1"
        );

        // The other job is untouched.
        let statuses: Vec<_> = queue.list().iter().map(|j| j.status()).collect();
        assert_eq!(statuses, vec![JobStatus::Running, JobStatus::Queued]);
    }

    #[test]
    fn claim_with_empty_queue_returns_none_without_mutation() {
        let queue = JobQueue::new();
        assert!(queue.claim("w1").is_none());

        let job = queue.create("only", None).unwrap();
        queue.claim("w1").unwrap();
        assert!(queue.claim("w2").is_none());
        assert_matches!(
            &queue.status(&job.id).unwrap().state,
            JobState::Running { worker_id, .. } if worker_id == "w1"
        );
    }

    #[test]
    fn concurrent_claims_never_hand_out_the_same_job() {
        const WORKERS: usize = 8;
        const JOBS: usize = 3;

        let queue = Arc::new(JobQueue::new());
        for i in 0..JOBS {
            queue.create(&format!("job {i}"), None).unwrap();
        }

        let handles: Vec<_> = (0..WORKERS)
            .map(|i| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || queue.claim(&format!("w{i}")))
            })
            .collect();

        let wins: Vec<Job> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();

        // Exactly JOBS claims succeed, and every winner got a distinct job.
        assert_eq!(wins.len(), JOBS);
        let ids: HashSet<_> = wins.iter().map(|j| j.id.clone()).collect();
        assert_eq!(ids.len(), JOBS);
    }

    #[test]
    fn complete_with_artifact_sets_result_and_timestamps() {
        let queue = JobQueue::new();
        let job = queue.create("stage", None).unwrap();
        queue.claim("w1").unwrap();

        let done = queue
            .complete_with_artifact(&job.id, "scene.glb")
            .unwrap();

        assert_matches!(&done.state, JobState::Done { worker_id, result, .. } => {
            assert_eq!(worker_id, "w1");
            assert_eq!(result.file.as_deref(), Some("scene.glb"));
            assert_eq!(result.url, format!("/result/{}", job.id));
        });
    }

    #[test]
    fn complete_with_url_leaves_file_unset() {
        let queue = JobQueue::new();
        let job = queue.create("stage", None).unwrap();
        queue.claim("w1").unwrap();

        let done = queue
            .complete_with_url(&job.id, "https://cdn.example.com/scene.glb")
            .unwrap();

        assert_matches!(&done.state, JobState::Done { result, .. } => {
            assert_eq!(result.file, None);
            assert_eq!(result.url, "https://cdn.example.com/scene.glb");
        });
    }

    #[test]
    fn fail_records_error_and_keeps_worker_binding() {
        let queue = JobQueue::new();
        let job = queue.create("stage", None).unwrap();
        queue.claim("w1").unwrap();

        let failed = queue.fail(&job.id, "render timeout").unwrap();

        assert_matches!(&failed.state, JobState::Failed { worker_id, error, .. } => {
            assert_eq!(worker_id, "w1");
            assert_eq!(error, "render timeout");
        });
        assert_matches!(
            queue.result(&job.id),
            Err(CoreError::ResultNotReady { .. })
        );
    }

    #[test]
    fn completing_an_unclaimed_job_is_a_conflict() {
        let queue = JobQueue::new();
        let job = queue.create("stage", None).unwrap();

        assert_matches!(
            queue.complete_with_artifact(&job.id, "scene.glb"),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(queue.fail(&job.id, "oops"), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn terminal_jobs_reject_further_transitions() {
        let queue = JobQueue::new();
        let job = queue.create("stage", None).unwrap();
        queue.claim("w1").unwrap();
        queue.complete_with_url(&job.id, "https://example.com/a.glb").unwrap();

        assert_matches!(
            queue.complete_with_url(&job.id, "https://example.com/b.glb"),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(queue.fail(&job.id, "late"), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn result_distinguishes_not_ready_from_not_found() {
        let queue = JobQueue::new();
        let job = queue.create("stage", None).unwrap();

        assert_matches!(
            queue.result(&job.id),
            Err(CoreError::ResultNotReady { .. })
        );
        assert_matches!(queue.result("missing"), Err(CoreError::NotFound { .. }));
        assert_matches!(queue.status("missing"), Err(CoreError::NotFound { .. }));
    }

    #[test]
    fn unknown_transitions_are_not_found() {
        let queue = JobQueue::new();
        assert_matches!(
            queue.complete_with_artifact("missing", "a.glb"),
            Err(CoreError::NotFound { .. })
        );
        assert_matches!(
            queue.fail("missing", "oops"),
            Err(CoreError::NotFound { .. })
        );
    }

    #[test]
    fn full_lifecycle_scenario() {
        let queue = JobQueue::new();
        let job = queue.create("sunset wedding stage", None).unwrap();
        assert_eq!(queue.status(&job.id).unwrap().status(), JobStatus::Queued);

        let claimed = queue.claim("w1").unwrap();
        assert_eq!(claimed.id, job.id);
        assert_eq!(queue.status(&job.id).unwrap().status(), JobStatus::Running);

        queue.complete_with_artifact(&job.id, "scene.glb").unwrap();
        let done = queue.status(&job.id).unwrap();
        assert_eq!(done.status(), JobStatus::Done);

        let result = queue.result(&job.id).unwrap();
        assert_eq!(result.file.as_deref(), Some("scene.glb"));
        assert!(result.url.contains(&job.id));
    }
}
