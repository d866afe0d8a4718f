//! The job record and its state machine.
//!
//! Status-dependent fields live in [`JobState`] variants rather than a bag
//! of optional fields, so a `result` can only exist on a done job and an
//! `error` only on a failed one. The wire views flatten the variants back
//! into the flat record shape clients and workers expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status discriminant for a [`Job`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    /// Terminal states never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

/// Reference to a finished job's output.
///
/// `url` always carries the retrieval location: the derived
/// `/result/{id}` path when the artifact was uploaded to us (`file` set),
/// or the external URL the worker reported (`file` empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub file: Option<String>,
    pub url: String,
}

/// Status-dependent job fields.
///
/// Once a job is claimed, `worker_id` and `started_at` stay with it
/// through every later state.
#[derive(Debug, Clone)]
pub enum JobState {
    Queued,
    Running {
        worker_id: String,
        started_at: DateTime<Utc>,
    },
    Done {
        worker_id: String,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        result: JobResult,
    },
    Failed {
        worker_id: String,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        error: String,
    },
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Queued => JobStatus::Queued,
            JobState::Running { .. } => JobStatus::Running,
            JobState::Done { .. } => JobStatus::Done,
            JobState::Failed { .. } => JobStatus::Failed,
        }
    }
}

/// A tracked unit of generation work.
#[derive(Debug, Clone)]
pub struct Job {
    /// Unique for the lifetime of the process, never reused.
    pub id: String,
    /// Store-assigned creation sequence; claim scans follow it so the
    /// oldest queued job is always claimed first.
    pub seq: u64,
    pub prompt: String,
    /// Opaque creation payload. Carried to workers and the debug listing,
    /// deliberately excluded from the public status view.
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub state: JobState,
}

impl Job {
    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    /// Public view: the full record minus `meta`.
    pub fn public_view(&self) -> JobView {
        self.view(false)
    }

    /// Worker/debug view: the full record including `meta`.
    pub fn full_view(&self) -> JobView {
        self.view(true)
    }

    fn view(&self, include_meta: bool) -> JobView {
        let (worker_id, started_at, finished_at, result, error) = match &self.state {
            JobState::Queued => (None, None, None, None, None),
            JobState::Running {
                worker_id,
                started_at,
            } => (Some(worker_id.clone()), Some(*started_at), None, None, None),
            JobState::Done {
                worker_id,
                started_at,
                finished_at,
                result,
            } => (
                Some(worker_id.clone()),
                Some(*started_at),
                Some(*finished_at),
                Some(result.clone()),
                None,
            ),
            JobState::Failed {
                worker_id,
                started_at,
                finished_at,
                error,
            } => (
                Some(worker_id.clone()),
                Some(*started_at),
                Some(*finished_at),
                None,
                Some(error.clone()),
            ),
        };

        JobView {
            id: self.id.clone(),
            prompt: self.prompt.clone(),
            meta: include_meta.then(|| self.meta.clone()),
            status: self.status(),
            created_at: self.created_at,
            started_at,
            finished_at,
            worker_id,
            result,
            error,
        }
    }
}

/// Flat wire representation of a [`Job`].
///
/// Unset fields serialize as `null` (workers poll with dumb JSON parsing
/// and expect every key to be present); `meta` is the exception and is
/// omitted entirely when not included.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub worker_id: Option<String>,
    pub result: Option<JobResult>,
    pub error: Option<String>,
}
