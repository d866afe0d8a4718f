//! In-memory job store.
//!
//! Owns the id → job map and the single mutex guarding it. Reads hand out
//! snapshot copies and every write goes through the lock, so callers can
//! never mutate a record outside it. The lock is held for map access only,
//! never across I/O.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::job::{Job, JobState};

#[derive(Default)]
pub struct JobStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    jobs: HashMap<String, Job>,
    next_seq: u64,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly created job, assigning its creation sequence, and
    /// return the stored snapshot.
    ///
    /// Fails with `Conflict` if the id is already present. Ids are
    /// generated, so this is a defensive invariant rather than an
    /// expected code path.
    pub fn insert(&self, mut job: Job) -> Result<Job, CoreError> {
        let mut inner = self.lock();
        if inner.jobs.contains_key(&job.id) {
            return Err(CoreError::Conflict(format!(
                "job id {} already exists",
                job.id
            )));
        }
        job.seq = inner.next_seq;
        inner.next_seq += 1;
        let snapshot = job.clone();
        inner.jobs.insert(job.id.clone(), job);
        Ok(snapshot)
    }

    /// Snapshot of a single job.
    pub fn get(&self, id: &str) -> Option<Job> {
        self.lock().jobs.get(id).cloned()
    }

    /// Apply a fallible transition to a job under the lock, returning the
    /// updated snapshot. `NotFound` if the id is absent; a transition
    /// error leaves the record untouched.
    pub fn mutate<F>(&self, id: &str, f: F) -> Result<Job, CoreError>
    where
        F: FnOnce(&mut Job) -> Result<(), CoreError>,
    {
        let mut inner = self.lock();
        let job = inner.jobs.get_mut(id).ok_or(CoreError::NotFound {
            entity: "Job",
            id: id.to_string(),
        })?;
        // Transition a scratch copy and commit only on success, so a
        // rejecting transition cannot leave a half-mutated record.
        let mut updated = job.clone();
        f(&mut updated)?;
        *job = updated;
        Ok(job.clone())
    }

    /// Under a single lock acquisition, find the first job in creation
    /// order satisfying `predicate`, apply `transition` to it, and return
    /// the updated snapshot. `None` when nothing matches.
    ///
    /// The single acquisition is what makes a claim race-free: two
    /// concurrent callers serialize here, and the loser's scan no longer
    /// sees the job the winner transitioned.
    pub fn scan_claim<P, T>(&self, predicate: P, transition: T) -> Option<Job>
    where
        P: Fn(&Job) -> bool,
        T: FnOnce(&mut Job),
    {
        let mut inner = self.lock();
        let id = inner
            .jobs
            .values()
            .filter(|job| predicate(job))
            .min_by_key(|job| job.seq)?
            .id
            .clone();
        let job = inner
            .jobs
            .get_mut(&id)
            .expect("id observed under the same lock");
        transition(job);
        Some(job.clone())
    }

    /// Snapshot of all jobs in creation order.
    pub fn list(&self) -> Vec<Job> {
        let inner = self.lock();
        let mut jobs: Vec<Job> = inner.jobs.values().cloned().collect();
        jobs.sort_by_key(|job| job.seq);
        jobs
    }

    /// Remove done/failed jobs that finished before `cutoff`. Queued and
    /// running jobs are never touched. Returns the eviction count.
    pub fn evict_terminal_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut inner = self.lock();
        let before = inner.jobs.len();
        inner.jobs.retain(|_, job| match &job.state {
            JobState::Done { finished_at, .. } | JobState::Failed { finished_at, .. } => {
                *finished_at >= cutoff
            }
            _ => true,
        });
        before - inner.jobs.len()
    }

    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Poisoning only happens after a panic while holding the lock;
        // at that point the process is already unwinding.
        self.inner.lock().expect("job store lock poisoned")
    }
}
