//! In-memory job record store with per-job event broadcast.
//!
//! Every job entry pairs its record with the `broadcast::Sender` feeding
//! that job's SSE subscribers, and every mutation appends and publishes
//! while holding the record lock. That single critical section is what
//! gives subscribers the replay-then-live guarantee: `subscribe` registers
//! the receiver and snapshots history under the same lock, so no event can
//! fall between the snapshot and the first live delivery, and none is seen
//! twice.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use ringsight_types::{
    AnalysisStage, DetectionReport, JobFailure, JobId, JobStatus, ProgressEvent,
};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

/// Capacity of each job's broadcast ring. A subscriber that falls this far
/// behind is lagged out and has to reconnect and replay.
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum JobStoreError {
    #[error("job {0} already exists")]
    AlreadyExists(JobId),

    #[error("job {0} not found")]
    NotFound(JobId),

    #[error("job {0} is already terminal")]
    AlreadyTerminal(JobId),
}

/// Canonical state of one analysis job.
///
/// Exactly one of `result` / `error` is set once the job is terminal;
/// neither is set before that. `events` is append-only and its order is the
/// replay order.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    pub events: Vec<ProgressEvent>,
    pub result: Option<DetectionReport>,
    pub error: Option<JobFailure>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            status: JobStatus::Pending,
            progress: 0,
            events: Vec::new(),
            result: None,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }
}

/// Compact view of a job for the listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub job_id: JobId,
    pub status: JobStatus,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
}

struct JobEntry {
    record: Mutex<JobRecord>,
    events_tx: broadcast::Sender<ProgressEvent>,
}

impl JobEntry {
    /// Mutations never panic while holding the lock, so a poisoned record
    /// is still consistent; recover it rather than wedging the job.
    fn lock(&self) -> MutexGuard<'_, JobRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keyed store of all jobs in this process. Mutations on one job serialize
/// on that job's lock; different jobs never contend with each other.
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, Arc<JobEntry>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    fn entry(&self, id: &str) -> Option<Arc<JobEntry>> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Insert a new job in `Pending` with no history.
    pub fn create(&self, id: &str) -> Result<(), JobStoreError> {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        if jobs.contains_key(id) {
            return Err(JobStoreError::AlreadyExists(id.to_string()));
        }
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        jobs.insert(
            id.to_string(),
            Arc::new(JobEntry {
                record: Mutex::new(JobRecord::new(id)),
                events_tx,
            }),
        );
        Ok(())
    }

    /// Read-only snapshot of a job's current state.
    pub fn snapshot(&self, id: &str) -> Option<JobRecord> {
        self.entry(id).map(|entry| entry.lock().clone())
    }

    /// Append a stage event and publish it to subscribers, flipping
    /// `Pending -> Processing` on the first one. Progress only moves
    /// forward: an event carrying a smaller value is appended but does not
    /// lower the job's progress.
    pub fn append_event(&self, id: &str, event: ProgressEvent) -> Result<(), JobStoreError> {
        let entry = self
            .entry(id)
            .ok_or_else(|| JobStoreError::NotFound(id.to_string()))?;
        let mut record = entry.lock();
        if record.status.is_terminal() {
            return Err(JobStoreError::AlreadyTerminal(id.to_string()));
        }
        if record.status == JobStatus::Pending {
            record.status = JobStatus::Processing;
        }
        if event.progress >= record.progress {
            record.progress = event.progress;
        }
        record.events.push(event.clone());
        // No receivers is fine; send only fails then.
        let _ = entry.events_tx.send(event);
        Ok(())
    }

    /// Transition to `Completed`: store the report, pin progress to 100 and
    /// append + publish the terminal `DONE` event, all in one critical
    /// section.
    pub fn complete(&self, id: &str, report: DetectionReport) -> Result<(), JobStoreError> {
        let entry = self
            .entry(id)
            .ok_or_else(|| JobStoreError::NotFound(id.to_string()))?;
        let mut record = entry.lock();
        if record.status.is_terminal() {
            return Err(JobStoreError::AlreadyTerminal(id.to_string()));
        }
        record.status = JobStatus::Completed;
        record.progress = 100;
        record.result = Some(report);
        record.finished_at = Some(Utc::now());
        let event = ProgressEvent::checkpoint(AnalysisStage::Done, "Analysis complete");
        record.events.push(event.clone());
        let _ = entry.events_tx.send(event);
        Ok(())
    }

    /// Transition to `Failed`. The terminal `ERROR` event carries the
    /// job's last-known progress — observers are never told the job went
    /// backwards.
    pub fn fail(&self, id: &str, failure: JobFailure) -> Result<(), JobStoreError> {
        let entry = self
            .entry(id)
            .ok_or_else(|| JobStoreError::NotFound(id.to_string()))?;
        let mut record = entry.lock();
        if record.status.is_terminal() {
            return Err(JobStoreError::AlreadyTerminal(id.to_string()));
        }
        record.status = JobStatus::Failed;
        record.finished_at = Some(Utc::now());
        let event = ProgressEvent::failure(failure.message.clone(), record.progress);
        record.error = Some(failure);
        record.events.push(event.clone());
        let _ = entry.events_tx.send(event);
        Ok(())
    }

    /// Attach to a job's event stream: the history to replay plus a
    /// receiver for everything published after it. Taken inside the record
    /// lock, so the seam between the two is gap-free and duplicate-free.
    pub fn subscribe(
        &self,
        id: &str,
    ) -> Option<(Vec<ProgressEvent>, broadcast::Receiver<ProgressEvent>)> {
        let entry = self.entry(id)?;
        let record = entry.lock();
        let rx = entry.events_tx.subscribe();
        Some((record.events.clone(), rx))
    }

    /// Snapshot of all non-terminal jobs.
    pub fn active_jobs(&self) -> Vec<JobSummary> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter_map(|entry| {
                let record = entry.lock();
                (!record.status.is_terminal()).then(|| JobSummary {
                    job_id: record.id.clone(),
                    status: record.status,
                    progress: record.progress,
                    created_at: record.created_at,
                })
            })
            .collect()
    }

    /// Evict terminal jobs whose retention window has elapsed. Memory
    /// bounding only — a swept job simply reads as not-found afterwards.
    pub fn sweep_expired(&self, retention: Duration) -> usize {
        let Ok(retention) = chrono::Duration::from_std(retention) else {
            return 0;
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(retention) else {
            return 0;
        };
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let before = jobs.len();
        jobs.retain(|_, entry| {
            let record = entry.lock();
            match record.finished_at {
                Some(finished) if record.status.is_terminal() => finished > cutoff,
                _ => true,
            }
        });
        before - jobs.len()
    }

    pub fn len(&self) -> usize {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}
