//! Read-only queue snapshots for introspection.

use serde::{Deserialize, Serialize};

use crate::core::JobId;

/// A job holding capacity right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunningJob {
    /// Job identifier.
    pub id: JobId,
    /// Registered job type.
    pub job_type: String,
    /// Units reserved.
    pub units: f64,
    /// Admission time (ms since epoch).
    pub started_at_ms: u128,
}

/// A job waiting for capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingJob {
    /// Job identifier.
    pub id: JobId,
    /// Registered job type.
    pub job_type: String,
    /// Units it will reserve.
    pub units: f64,
    /// Enqueue time (ms since epoch).
    pub enqueued_at_ms: u128,
}

/// Consistent snapshot of the queue, taken under its lock.
///
/// A job id appears in at most one of `running_jobs` and `pending_jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueStatus {
    /// Maximum capacity.
    pub total_units: f64,
    /// Units not reserved by running jobs.
    pub available_units: f64,
    /// Running jobs, oldest admission first.
    pub running_jobs: Vec<RunningJob>,
    /// Pending jobs in enqueue order.
    pub pending_jobs: Vec<PendingJob>,
    /// Number of pending jobs.
    pub queue_length: usize,
}

impl QueueStatus {
    /// Units reserved by the running jobs listed in this snapshot.
    #[must_use]
    pub fn running_units(&self) -> f64 {
        self.running_jobs.iter().map(|job| job.units).sum()
    }

    /// Whether `id` is in the running list.
    #[must_use]
    pub fn is_running(&self, id: &str) -> bool {
        self.running_jobs.iter().any(|job| job.id == id)
    }

    /// Whether `id` is in the pending list.
    #[must_use]
    pub fn is_pending(&self, id: &str) -> bool {
        self.pending_jobs.iter().any(|job| job.id == id)
    }

    /// True when nothing is running or waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.running_jobs.is_empty() && self.pending_jobs.is_empty()
    }
}
