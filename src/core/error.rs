//! Error types for queue operations and job outcomes.

use thiserror::Error;

use crate::core::job::JobId;

/// Errors returned synchronously by queue operations.
///
/// Everything that can be detected before a job occupies capacity surfaces
/// here; failures after a job starts travel through its [`JobResult`]
/// instead.
///
/// [`JobResult`]: crate::core::JobResult
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueueError {
    /// The job type has no registered unit cost.
    #[error("unknown job type: {0}")]
    UnknownJobType(String),
    /// The job type costs more than the queue could ever provide.
    #[error("job type `{job_type}` requires {required:.2} units, which exceeds maximum capacity of {total:.2}")]
    CapacityExceeded {
        /// Job type being enqueued.
        job_type: String,
        /// Units that type requires.
        required: f64,
        /// Total units of the queue.
        total: f64,
    },
    /// Another pending or running job already uses this id.
    #[error("job id already pending or running: {0}")]
    DuplicateJobId(JobId),
    /// Unit costs must be finite and non-negative.
    #[error("invalid unit cost {units} for job type `{job_type}`")]
    InvalidUnits {
        /// Job type being registered.
        job_type: String,
        /// Rejected unit value.
        units: f64,
    },
    /// `start` was called on a queue that is already running.
    #[error("queue already started")]
    AlreadyStarted,
    /// The queue has been stopped and accepts no further work.
    #[error("queue stopped")]
    Stopped,
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// No tokio runtime was available to drive the queue.
    #[error("runtime unavailable: {0}")]
    Runtime(String),
}

/// Errors delivered inside a [`JobResult`](crate::core::JobResult).
#[derive(Debug, Error)]
pub enum JobError {
    /// The job was cancelled while still pending.
    #[error("job cancelled")]
    Cancelled,
    /// The queue stopped before the job could finish.
    #[error("job cancelled due to queue shutdown")]
    ShuttingDown,
    /// The processor dropped its result sender without replying.
    #[error("processor finished without producing a result")]
    NoResult,
    /// The processor reported a failure; passed through unchanged.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl JobError {
    /// True for the two cancellation outcomes.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::ShuttingDown)
    }
}
