//! Core scheduling abstractions and capacity accounting.

pub mod error;
pub mod executor;
pub mod job;
pub mod ledger;
mod pending;
pub mod queue;
pub mod registry;
pub mod status;

pub use error::{JobError, QueueError};
pub use executor::{processor_fn, JobProcessor, ProcessorFn, Spawn};
pub use job::{generate_job_id, JobContext, JobHandle, JobId, JobResult, ResultSender};
pub use ledger::ResourceLedger;
pub use queue::ResourceQueue;
pub use registry::JobTypeConfig;
pub use status::{PendingJob, QueueStatus, RunningJob};
