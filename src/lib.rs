//! # Resource Queue
//!
//! A resource-constrained concurrent job queue.
//!
//! Callers enqueue jobs tagged with a job type. Each type has a fixed cost in
//! abstract resource units (GPU slots, concurrent external API calls, ...).
//! The queue admits a job only when its cost fits in the capacity that is
//! currently free, runs admitted jobs concurrently, and hands each job's
//! result back to the caller that enqueued it.
//!
//! ## Admission
//!
//! Pending jobs are scanned in enqueue order and every job that fits is
//! started. A job that does not fit is skipped rather than blocking the jobs
//! behind it, which packs capacity tightly at the cost of strict FIFO start
//! order. A large job can starve while a steady stream of small jobs keeps
//! the capacity busy; that trade-off is intentional.
//!
//! ## Results
//!
//! [`enqueue`](core::ResourceQueue::enqueue) returns immediately with a
//! [`JobHandle`](core::JobHandle). Awaiting it yields exactly one
//! [`JobResult`](core::JobResult): the processor's output, its error, a
//! cancellation, or a shutdown preemption.
//!
//! ```rust,ignore
//! use resource_queue::core::{processor_fn, JobTypeConfig, ResourceQueue};
//!
//! let job_types = JobTypeConfig::new()
//!     .with_job_type("OpenAI", 0.0)
//!     .with_job_type("Llama3.2", 3.0);
//!
//! let queue = ResourceQueue::new(10.0, job_types, processor_fn(|job, reply| async move {
//!     reply.finish(run_completion(job.payload).await);
//! }))?;
//! queue.start()?;
//!
//! let handle = queue.enqueue("job-1", "Llama3.2", prompt)?;
//! let result = handle.await;
//!
//! queue.stop().await;
//! ```
//!
//! For complete examples, see `tests/queue_test.rs`.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions and capacity accounting.
pub mod core;
/// Configuration models for queue capacity and job types.
pub mod config;
/// Builders to construct queues from configuration.
pub mod builders;
/// Runtime adapters used to drive the queue's background tasks.
pub mod runtime;
/// Shared utilities.
pub mod util;
