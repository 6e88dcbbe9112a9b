//! Configuration models for queue capacity and job types.

pub mod queue;

pub use queue::{QueueConfig, JOB_TYPES_ENV, TOTAL_UNITS_ENV};
