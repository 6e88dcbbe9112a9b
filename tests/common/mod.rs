//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use resource_queue::core::{
    processor_fn, JobContext, JobProcessor, JobTypeConfig, QueueStatus, ResultSender,
};
use tokio::sync::{mpsc, Notify};

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

/// Per-job release switches. Opening a gate before the job waits on it is fine.
#[derive(Clone, Default)]
pub struct Gates {
    inner: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
}

impl Gates {
    pub fn gate(&self, id: &str) -> Arc<Notify> {
        Arc::clone(
            self.inner
                .lock()
                .entry(id.to_owned())
                .or_insert_with(|| Arc::new(Notify::new())),
        )
    }

    pub fn open(&self, id: &str) {
        self.gate(id).notify_one();
    }
}

/// Reports every job start, then holds the job until its gate opens or the
/// queue shuts down.
#[derive(Clone)]
pub struct GatedProcessor {
    pub gates: Gates,
    started: mpsc::UnboundedSender<String>,
}

impl GatedProcessor {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (started, rx) = mpsc::unbounded_channel();
        (
            Self {
                gates: Gates::default(),
                started,
            },
            rx,
        )
    }
}

#[async_trait]
impl JobProcessor<u32, String> for GatedProcessor {
    async fn process(&self, job: JobContext<u32>, reply: ResultSender<String>) {
        let gate = self.gates.gate(&job.id);
        let _ = self.started.send(job.id.clone());
        tokio::select! {
            () = gate.notified() => {
                reply.complete(format!("{}:{}", job.id, job.payload));
            }
            () = job.cancel.cancelled() => {}
        }
    }
}

/// Sleeps for `delay`, ignoring cancellation, then completes.
pub fn sleeper(delay: Duration) -> impl JobProcessor<u32, String> + Clone {
    processor_fn(move |job: JobContext<u32>, reply: ResultSender<String>| async move {
        tokio::time::sleep(delay).await;
        reply.complete(format!("{}:{}", job.id, job.payload));
    })
}

/// Job types from the packing scenario: A=3, B=5, C=8.
pub fn packing_types() -> JobTypeConfig {
    JobTypeConfig::new()
        .with_job_type("A", 3.0)
        .with_job_type("B", 5.0)
        .with_job_type("C", 8.0)
}

/// Wait for the next job start reported by a [`GatedProcessor`].
pub async fn next_started(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for a job to start")
        .expect("processor channel closed")
}

/// Poll `cond` until it holds.
pub async fn wait_until<F: Fn() -> bool>(cond: F) {
    tokio::time::timeout(WAIT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Capacity and membership invariants every snapshot must satisfy.
pub fn assert_consistent(status: &QueueStatus) {
    assert!(status.available_units >= 0.0, "negative capacity: {status:?}");
    assert!(
        status.available_units <= status.total_units,
        "capacity above total: {status:?}"
    );
    assert!(
        status.running_units() <= status.total_units + 1e-9,
        "over-admitted: {status:?}"
    );
    assert!(
        approx_eq(status.available_units + status.running_units(), status.total_units),
        "ledger out of sync with running jobs: {status:?}"
    );
    for job in &status.running_jobs {
        assert!(!status.is_pending(&job.id), "{} both running and pending", job.id);
    }
    assert_eq!(status.queue_length, status.pending_jobs.len());
}

/// Started queue driven by a [`GatedProcessor`].
pub fn gated_queue(
    total_units: f64,
    job_types: JobTypeConfig,
) -> (
    resource_queue::core::ResourceQueue<u32, String, GatedProcessor>,
    Gates,
    mpsc::UnboundedReceiver<String>,
) {
    let (processor, started) = GatedProcessor::new();
    let gates = processor.gates.clone();
    let queue = resource_queue::core::ResourceQueue::new(total_units, job_types, processor)
        .expect("valid queue");
    queue.start().expect("queue starts");
    (queue, gates, started)
}
