//! Jobs, their results, and the one-shot channel between executor and caller.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::core::JobError;
use crate::util::clock::now_ms;

/// Caller-assigned job identifier, unique among pending and running jobs.
pub type JobId = String;

/// Generate a random job id for callers that have no natural key.
#[must_use]
pub fn generate_job_id() -> JobId {
    uuid::Uuid::new_v4().to_string()
}

/// A job owned by the queue while pending, then handed to its executor.
pub(crate) struct Job<P, R> {
    pub(crate) id: JobId,
    pub(crate) job_type: String,
    pub(crate) payload: P,
    pub(crate) units: f64,
    pub(crate) enqueued_at_ms: u128,
    pub(crate) sink: oneshot::Sender<JobResult<R>>,
}

impl<P, R> Job<P, R> {
    /// Resolve the job without running it. The caller may already be gone.
    pub(crate) fn resolve(self, error: JobError) {
        let now = now_ms();
        let _ = self
            .sink
            .send(JobResult::from_error(self.id, error, now, now));
    }
}

/// Everything a processor gets to see about the job it runs.
#[derive(Debug)]
pub struct JobContext<P> {
    /// Job identifier.
    pub id: JobId,
    /// Registered job type.
    pub job_type: String,
    /// Units reserved for this job.
    pub units: f64,
    /// When the job entered the queue (ms since epoch).
    pub enqueued_at_ms: u128,
    /// When the job was admitted (ms since epoch).
    pub started_at_ms: u128,
    /// Caller-supplied payload.
    pub payload: P,
    /// Cancelled when the queue shuts down.
    pub cancel: CancellationToken,
}

impl<P> JobContext<P> {
    /// Whether the queue has asked this job to stop.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Outcome of one job. Exactly one is produced per accepted job.
#[derive(Debug)]
pub struct JobResult<R> {
    /// Job identifier.
    pub id: JobId,
    /// Processor output or the reason there is none.
    pub outcome: Result<R, JobError>,
    /// Start timestamp (ms since epoch).
    pub started_at_ms: u128,
    /// End timestamp (ms since epoch).
    pub ended_at_ms: u128,
}

impl<R> JobResult<R> {
    /// Build a successful result.
    pub fn success(id: impl Into<JobId>, output: R, started_at_ms: u128, ended_at_ms: u128) -> Self {
        Self {
            id: id.into(),
            outcome: Ok(output),
            started_at_ms,
            ended_at_ms,
        }
    }

    /// Build a failed result.
    pub fn from_error(
        id: impl Into<JobId>,
        error: JobError,
        started_at_ms: u128,
        ended_at_ms: u128,
    ) -> Self {
        Self {
            id: id.into(),
            outcome: Err(error),
            started_at_ms,
            ended_at_ms,
        }
    }

    /// True if the processor produced an output.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// True if the job was cancelled or preempted by shutdown.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.error().is_some_and(JobError::is_cancellation)
    }

    /// Borrow the output, if any.
    #[must_use]
    pub fn output(&self) -> Option<&R> {
        self.outcome.as_ref().ok()
    }

    /// Borrow the error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&JobError> {
        self.outcome.as_ref().err()
    }

    /// Consume the result, keeping only the outcome.
    ///
    /// # Errors
    ///
    /// Returns the job's error if it did not complete successfully.
    pub fn into_output(self) -> Result<R, JobError> {
        self.outcome
    }

    /// Wall time between start and end.
    #[must_use]
    pub const fn duration_ms(&self) -> u128 {
        self.ended_at_ms.saturating_sub(self.started_at_ms)
    }
}

/// Write-once channel a processor uses to report its job's result.
///
/// Dropping it without sending resolves the job with [`JobError::NoResult`].
#[derive(Debug)]
pub struct ResultSender<R> {
    id: JobId,
    started_at_ms: u128,
    tx: oneshot::Sender<JobResult<R>>,
}

impl<R> ResultSender<R> {
    pub(crate) const fn new(id: JobId, started_at_ms: u128, tx: oneshot::Sender<JobResult<R>>) -> Self {
        Self {
            id,
            started_at_ms,
            tx,
        }
    }

    /// Id of the job this sender belongs to.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Send a fully built result. Its id is forced to this job's id.
    ///
    /// Returns false if the executor stopped listening, which happens once
    /// the queue has shut down.
    pub fn send(self, mut result: JobResult<R>) -> bool {
        result.id = self.id;
        self.tx.send(result).is_ok()
    }

    /// Report a successful output, timed from admission to now.
    pub fn complete(self, output: R) -> bool {
        let result = JobResult::success(self.id.clone(), output, self.started_at_ms, now_ms());
        self.send(result)
    }

    /// Report a processor failure, timed from admission to now.
    pub fn fail(self, error: impl Into<anyhow::Error>) -> bool {
        let result = JobResult::from_error(
            self.id.clone(),
            JobError::Failed(error.into()),
            self.started_at_ms,
            now_ms(),
        );
        self.send(result)
    }

    /// Report either outcome of a fallible computation.
    pub fn finish(self, outcome: Result<R, anyhow::Error>) -> bool {
        match outcome {
            Ok(output) => self.complete(output),
            Err(error) => self.fail(error),
        }
    }
}

/// The caller's side of a job: resolves to its [`JobResult`].
///
/// Awaiting the handle suspends until the result arrives. Dropping it is
/// allowed; the job still runs and its result is discarded.
#[derive(Debug)]
pub struct JobHandle<R> {
    id: JobId,
    rx: oneshot::Receiver<JobResult<R>>,
}

impl<R> JobHandle<R> {
    pub(crate) const fn new(id: JobId, rx: oneshot::Receiver<JobResult<R>>) -> Self {
        Self { id, rx }
    }

    /// Id of the job.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the result.
    pub async fn wait(self) -> JobResult<R> {
        self.await
    }

    /// Wait at most `timeout`. On expiry the handle is returned so the
    /// caller can keep waiting or cancel the job.
    ///
    /// # Errors
    ///
    /// Returns the handle itself if the timeout elapsed first.
    pub async fn wait_timeout(mut self, timeout: Duration) -> Result<JobResult<R>, Self> {
        let waited = tokio::time::timeout(timeout, &mut self).await;
        match waited {
            Ok(result) => Ok(result),
            Err(_) => Err(self),
        }
    }

    /// Take the result if it is already available.
    pub fn try_result(&mut self) -> Option<JobResult<R>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(self.lost()),
        }
    }

    fn lost(&self) -> JobResult<R> {
        let now = now_ms();
        JobResult::from_error(self.id.clone(), JobError::NoResult, now, now)
    }
}

impl<R> Future for JobHandle<R> {
    type Output = JobResult<R>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            // The sender only disappears unsent if the runtime tore the executor down.
            Poll::Ready(Err(_)) => Poll::Ready(this.lost()),
            Poll::Pending => Poll::Pending,
        }
    }
}
