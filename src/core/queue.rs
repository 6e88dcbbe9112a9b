//! Resource queue: admission control, job execution, and shutdown.
//!
//! One `parking_lot::Mutex` guards the ledger, the pending queue, and the
//! running set. It is never held across an `.await` or a call into the
//! processor. A background admission loop waits on a single-slot
//! [`Notify`] that enqueues and releases raise, and re-scans the pending
//! queue each time it wakes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{oneshot, Notify};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::core::job::Job;
use crate::core::pending::PendingQueue;
use crate::core::{
    JobContext, JobError, JobHandle, JobId, JobProcessor, JobResult, JobTypeConfig, PendingJob,
    QueueError, QueueStatus, ResourceLedger, ResultSender, RunningJob, Spawn,
};
use crate::runtime::TokioSpawner;
use crate::util::clock::now_ms;

/// Lifecycle of the queue as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Started,
    Stopped,
}

/// Bookkeeping for a job between admission and release.
struct RunningEntry {
    job_type: String,
    units: f64,
    started_at_ms: u128,
}

/// Everything guarded by the queue lock.
struct QueueState<P, R> {
    ledger: ResourceLedger,
    pending: PendingQueue<P, R>,
    running: HashMap<JobId, RunningEntry>,
    lifecycle: Lifecycle,
}

struct Shared<P, R, E, S> {
    total_units: f64,
    state: Mutex<QueueState<P, R>>,
    registry: RwLock<JobTypeConfig>,
    wake: Notify,
    shutdown: CancellationToken,
    tracker: TaskTracker,
    processor: Arc<E>,
    spawner: S,
}

/// Resource-constrained concurrent job queue.
///
/// Jobs are tagged with a registered job type whose unit cost must fit in
/// the queue's free capacity before the job may run. Admission scans pending
/// jobs in FIFO order and starts every one that fits, so a small job can
/// overtake a large one that is waiting for capacity.
///
/// The handle is cheap to clone; all clones drive the same queue. Dropping
/// the handles does not stop the background loop; call [`Self::stop`].
/// Until then the loop keeps the queue's spawner alive, including a runtime
/// owned through [`TokioSpawner::with_worker_threads`].
pub struct ResourceQueue<P, R, E, S = TokioSpawner> {
    shared: Arc<Shared<P, R, E, S>>,
}

impl<P, R, E, S> Clone for ResourceQueue<P, R, E, S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P, R, E> ResourceQueue<P, R, E, TokioSpawner>
where
    P: Send + 'static,
    R: Send + 'static,
    E: JobProcessor<P, R>,
{
    /// Create a queue on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`QueueError::InvalidConfig`] if `total_units` is not a positive
    ///   finite number
    /// - [`QueueError::InvalidUnits`] if a registered cost is invalid
    /// - [`QueueError::Runtime`] when called outside a tokio runtime
    pub fn new(total_units: f64, job_types: JobTypeConfig, processor: E) -> Result<Self, QueueError> {
        let spawner = TokioSpawner::current().map_err(|e| QueueError::Runtime(e.to_string()))?;
        Self::with_spawner(total_units, job_types, processor, spawner)
    }
}

impl<P, R, E, S> ResourceQueue<P, R, E, S>
where
    P: Send + 'static,
    R: Send + 'static,
    E: JobProcessor<P, R>,
    S: Spawn + Send + Sync + 'static,
{
    /// Create a queue that spawns its tasks through `spawner`.
    ///
    /// # Errors
    ///
    /// Same validation as [`ResourceQueue::new`], minus the runtime lookup.
    pub fn with_spawner(
        total_units: f64,
        job_types: JobTypeConfig,
        processor: E,
        spawner: S,
    ) -> Result<Self, QueueError> {
        if !(total_units.is_finite() && total_units > 0.0) {
            return Err(QueueError::InvalidConfig(format!(
                "total_units must be a positive finite number, got {total_units}"
            )));
        }
        job_types.validate()?;

        Ok(Self {
            shared: Arc::new(Shared {
                total_units,
                state: Mutex::new(QueueState {
                    ledger: ResourceLedger::new(total_units),
                    pending: PendingQueue::new(),
                    running: HashMap::new(),
                    lifecycle: Lifecycle::Idle,
                }),
                registry: RwLock::new(job_types),
                wake: Notify::new(),
                shutdown: CancellationToken::new(),
                tracker: TaskTracker::new(),
                processor: Arc::new(processor),
                spawner,
            }),
        })
    }

    /// Register or overwrite a job type's cost.
    ///
    /// Costs are resolved at enqueue time, so jobs already accepted keep the
    /// cost they were enqueued with.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::InvalidUnits`] for negative or non-finite units.
    pub fn set_job_type_units(&self, job_type: impl Into<String>, units: f64) -> Result<(), QueueError> {
        self.shared.registry.write().set_job_type_units(job_type, units)
    }

    /// Registered cost of `job_type`.
    #[must_use]
    pub fn job_type_units(&self, job_type: &str) -> Option<f64> {
        self.shared.registry.read().job_type_units(job_type)
    }

    /// Maximum capacity.
    #[must_use]
    pub fn total_units(&self) -> f64 {
        self.shared.total_units
    }

    /// Units currently free.
    #[must_use]
    pub fn available_units(&self) -> f64 {
        self.shared.state.lock().ledger.available_units()
    }

    /// Number of jobs waiting for capacity.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// Number of jobs holding capacity.
    #[must_use]
    pub fn running_len(&self) -> usize {
        self.shared.state.lock().running.len()
    }

    /// Whether `stop` has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.state.lock().lifecycle == Lifecycle::Stopped
    }

    /// Start the background admission loop.
    ///
    /// Jobs enqueued before this call wait in the pending queue and are
    /// considered as soon as the loop runs.
    ///
    /// # Errors
    ///
    /// - [`QueueError::AlreadyStarted`] if called twice
    /// - [`QueueError::Stopped`] if the queue was stopped
    pub fn start(&self) -> Result<(), QueueError> {
        let admission_loop = {
            let mut state = self.shared.state.lock();
            match state.lifecycle {
                Lifecycle::Started => return Err(QueueError::AlreadyStarted),
                Lifecycle::Stopped => return Err(QueueError::Stopped),
                Lifecycle::Idle => state.lifecycle = Lifecycle::Started,
            }
            // Tracked under the lock so a concurrent stop() waits for it.
            self.shared
                .tracker
                .track_future(Shared::admission_loop(Arc::clone(&self.shared)))
        };
        self.shared.spawner.spawn(admission_loop);
        self.shared.wake.notify_one();
        info!(total_units = self.shared.total_units, "resource queue started");
        Ok(())
    }

    /// Accept a job and return the handle its result will arrive on.
    ///
    /// Never waits for capacity; the job is queued and admitted later.
    ///
    /// # Errors
    ///
    /// - [`QueueError::UnknownJobType`] if `job_type` is not registered
    /// - [`QueueError::CapacityExceeded`] if its cost exceeds total capacity
    /// - [`QueueError::DuplicateJobId`] if `id` is pending or running
    /// - [`QueueError::Stopped`] once the queue has been stopped
    pub fn enqueue(
        &self,
        id: impl Into<JobId>,
        job_type: &str,
        payload: P,
    ) -> Result<JobHandle<R>, QueueError> {
        let id = id.into();
        let units = self
            .job_type_units(job_type)
            .ok_or_else(|| QueueError::UnknownJobType(job_type.to_owned()))?;

        let total = self.shared.total_units;
        if units > total {
            warn!(job_id = %id, job_type, units, total, "job rejected: exceeds total capacity");
            return Err(QueueError::CapacityExceeded {
                job_type: job_type.to_owned(),
                required: units,
                total,
            });
        }

        let (sink, rx) = oneshot::channel();
        {
            let mut state = self.shared.state.lock();
            if state.lifecycle == Lifecycle::Stopped {
                return Err(QueueError::Stopped);
            }
            if state.running.contains_key(&id) || state.pending.contains(&id) {
                return Err(QueueError::DuplicateJobId(id));
            }
            state.pending.push_back(Job {
                id: id.clone(),
                job_type: job_type.to_owned(),
                payload,
                units,
                enqueued_at_ms: now_ms(),
                sink,
            });
            debug!(job_id = %id, job_type, units, pending = state.pending.len(), "job enqueued");
        }

        self.shared.wake.notify_one();
        Ok(JobHandle::new(id, rx))
    }

    /// Cancel a job that has not started yet.
    ///
    /// The job's handle resolves with [`JobError::Cancelled`]. Returns false
    /// if the job is running, finished, or unknown; running jobs can only be
    /// cancelled by stopping the queue.
    pub fn cancel_job(&self, id: &str) -> bool {
        let removed = self.shared.state.lock().pending.remove(id);
        let Some(job) = removed else {
            return false;
        };
        info!(job_id = %job.id, job_type = %job.job_type, "pending job cancelled");
        job.resolve(JobError::Cancelled);
        true
    }

    /// Consistent snapshot of capacity, running jobs, and pending jobs.
    #[must_use]
    pub fn status(&self) -> QueueStatus {
        let (available_units, mut running_jobs, pending_jobs) = {
            let state = self.shared.state.lock();
            let running: Vec<RunningJob> = state
                .running
                .iter()
                .map(|(id, entry)| RunningJob {
                    id: id.clone(),
                    job_type: entry.job_type.clone(),
                    units: entry.units,
                    started_at_ms: entry.started_at_ms,
                })
                .collect();
            let pending: Vec<PendingJob> = state
                .pending
                .iter()
                .map(|job| PendingJob {
                    id: job.id.clone(),
                    job_type: job.job_type.clone(),
                    units: job.units,
                    enqueued_at_ms: job.enqueued_at_ms,
                })
                .collect();
            (state.ledger.available_units(), running, pending)
        };
        running_jobs.sort_by(|a, b| {
            a.started_at_ms
                .cmp(&b.started_at_ms)
                .then_with(|| a.id.cmp(&b.id))
        });

        QueueStatus {
            total_units: self.shared.total_units,
            available_units,
            queue_length: pending_jobs.len(),
            running_jobs,
            pending_jobs,
        }
    }

    /// Stop the queue and wait for its tasks to exit.
    ///
    /// Cancels every running job's scope, resolves still-pending jobs with
    /// [`JobError::ShuttingDown`], and returns once the admission loop and
    /// all executors have finished and released their units. Processors are
    /// not killed; one that ignores cancellation keeps running detached,
    /// but its job has already been resolved. Calling `stop` again is a
    /// no-op apart from waiting.
    pub async fn stop(&self) {
        let abandoned = {
            let mut state = self.shared.state.lock();
            if state.lifecycle != Lifecycle::Stopped {
                info!(
                    running = state.running.len(),
                    pending = state.pending.len(),
                    "stopping resource queue"
                );
                state.lifecycle = Lifecycle::Stopped;
            }
            self.shared.shutdown.cancel();
            state.pending.drain()
        };
        for job in abandoned {
            debug!(job_id = %job.id, "pending job dropped by shutdown");
            job.resolve(JobError::ShuttingDown);
        }

        self.shared.tracker.close();
        self.shared.tracker.wait().await;
        info!("resource queue stopped");
    }
}

impl<P, R, E, S> Shared<P, R, E, S>
where
    P: Send + 'static,
    R: Send + 'static,
    E: JobProcessor<P, R>,
    S: Spawn + Send + Sync + 'static,
{
    async fn admission_loop(self: Arc<Self>) {
        debug!("admission loop running");
        loop {
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                () = self.wake.notified() => self.admit(),
            }
        }
        debug!("admission loop exiting");
    }

    /// Start every pending job that fits.
    fn admit(self: &Arc<Self>) {
        let dispatched = {
            let mut guard = self.state.lock();
            if self.shutdown.is_cancelled() {
                return;
            }
            let state = &mut *guard;
            let admitted = state.pending.admit(&mut state.ledger);
            if admitted.is_empty() {
                return;
            }

            let started_at_ms = now_ms();
            let mut dispatched = Vec::with_capacity(admitted.len());
            for job in admitted {
                state.running.insert(
                    job.id.clone(),
                    RunningEntry {
                        job_type: job.job_type.clone(),
                        units: job.units,
                        started_at_ms,
                    },
                );
                info!(
                    job_id = %job.id,
                    job_type = %job.job_type,
                    units = job.units,
                    available = state.ledger.available_units(),
                    "job admitted"
                );
                // Tracked under the lock so a concurrent stop() waits for it.
                dispatched.push(
                    self.tracker
                        .track_future(Self::execute(Arc::clone(self), job, started_at_ms)),
                );
            }
            dispatched
        };

        for executor in dispatched {
            self.spawner.spawn(executor);
        }
    }

    /// Run one admitted job and deliver its result.
    async fn execute(self: Arc<Self>, job: Job<P, R>, started_at_ms: u128) {
        let Job {
            id,
            job_type,
            payload,
            units,
            enqueued_at_ms,
            sink,
        } = job;

        let cancel = self.shutdown.child_token();
        if cancel.is_cancelled() {
            // stop() landed between admission and this task's first poll.
            debug!(job_id = %id, "admitted job preempted before its processor started");
            let result = JobResult::from_error(id.clone(), JobError::ShuttingDown, started_at_ms, now_ms());
            self.release(&id, units);
            Self::deliver(&id, sink, result);
            return;
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let context = JobContext {
            id: id.clone(),
            job_type,
            units,
            enqueued_at_ms,
            started_at_ms,
            payload,
            cancel: cancel.clone(),
        };
        let reply = ResultSender::new(id.clone(), started_at_ms, reply_tx);
        let processor = Arc::clone(&self.processor);
        self.spawner.spawn(async move {
            processor.process(context, reply).await;
        });

        let result = tokio::select! {
            biased;
            reply = reply_rx => match reply {
                Ok(result) => result,
                // A cooperative processor may drop its sender as soon as it sees the cancel.
                Err(_) if cancel.is_cancelled() => {
                    JobResult::from_error(id.clone(), JobError::ShuttingDown, started_at_ms, now_ms())
                }
                Err(_) => {
                    warn!(job_id = %id, "processor returned without a result");
                    JobResult::from_error(id.clone(), JobError::NoResult, started_at_ms, now_ms())
                }
            },
            () = cancel.cancelled() => {
                debug!(job_id = %id, "running job preempted by shutdown");
                JobResult::from_error(id.clone(), JobError::ShuttingDown, started_at_ms, now_ms())
            }
        };

        // A delivered job is never in the running set.
        self.release(&id, units);
        Self::deliver(&id, sink, result);
    }

    fn deliver(id: &str, sink: oneshot::Sender<JobResult<R>>, result: JobResult<R>) {
        if sink.send(result).is_err() {
            debug!(job_id = id, "caller dropped its handle; result discarded");
        }
    }

    /// Return a finished job's units and wake the admission loop.
    fn release(&self, id: &str, units: f64) {
        {
            let mut state = self.state.lock();
            state.running.remove(id);
            state.ledger.release(units);
            if state.running.is_empty() {
                state.ledger.reset();
            }
            debug!(
                job_id = id,
                units,
                available = state.ledger.available_units(),
                "job finished; units released"
            );
        }
        self.wake.notify_one();
    }
}
