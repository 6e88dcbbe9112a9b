//! Processor and spawner abstractions.

use std::future::Future;

use async_trait::async_trait;

use crate::core::{JobContext, ResultSender};

/// Business logic that runs one admitted job.
///
/// The processor receives the job and a write-once [`ResultSender`], and is
/// expected to send exactly one result through it. It runs as its own task,
/// concurrently with other jobs. Cancellation is cooperative: watch
/// `job.cancel` to stop early when the queue shuts down. A processor that
/// never returns and never replies is not timed out by the queue.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use resource_queue::core::{JobContext, JobProcessor, ResultSender};
///
/// struct Completion;
///
/// #[async_trait]
/// impl JobProcessor<String, String> for Completion {
///     async fn process(&self, job: JobContext<String>, reply: ResultSender<String>) {
///         tokio::select! {
///             text = call_model(&job.payload) => { reply.finish(text); }
///             () = job.cancel.cancelled() => {}
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait JobProcessor<P, R>: Send + Sync + 'static
where
    P: Send + 'static,
    R: Send + 'static,
{
    /// Run the job and report through `reply`.
    async fn process(&self, job: JobContext<P>, reply: ResultSender<R>);
}

/// Adapter turning an async closure into a [`JobProcessor`].
#[derive(Clone)]
pub struct ProcessorFn<F>(F);

/// Wrap `f` as a processor.
pub const fn processor_fn<F>(f: F) -> ProcessorFn<F> {
    ProcessorFn(f)
}

#[async_trait]
impl<P, R, F, Fut> JobProcessor<P, R> for ProcessorFn<F>
where
    P: Send + 'static,
    R: Send + 'static,
    F: Fn(JobContext<P>, ResultSender<R>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn process(&self, job: JobContext<P>, reply: ResultSender<R>) {
        (self.0)(job, reply).await;
    }
}

/// Abstraction for spawning queue tasks on a runtime.
pub trait Spawn {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
