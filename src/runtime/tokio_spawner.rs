//! Tokio runtime spawner implementation.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::{Handle, Runtime};

use crate::core::Spawn;

/// Tokio-based spawner that runs queue tasks on a tokio runtime.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: Handle,
    /// Present when this spawner owns a dedicated runtime.
    runtime: Option<Arc<Runtime>>,
}

impl TokioSpawner {
    /// Spawn onto the runtime behind `handle`.
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self {
            handle,
            runtime: None,
        }
    }

    /// Spawn onto the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Fails when called outside a tokio runtime.
    pub fn current() -> Result<Self, tokio::runtime::TryCurrentError> {
        Handle::try_current().map(Self::new)
    }

    /// Own a new multi-threaded runtime with `worker_threads` workers.
    ///
    /// The runtime lives as long as the last clone of this spawner. Drop it
    /// from synchronous code; tokio refuses to drop a runtime from within an
    /// async context. A started queue holds a clone in its admission loop
    /// until `stop` completes, so a queue dropped without stopping keeps
    /// this runtime alive.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while building the runtime.
    pub fn with_worker_threads(worker_threads: usize) -> Result<Self, std::io::Error> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(worker_threads)
            .thread_name("resource-queue")
            .enable_all()
            .build()?;
        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(Arc::new(runtime)),
        })
    }

    /// Handle of the runtime tasks are spawned on.
    #[must_use]
    pub const fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Whether this spawner owns its runtime.
    #[must_use]
    pub const fn owns_runtime(&self) -> bool {
        self.runtime.is_some()
    }

    /// Drive `fut` to completion from synchronous code.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context.
    pub fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.handle.block_on(fut)
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut);
    }
}
