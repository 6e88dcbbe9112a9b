//! Build a [`ResourceQueue`] from a [`QueueConfig`].

use crate::config::QueueConfig;
use crate::core::{JobProcessor, QueueError, ResourceQueue, Spawn};
use crate::runtime::TokioSpawner;

/// Build a queue on the current tokio runtime. The queue is not started.
///
/// # Errors
///
/// - [`QueueError::InvalidConfig`] if the configuration fails validation
/// - [`QueueError::Runtime`] when called outside a tokio runtime
pub fn build_queue<P, R, E>(cfg: &QueueConfig, processor: E) -> Result<ResourceQueue<P, R, E>, QueueError>
where
    P: Send + 'static,
    R: Send + 'static,
    E: JobProcessor<P, R>,
{
    let spawner = TokioSpawner::current().map_err(|e| QueueError::Runtime(e.to_string()))?;
    build_queue_with_spawner(cfg, processor, spawner)
}

/// Build a queue that spawns through `spawner`. The queue is not started.
///
/// # Errors
///
/// Returns [`QueueError::InvalidConfig`] if the configuration fails validation.
pub fn build_queue_with_spawner<P, R, E, S>(
    cfg: &QueueConfig,
    processor: E,
    spawner: S,
) -> Result<ResourceQueue<P, R, E, S>, QueueError>
where
    P: Send + 'static,
    R: Send + 'static,
    E: JobProcessor<P, R>,
    S: Spawn + Send + Sync + 'static,
{
    cfg.validate().map_err(QueueError::InvalidConfig)?;
    tracing::debug!(
        total_units = cfg.total_units,
        job_types = cfg.job_types.len(),
        "building resource queue from config"
    );
    ResourceQueue::with_spawner(cfg.total_units, cfg.job_types.clone(), processor, spawner)
}
