//! Runtime adapters used to drive the queue's background tasks.

pub mod tokio_spawner;

pub use tokio_spawner::TokioSpawner;
