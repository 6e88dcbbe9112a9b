//! Tests for tokio spawner utilities

use resource_queue::core::{processor_fn, JobContext, JobTypeConfig, QueueError, ResourceQueue, ResultSender, Spawn};
use resource_queue::runtime::tokio_spawner::TokioSpawner;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());
    assert!(!spawner.owns_runtime());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_tokio_spawner_current_outside_runtime() {
    assert!(TokioSpawner::current().is_err());
}

#[test]
fn test_owned_runtime_drives_queue_from_sync_code() {
    let spawner = TokioSpawner::with_worker_threads(2).unwrap();
    assert!(spawner.owns_runtime());

    let processor = processor_fn(|job: JobContext<u32>, reply: ResultSender<u32>| async move {
        reply.complete(job.payload * 2);
    });
    let job_types = JobTypeConfig::new().with_job_type("double", 1.0);
    let queue: ResourceQueue<u32, u32, _, _> =
        ResourceQueue::with_spawner(2.0, job_types, processor, spawner.clone()).unwrap();
    queue.start().unwrap();

    let handle = queue.enqueue("d", "double", 21).unwrap();
    let result = spawner.block_on(handle);
    assert_eq!(result.into_output().unwrap(), 42);

    spawner.block_on(queue.stop());
}

#[test]
fn test_queue_new_outside_runtime() {
    let processor = processor_fn(|_job: JobContext<u32>, _reply: ResultSender<u32>| async {});
    let result: Result<ResourceQueue<u32, u32, _>, _> =
        ResourceQueue::new(1.0, JobTypeConfig::new(), processor);
    assert!(matches!(result, Err(QueueError::Runtime(_))));
}
