//! Tests for builder modules

use resource_queue::builders::{build_queue, build_queue_with_spawner};
use resource_queue::config::QueueConfig;
use resource_queue::core::{processor_fn, JobContext, QueueError, ResourceQueue, ResultSender};
use resource_queue::runtime::TokioSpawner;

fn echo() -> impl resource_queue::core::JobProcessor<String, String> + Clone {
    processor_fn(|job: JobContext<String>, reply: ResultSender<String>| async move {
        reply.complete(job.payload.to_uppercase());
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_build_queue_from_config() {
    let cfg = QueueConfig::new(10.0)
        .with_job_type("OpenAI", 0.0)
        .with_job_type("Llama3.2", 3.0);
    let queue: ResourceQueue<String, String, _> = build_queue(&cfg, echo()).unwrap();

    assert_eq!(queue.total_units(), 10.0);
    assert_eq!(queue.job_type_units("Llama3.2"), Some(3.0));

    queue.start().unwrap();
    let result = queue.enqueue("greet", "Llama3.2", "hello".to_string()).unwrap().await;
    assert_eq!(result.into_output().unwrap(), "HELLO");
    queue.stop().await;
}

#[tokio::test]
async fn test_build_queue_rejects_invalid_config() {
    let cfg = QueueConfig::new(0.0);
    let result: Result<ResourceQueue<String, String, _>, _> = build_queue(&cfg, echo());
    assert!(matches!(result, Err(QueueError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_build_queue_with_explicit_spawner() {
    let cfg = QueueConfig::new(1.0).with_job_type("tiny", 1.0);
    let spawner = TokioSpawner::current().unwrap();
    let queue: ResourceQueue<String, String, _, _> =
        build_queue_with_spawner(&cfg, echo(), spawner).unwrap();
    queue.start().unwrap();
    let result = queue.enqueue("t", "tiny", "x".to_string()).unwrap().await;
    assert_eq!(result.into_output().unwrap(), "X");
    queue.stop().await;
}
