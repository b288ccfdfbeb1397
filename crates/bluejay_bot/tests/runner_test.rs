//! Outer loop isolation.

mod test_utils;

use bluejay_bot::{BotMetrics, BotRunner, BotWorker};
use bluejay_core::RuntimeSettings;
use bluejay_database::InMemoryStore;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{MockTransport, ScriptedClassifier, profile};

fn named_worker(handle: &str, transport: Arc<MockTransport>) -> BotWorker {
    BotWorker::builder()
        .profile(profile().handle(handle).build().unwrap())
        .transport(transport)
        .classifier(ScriptedClassifier::replying("hi"))
        .store(Arc::new(InMemoryStore::new()))
        .build()
        .unwrap()
}

fn broken_and_healthy() -> (Vec<BotWorker>, Arc<MockTransport>) {
    let broken = MockTransport::new();
    broken.fail_listing();
    let healthy = MockTransport::new();
    healthy.push_notification("at://alice/1", "mention", "alice.bsky.social", "hey");
    (
        vec![
            named_worker("broken.bsky.social", broken),
            named_worker("healthy.bsky.social", healthy.clone()),
        ],
        healthy,
    )
}

#[test]
fn test_no_workers_is_config_error() {
    let err =
        BotRunner::new(Vec::new(), &RuntimeSettings::default(), BotMetrics::new()).unwrap_err();
    assert!(err.message.contains("No bots configured"));
}

#[tokio::test]
async fn test_one_crashing_bot_does_not_stop_others() {
    let (workers, healthy) = broken_and_healthy();
    let metrics = BotMetrics::new();
    let runner = BotRunner::new(workers, &RuntimeSettings::default(), metrics.clone()).unwrap();

    let summary = runner.run_cycle().await;
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(healthy.posts().len(), 1);
    assert_eq!(metrics.cycles(), 2);
    assert_eq!(metrics.cycle_failures(), 1);
    assert_eq!(metrics.snapshot().replies_posted, 1);
}

#[tokio::test]
async fn test_parallel_cycle_isolates_failures() {
    let (workers, healthy) = broken_and_healthy();
    let settings = RuntimeSettings::default().with_parallel_bots(true);
    let runner = BotRunner::new(workers, &settings, BotMetrics::new()).unwrap();

    let summary = runner.run_cycle().await;
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(healthy.posts().len(), 1);
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let (workers, _) = broken_and_healthy();
    let runner = BotRunner::new(workers, &RuntimeSettings::default(), BotMetrics::new()).unwrap();

    let shutdown = tokio::time::sleep(Duration::from_millis(50));
    tokio::time::timeout(Duration::from_secs(5), runner.run(shutdown))
        .await
        .expect("runner should stop on shutdown");
    assert!(runner.metrics().cycles() >= 2);
}
