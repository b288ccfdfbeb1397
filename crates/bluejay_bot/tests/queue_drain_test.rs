//! Retry drain behaviour of the reply queue.

mod test_utils;

use bluejay_bot::{DrainStop, ReplyQueue};
use bluejay_core::{NewQueueItem, QueueStatus, RateLimitConfig, ReplySource};
use bluejay_database::InMemoryStore;
use bluejay_error::TransportError;
use bluejay_interface::{QueueFilter, ReplyQueueStore};
use bluejay_rate_limit::PostingLimiter;
use std::sync::Arc;
use test_utils::{BOT, FaultyStore, MockTransport};

fn item(parent: &str) -> NewQueueItem {
    NewQueueItem {
        bot_handle: BOT.to_string(),
        parent_uri: parent.to_string(),
        author_handle: "alice.bsky.social".to_string(),
        source: ReplySource::Mention,
        post_text: "hi".to_string(),
        reply_text: format!("reply to {}", parent),
        extra: serde_json::json!({}),
    }
}

fn roomy() -> PostingLimiter {
    PostingLimiter::new(RateLimitConfig { max_per_minute: 100, max_per_hour: 1000 })
}

async fn seed(store: &InMemoryStore, parents: &[&str]) -> (ReplyQueue, Vec<i64>) {
    let queue = ReplyQueue::new(Arc::new(store.clone()));
    let mut ids = Vec::new();
    for parent in parents {
        ids.push(queue.enqueue(item(parent), QueueStatus::Retry).await.unwrap());
    }
    (queue, ids)
}

async fn status(store: &InMemoryStore, id: i64) -> QueueStatus {
    *store.get_item(id).await.unwrap().unwrap().status()
}

#[tokio::test]
async fn test_drain_posts_oldest_first_within_batch() {
    let store = InMemoryStore::new();
    let (queue, ids) = seed(&store, &["at://1", "at://2", "at://3"]).await;
    let transport = MockTransport::new();

    let report = queue.drain(BOT, transport.as_ref(), &roomy(), 2).await.unwrap();

    assert_eq!(report.posted, 2);
    assert_eq!(report.stopped, None);
    let parents: Vec<String> = transport.posts().into_iter().map(|(_, p)| p).collect();
    assert_eq!(parents, vec!["at://1", "at://2"]);
    assert_eq!(status(&store, ids[0]).await, QueueStatus::Posted);
    assert_eq!(status(&store, ids[2]).await, QueueStatus::Retry);
}

#[tokio::test]
async fn test_drain_stops_when_capacity_runs_out() {
    let store = InMemoryStore::new();
    let (queue, ids) = seed(&store, &["at://1", "at://2"]).await;
    let transport = MockTransport::new();
    let limiter = PostingLimiter::new(RateLimitConfig { max_per_minute: 1, max_per_hour: 10 });

    let report = queue.drain(BOT, transport.as_ref(), &limiter, 5).await.unwrap();

    assert_eq!(report.posted, 1);
    assert_eq!(report.stopped, Some(DrainStop::RateLimited));
    assert_eq!(status(&store, ids[1]).await, QueueStatus::Retry);
}

#[tokio::test]
async fn test_missing_target_becomes_gone_and_is_never_retried() {
    let store = InMemoryStore::new();
    let (queue, ids) = seed(&store, &["at://deleted", "at://2"]).await;
    let transport = MockTransport::new();
    transport.fail_next_post(TransportError::not_found("Post not found"));

    let report = queue.drain(BOT, transport.as_ref(), &roomy(), 5).await.unwrap();
    assert_eq!(report.gone, 1);
    assert_eq!(report.posted, 1);
    assert_eq!(status(&store, ids[0]).await, QueueStatus::Gone);

    let again = queue.drain(BOT, transport.as_ref(), &roomy(), 5).await.unwrap();
    assert_eq!(again, Default::default());
    assert_eq!(transport.posts().len(), 1);
}

#[tokio::test]
async fn test_transient_failure_keeps_item_and_stops_drain() {
    let store = InMemoryStore::new();
    let (queue, ids) = seed(&store, &["at://1", "at://2"]).await;
    let transport = MockTransport::new();
    transport.fail_next_post(TransportError::transient("502 from PDS"));

    let report = queue.drain(BOT, transport.as_ref(), &roomy(), 5).await.unwrap();
    assert!(matches!(report.stopped, Some(DrainStop::TransportFailure(_))));
    assert_eq!(report.posted, 0);
    assert_eq!(status(&store, ids[0]).await, QueueStatus::Retry);
    assert_eq!(status(&store, ids[1]).await, QueueStatus::Retry);

    let report = queue.drain(BOT, transport.as_ref(), &roomy(), 5).await.unwrap();
    assert_eq!(report.posted, 2);
}

#[tokio::test]
async fn test_drain_only_touches_own_bot() {
    let store = InMemoryStore::new();
    let queue = ReplyQueue::new(Arc::new(store.clone()));
    let mut other = item("at://other");
    other.bot_handle = "someone.else".to_string();
    let other_id = queue.enqueue(other, QueueStatus::Retry).await.unwrap();
    let transport = MockTransport::new();

    queue.drain(BOT, transport.as_ref(), &roomy(), 5).await.unwrap();
    assert!(transport.posts().is_empty());
    assert_eq!(status(&store, other_id).await, QueueStatus::Retry);
}

#[tokio::test]
async fn test_racing_drains_post_each_item_once() {
    let store = InMemoryStore::new();
    let (queue, ids) = seed(&store, &["at://1"]).await;
    let transport = MockTransport::new();
    let (first_limiter, second_limiter) = (roomy(), roomy());
    let other_queue = ReplyQueue::new(Arc::new(store.clone()));

    let (a, b) = tokio::join!(
        queue.drain(BOT, transport.as_ref(), &first_limiter, 5),
        other_queue.drain(BOT, transport.as_ref(), &second_limiter, 5),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(transport.posts().len(), 1);
    assert_eq!(a.posted + b.posted, 1);
    assert_eq!(status(&store, ids[0]).await, QueueStatus::Posted);

    let retry = store
        .list_items(&QueueFilter::status(QueueStatus::Retry))
        .await
        .unwrap();
    assert!(retry.is_empty());
}

#[tokio::test]
async fn test_lost_action_log_does_not_undo_drained_post() {
    let inner = InMemoryStore::new();
    let store = FaultyStore::new(inner.clone());
    store.fail_action_log();
    let queue = ReplyQueue::new(Arc::new(store));
    let id = queue
        .enqueue(item("at://alice/1"), QueueStatus::Retry)
        .await
        .unwrap();
    let transport = MockTransport::new();

    let report = queue
        .drain(BOT, transport.as_ref(), &roomy(), 10)
        .await
        .unwrap();

    assert_eq!(report.posted, 1);
    assert_eq!(report.stopped, None);
    assert_eq!(status(&inner, id).await, QueueStatus::Posted);
}
