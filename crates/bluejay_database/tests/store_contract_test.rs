//! Behaviour shared by every store implementation.

use bluejay_core::{NewQueueItem, QueueStatus, ReplySource, ThreadMemory};
use bluejay_database::{InMemoryStore, SqliteStore};
use bluejay_interface::{BotStore, QueueFilter, ReplyQueueStore, SeenLedger};
use std::sync::Arc;

fn new_item(bot: &str, parent: &str) -> NewQueueItem {
    NewQueueItem {
        bot_handle: bot.to_string(),
        parent_uri: parent.to_string(),
        author_handle: "carol.bsky.social".to_string(),
        source: ReplySource::Mention,
        post_text: "hey bot".to_string(),
        reply_text: "hey human".to_string(),
        extra: serde_json::json!({"note": "test"}),
    }
}

fn sqlite_store() -> (tempfile::TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("bots.db")).unwrap();
    (dir, store)
}

async fn seen_is_idempotent<S: BotStore>(store: &S) {
    let uri = "at://did:plc:abc/app.bsky.feed.post/1";
    assert!(!store.is_seen(uri).await.unwrap());
    store.mark_seen(uri).await.unwrap();
    store.mark_seen(uri).await.unwrap();
    assert!(store.is_seen(uri).await.unwrap());
    assert!(!store.is_seen("at://other").await.unwrap());
}

async fn state_round_trip<S: BotStore>(store: &S) {
    assert_eq!(store.get_state("approval.a").await.unwrap(), None);
    store.set_state("approval.a", "on").await.unwrap();
    store.set_state("approval.a", "off").await.unwrap();
    assert_eq!(store.get_state("approval.a").await.unwrap().as_deref(), Some("off"));
}

async fn queue_lists_in_creation_order<S: BotStore>(store: &S) {
    let a = store.enqueue(new_item("a", "at://1"), QueueStatus::Retry).await.unwrap();
    let b = store.enqueue(new_item("b", "at://2"), QueueStatus::Retry).await.unwrap();
    let c = store.enqueue(new_item("a", "at://3"), QueueStatus::Pending).await.unwrap();
    let d = store.enqueue(new_item("a", "at://4"), QueueStatus::Retry).await.unwrap();
    assert!(a < b && b < c && c < d);

    let retry_a = store
        .list_items(&QueueFilter::status(QueueStatus::Retry).bot("a"))
        .await
        .unwrap();
    let ids: Vec<i64> = retry_a.iter().map(|i| *i.id()).collect();
    assert_eq!(ids, vec![a, d]);

    let limited = store
        .list_items(&QueueFilter::any_of([QueueStatus::Retry, QueueStatus::Pending]).limit(2))
        .await
        .unwrap();
    let ids: Vec<i64> = limited.iter().map(|i| *i.id()).collect();
    assert_eq!(ids, vec![a, b]);

    let item = store.get_item(c).await.unwrap().unwrap();
    assert_eq!(item.status(), &QueueStatus::Pending);
    assert_eq!(item.reply_text(), "hey human");
    assert_eq!(item.source(), &ReplySource::Mention);
    assert_eq!(item.extra()["note"], "test");
    assert!(store.get_item(9999).await.unwrap().is_none());
}

async fn transition_is_compare_and_set<S: BotStore>(store: &S) {
    let id = store.enqueue(new_item("a", "at://1"), QueueStatus::Retry).await.unwrap();

    assert!(!store.transition(id, QueueStatus::Pending, QueueStatus::Rejected).await.unwrap());
    assert!(store.transition(id, QueueStatus::Retry, QueueStatus::Posted).await.unwrap());
    assert!(!store.transition(id, QueueStatus::Retry, QueueStatus::Posted).await.unwrap());
    assert!(!store.transition(424242, QueueStatus::Retry, QueueStatus::Posted).await.unwrap());

    let item = store.get_item(id).await.unwrap().unwrap();
    assert_eq!(item.status(), &QueueStatus::Posted);
    let retry = store.list_items(&QueueFilter::status(QueueStatus::Retry)).await.unwrap();
    assert!(retry.is_empty());
}

async fn memory_and_actions<S: BotStore>(store: &S) {
    assert!(store.get_memory("a", "carol").await.unwrap().history().is_empty());

    let mut memory = ThreadMemory::default();
    memory.record("hello", "hi");
    store.upsert_memory("a", "carol", &memory).await.unwrap();
    memory.record("again", "yes");
    store.upsert_memory("a", "carol", &memory).await.unwrap();

    let loaded = store.get_memory("a", "carol").await.unwrap();
    assert_eq!(loaded, memory);
    assert!(store.get_memory("b", "carol").await.unwrap().history().is_empty());

    store.log_action("a", "reply", "at://1", "first").await.unwrap();
    store.log_action("b", "reply", "at://2", "other bot").await.unwrap();
    store.log_action("a", "approved_post", "at://3", "second").await.unwrap();

    let actions = store.recent_actions("a", 10).await.unwrap();
    let notes: Vec<&str> = actions.iter().map(|a| a.note.as_str()).collect();
    assert_eq!(notes, vec!["second", "first"]);
}

macro_rules! contract_tests {
    ($module:ident, $make:expr) => {
        mod $module {
            use super::*;

            #[tokio::test]
            async fn seen_ledger() {
                let (_guard, store) = $make;
                seen_is_idempotent(&store).await;
            }

            #[tokio::test]
            async fn state() {
                let (_guard, store) = $make;
                state_round_trip(&store).await;
            }

            #[tokio::test]
            async fn queue_order() {
                let (_guard, store) = $make;
                queue_lists_in_creation_order(&store).await;
            }

            #[tokio::test]
            async fn queue_transition() {
                let (_guard, store) = $make;
                transition_is_compare_and_set(&store).await;
            }

            #[tokio::test]
            async fn memory_and_action_log() {
                let (_guard, store) = $make;
                memory_and_actions(&store).await;
            }
        }
    };
}

contract_tests!(in_memory, ((), InMemoryStore::new()));
contract_tests!(sqlite, sqlite_store());

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_claims_have_one_winner() {
    let (_dir, store) = sqlite_store();
    let store = Arc::new(store);
    let id = store.enqueue(new_item("a", "at://1"), QueueStatus::Retry).await.unwrap();

    let claims: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .transition(id, QueueStatus::Retry, QueueStatus::Posted)
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut winners = 0;
    for claim in claims {
        if claim.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn sqlite_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("bots.db");
    {
        let store = SqliteStore::open(&path).unwrap();
        store.mark_seen("at://kept").await.unwrap();
        store.enqueue(new_item("a", "at://1"), QueueStatus::Pending).await.unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    assert!(store.is_seen("at://kept").await.unwrap());
    let pending = store.list_items(&QueueFilter::status(QueueStatus::Pending)).await.unwrap();
    assert_eq!(pending.len(), 1);
}
