//! Durable store traits.
//!
//! Every operation is a single atomic statement. No caller holds a
//! transaction across a suspension point, so concurrent workers only rely on
//! the store's per-statement atomicity.

use crate::{ActionEntry, QueueFilter};
use async_trait::async_trait;
use bluejay_core::{NewQueueItem, QueueItem, QueueStatus, ThreadMemory};
use bluejay_error::DatabaseError;

/// Which content URIs have already been processed.
#[async_trait]
pub trait SeenLedger: Send + Sync {
    /// Whether `uri` was marked seen.
    async fn is_seen(&self, uri: &str) -> Result<bool, DatabaseError>;

    /// Mark `uri` seen. Idempotent.
    async fn mark_seen(&self, uri: &str) -> Result<(), DatabaseError>;
}

/// Key/value state (approval overrides, search watermarks).
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a value.
    async fn get_state(&self, key: &str) -> Result<Option<String>, DatabaseError>;

    /// Insert or replace a value.
    async fn set_state(&self, key: &str, value: &str) -> Result<(), DatabaseError>;
}

/// Append-only audit log.
#[async_trait]
pub trait ActionLog: Send + Sync {
    /// Append an entry.
    async fn log_action(
        &self,
        bot_handle: &str,
        action: &str,
        target_uri: &str,
        note: &str,
    ) -> Result<(), DatabaseError>;

    /// Most recent entries for a bot, newest first.
    async fn recent_actions(
        &self,
        bot_handle: &str,
        limit: usize,
    ) -> Result<Vec<ActionEntry>, DatabaseError>;
}

/// The reply queue.
///
/// Items are never deleted; status only changes through
/// [`transition`](ReplyQueueStore::transition).
#[async_trait]
pub trait ReplyQueueStore: Send + Sync {
    /// Insert an item with its initial status and return its id.
    async fn enqueue(&self, item: NewQueueItem, status: QueueStatus) -> Result<i64, DatabaseError>;

    /// Fetch one item.
    async fn get_item(&self, id: i64) -> Result<Option<QueueItem>, DatabaseError>;

    /// Items matching `filter`, ascending by id.
    async fn list_items(&self, filter: &QueueFilter) -> Result<Vec<QueueItem>, DatabaseError>;

    /// Compare-and-set the status of `id` from `from` to `to`.
    ///
    /// Returns `true` only if the item existed and was in `from`. Of several
    /// concurrent callers with the same `from`, at most one wins.
    async fn transition(
        &self,
        id: i64,
        from: QueueStatus,
        to: QueueStatus,
    ) -> Result<bool, DatabaseError>;
}

/// Per-(bot, user) conversation history.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// History with a user; empty when there is none.
    async fn get_memory(
        &self,
        bot_handle: &str,
        user_handle: &str,
    ) -> Result<ThreadMemory, DatabaseError>;

    /// Replace the history with a user.
    async fn upsert_memory(
        &self,
        bot_handle: &str,
        user_handle: &str,
        memory: &ThreadMemory,
    ) -> Result<(), DatabaseError>;
}

/// Everything a worker needs from the durable store.
pub trait BotStore: SeenLedger + StateStore + ActionLog + ReplyQueueStore + MemoryStore {}

impl<T> BotStore for T where
    T: SeenLedger + StateStore + ActionLog + ReplyQueueStore + MemoryStore
{
}
