//! In-memory implementation of the store traits.
//!
//! Backs tests and `--dry-run`. All data is lost when the store is dropped.

use crate::DatabaseResult;
use async_trait::async_trait;
use bluejay_core::{NewQueueItem, QueueItem, QueueStatus, ThreadMemory};
use bluejay_interface::{
    ActionEntry, ActionLog, MemoryStore, QueueFilter, ReplyQueueStore, SeenLedger, StateStore,
};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// `HashMap`-backed store.
///
/// Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    seen: Arc<RwLock<HashSet<String>>>,
    state: Arc<RwLock<HashMap<String, String>>>,
    actions: Arc<RwLock<Vec<ActionEntry>>>,
    /// Keyed by id; iteration order is creation order
    queue: Arc<RwLock<BTreeMap<i64, QueueItem>>>,
    memory: Arc<RwLock<HashMap<(String, String), ThreadMemory>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queue items in any status.
    pub async fn queue_len(&self) -> usize {
        self.queue.read().await.len()
    }
}

#[async_trait]
impl SeenLedger for InMemoryStore {
    async fn is_seen(&self, uri: &str) -> DatabaseResult<bool> {
        Ok(self.seen.read().await.contains(uri))
    }

    async fn mark_seen(&self, uri: &str) -> DatabaseResult<()> {
        self.seen.write().await.insert(uri.to_string());
        Ok(())
    }
}

#[async_trait]
impl StateStore for InMemoryStore {
    async fn get_state(&self, key: &str) -> DatabaseResult<Option<String>> {
        Ok(self.state.read().await.get(key).cloned())
    }

    async fn set_state(&self, key: &str, value: &str) -> DatabaseResult<()> {
        self.state
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl ActionLog for InMemoryStore {
    async fn log_action(
        &self,
        bot_handle: &str,
        action: &str,
        target_uri: &str,
        note: &str,
    ) -> DatabaseResult<()> {
        self.actions.write().await.push(ActionEntry {
            timestamp: Utc::now(),
            bot_handle: bot_handle.to_string(),
            action: action.to_string(),
            target_uri: target_uri.to_string(),
            note: note.to_string(),
        });
        Ok(())
    }

    async fn recent_actions(
        &self,
        bot_handle: &str,
        limit: usize,
    ) -> DatabaseResult<Vec<ActionEntry>> {
        Ok(self
            .actions
            .read()
            .await
            .iter()
            .rev()
            .filter(|a| a.bot_handle == bot_handle)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReplyQueueStore for InMemoryStore {
    async fn enqueue(&self, item: NewQueueItem, status: QueueStatus) -> DatabaseResult<i64> {
        let mut queue = self.queue.write().await;
        let id = queue.keys().next_back().map_or(1, |last| last + 1);
        queue.insert(id, QueueItem::from_parts(id, item, status, Utc::now()));
        Ok(id)
    }

    async fn get_item(&self, id: i64) -> DatabaseResult<Option<QueueItem>> {
        Ok(self.queue.read().await.get(&id).cloned())
    }

    async fn list_items(&self, filter: &QueueFilter) -> DatabaseResult<Vec<QueueItem>> {
        let queue = self.queue.read().await;
        let matching = queue
            .values()
            .filter(|item| filter.matches(*item.status(), item.bot_handle()))
            .cloned();
        Ok(match filter.max_items() {
            Some(limit) => matching.take(*limit).collect(),
            None => matching.collect(),
        })
    }

    async fn transition(
        &self,
        id: i64,
        from: QueueStatus,
        to: QueueStatus,
    ) -> DatabaseResult<bool> {
        let mut queue = self.queue.write().await;
        match queue.get_mut(&id) {
            Some(item) if *item.status() == from => {
                *item = item.clone().with_status(to);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn get_memory(
        &self,
        bot_handle: &str,
        user_handle: &str,
    ) -> DatabaseResult<ThreadMemory> {
        Ok(self
            .memory
            .read()
            .await
            .get(&(bot_handle.to_string(), user_handle.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_memory(
        &self,
        bot_handle: &str,
        user_handle: &str,
        memory: &ThreadMemory,
    ) -> DatabaseResult<()> {
        self.memory.write().await.insert(
            (bot_handle.to_string(), user_handle.to_string()),
            memory.clone(),
        );
        Ok(())
    }
}
