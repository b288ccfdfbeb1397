//! SQLite implementation of the store traits.

use crate::models::{
    ActionRow, MemoryRow, NewActionRow, NewQueueRow, NewSeenRow, QueueRow, StateRow, now_text,
};
use crate::{DatabaseResult, SqlitePool, establish_pool, run_migrations};
use async_trait::async_trait;
use bluejay_core::{NewQueueItem, QueueItem, QueueStatus, ThreadMemory};
use bluejay_error::{DatabaseError, DatabaseErrorKind};
use bluejay_interface::{
    ActionEntry, ActionLog, MemoryStore, QueueFilter, ReplyQueueStore, SeenLedger, StateStore,
};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::path::Path;
use tracing::{debug, instrument};

/// Durable store backed by an SQLite file.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or migrations fail.
    pub fn open(path: impl AsRef<Path>) -> DatabaseResult<Self> {
        let pool = establish_pool(path)?;
        let mut conn = pool.get()?;
        run_migrations(&mut conn)?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool. Migrations are not run.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run `op` with a pooled connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, op: F) -> DatabaseResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> DatabaseResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            op(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }
}

#[async_trait]
impl SeenLedger for SqliteStore {
    async fn is_seen(&self, uri: &str) -> DatabaseResult<bool> {
        use crate::schema::posts_seen::dsl;

        let uri = uri.to_string();
        self.with_conn(move |conn| {
            let found = dsl::posts_seen
                .find(&uri)
                .select(dsl::uri)
                .first::<String>(conn)
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn mark_seen(&self, uri: &str) -> DatabaseResult<()> {
        use crate::schema::posts_seen;

        let uri = uri.to_string();
        self.with_conn(move |conn| {
            diesel::insert_or_ignore_into(posts_seen::table)
                .values(NewSeenRow {
                    uri: &uri,
                    seen_at: now_text(),
                })
                .execute(conn)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn get_state(&self, key: &str) -> DatabaseResult<Option<String>> {
        use crate::schema::state::dsl;

        let key = key.to_string();
        self.with_conn(move |conn| {
            Ok(dsl::state
                .find(&key)
                .select(dsl::value)
                .first::<String>(conn)
                .optional()?)
        })
        .await
    }

    async fn set_state(&self, key: &str, value: &str) -> DatabaseResult<()> {
        use crate::schema::state;

        let key = key.to_string();
        let value = value.to_string();
        self.with_conn(move |conn| {
            diesel::replace_into(state::table)
                .values(StateRow {
                    key: &key,
                    value: &value,
                })
                .execute(conn)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ActionLog for SqliteStore {
    async fn log_action(
        &self,
        bot_handle: &str,
        action: &str,
        target_uri: &str,
        note: &str,
    ) -> DatabaseResult<()> {
        use crate::schema::actions;

        let (bot_handle, action) = (bot_handle.to_string(), action.to_string());
        let (target_uri, note) = (target_uri.to_string(), note.to_string());
        self.with_conn(move |conn| {
            diesel::insert_into(actions::table)
                .values(NewActionRow {
                    ts: now_text(),
                    bot_handle: &bot_handle,
                    action: &action,
                    target_uri: &target_uri,
                    note: &note,
                })
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn recent_actions(
        &self,
        bot_handle: &str,
        limit: usize,
    ) -> DatabaseResult<Vec<ActionEntry>> {
        use crate::schema::actions::dsl;

        let bot_handle = bot_handle.to_string();
        self.with_conn(move |conn| {
            dsl::actions
                .filter(dsl::bot_handle.eq(&bot_handle))
                .order(dsl::id.desc())
                .limit(limit as i64)
                .select(ActionRow::as_select())
                .load(conn)?
                .into_iter()
                .map(ActionEntry::try_from)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl ReplyQueueStore for SqliteStore {
    #[instrument(skip_all, fields(bot = %item.bot_handle, %status))]
    async fn enqueue(&self, item: NewQueueItem, status: QueueStatus) -> DatabaseResult<i64> {
        use crate::schema::reply_queue;

        let row = NewQueueRow::new(item, status);
        let id = self
            .with_conn(move |conn| {
                Ok(diesel::insert_into(reply_queue::table)
                    .values(&row)
                    .returning(reply_queue::id)
                    .get_result::<i64>(conn)?)
            })
            .await?;
        debug!(id, "Enqueued reply");
        Ok(id)
    }

    async fn get_item(&self, id: i64) -> DatabaseResult<Option<QueueItem>> {
        use crate::schema::reply_queue::dsl;

        self.with_conn(move |conn| {
            dsl::reply_queue
                .find(id)
                .select(QueueRow::as_select())
                .first(conn)
                .optional()?
                .map(QueueItem::try_from)
                .transpose()
        })
        .await
    }

    async fn list_items(&self, filter: &QueueFilter) -> DatabaseResult<Vec<QueueItem>> {
        use crate::schema::reply_queue::dsl;

        let statuses: Vec<String> = filter.statuses().iter().map(|s| s.to_string()).collect();
        let bot_handle = filter.bot_handle().clone();
        let max_items = *filter.max_items();
        self.with_conn(move |conn| {
            let mut query = dsl::reply_queue.select(QueueRow::as_select()).into_boxed();
            if !statuses.is_empty() {
                query = query.filter(dsl::status.eq_any(statuses));
            }
            if let Some(handle) = bot_handle {
                query = query.filter(dsl::bot_handle.eq(handle));
            }
            if let Some(limit) = max_items {
                query = query.limit(limit as i64);
            }
            query
                .order(dsl::id.asc())
                .load::<QueueRow>(conn)?
                .into_iter()
                .map(QueueItem::try_from)
                .collect()
        })
        .await
    }

    #[instrument(skip_all, fields(item_id = id, %from, %to))]
    async fn transition(
        &self,
        id: i64,
        from: QueueStatus,
        to: QueueStatus,
    ) -> DatabaseResult<bool> {
        use crate::schema::reply_queue::dsl;

        let changed = self
            .with_conn(move |conn| {
                Ok(diesel::update(
                    dsl::reply_queue
                        .filter(dsl::id.eq(id))
                        .filter(dsl::status.eq(from.to_string())),
                )
                .set(dsl::status.eq(to.to_string()))
                .execute(conn)?)
            })
            .await?;
        debug!(changed, "Queue transition");
        Ok(changed == 1)
    }
}

#[async_trait]
impl MemoryStore for SqliteStore {
    async fn get_memory(
        &self,
        bot_handle: &str,
        user_handle: &str,
    ) -> DatabaseResult<ThreadMemory> {
        use crate::schema::thread_memory::dsl;

        let (bot_handle, user_handle) = (bot_handle.to_string(), user_handle.to_string());
        self.with_conn(move |conn| {
            let json = dsl::thread_memory
                .find((&bot_handle, &user_handle))
                .select(dsl::memory_json)
                .first::<String>(conn)
                .optional()?;
            match json {
                Some(json) if !json.is_empty() => serde_json::from_str(&json).map_err(|e| {
                    DatabaseError::new(DatabaseErrorKind::Serialization(e.to_string()))
                }),
                _ => Ok(ThreadMemory::default()),
            }
        })
        .await
    }

    async fn upsert_memory(
        &self,
        bot_handle: &str,
        user_handle: &str,
        memory: &ThreadMemory,
    ) -> DatabaseResult<()> {
        use crate::schema::thread_memory;

        let memory_json = serde_json::to_string(memory)
            .map_err(|e| DatabaseError::new(DatabaseErrorKind::Serialization(e.to_string())))?;
        let (bot_handle, user_handle) = (bot_handle.to_string(), user_handle.to_string());
        self.with_conn(move |conn| {
            diesel::replace_into(thread_memory::table)
                .values(MemoryRow {
                    bot_handle: &bot_handle,
                    user_handle: &user_handle,
                    memory_json,
                    updated_ts: now_text(),
                })
                .execute(conn)?;
            Ok(())
        })
        .await
    }
}
