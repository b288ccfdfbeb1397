//! Row types and conversions.

use crate::DatabaseResult;
use crate::schema::{actions, posts_seen, reply_queue, state, thread_memory};
use bluejay_core::{NewQueueItem, QueueItem, QueueStatus, ReplySource};
use bluejay_error::{DatabaseError, DatabaseErrorKind};
use bluejay_interface::ActionEntry;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::str::FromStr;

fn serialization_error(what: &str, detail: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::new(DatabaseErrorKind::Serialization(format!(
        "Invalid {}: {}",
        what, detail
    )))
}

/// Current time as stored in text columns.
pub(crate) fn now_text() -> String {
    Utc::now().to_rfc3339()
}

pub(crate) fn parse_timestamp(text: &str) -> DatabaseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| serialization_error("timestamp", e))
}

#[derive(Debug, Insertable)]
#[diesel(table_name = posts_seen)]
pub(crate) struct NewSeenRow<'a> {
    pub uri: &'a str,
    pub seen_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = state)]
pub(crate) struct StateRow<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = actions)]
pub(crate) struct NewActionRow<'a> {
    pub ts: String,
    pub bot_handle: &'a str,
    pub action: &'a str,
    pub target_uri: &'a str,
    pub note: &'a str,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = actions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ActionRow {
    pub ts: String,
    pub bot_handle: String,
    pub action: String,
    pub target_uri: String,
    pub note: String,
}

impl TryFrom<ActionRow> for ActionEntry {
    type Error = DatabaseError;

    fn try_from(row: ActionRow) -> Result<Self, Self::Error> {
        Ok(ActionEntry {
            timestamp: parse_timestamp(&row.ts)?,
            bot_handle: row.bot_handle,
            action: row.action,
            target_uri: row.target_uri,
            note: row.note,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reply_queue)]
pub(crate) struct NewQueueRow {
    pub ts: String,
    pub bot_handle: String,
    pub parent_uri: String,
    pub author_handle: String,
    pub source: String,
    pub post_text: String,
    pub llm_reply: String,
    pub status: String,
    pub extra: String,
}

impl NewQueueRow {
    pub(crate) fn new(item: NewQueueItem, status: QueueStatus) -> Self {
        Self {
            ts: now_text(),
            source: item.source.to_string(),
            status: status.to_string(),
            extra: item.extra.to_string(),
            bot_handle: item.bot_handle,
            parent_uri: item.parent_uri,
            author_handle: item.author_handle,
            post_text: item.post_text,
            llm_reply: item.reply_text,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = reply_queue)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct QueueRow {
    pub id: i64,
    pub ts: String,
    pub bot_handle: String,
    pub parent_uri: String,
    pub author_handle: String,
    pub source: String,
    pub post_text: String,
    pub llm_reply: String,
    pub status: String,
    pub extra: String,
}

impl TryFrom<QueueRow> for QueueItem {
    type Error = DatabaseError;

    fn try_from(row: QueueRow) -> Result<Self, Self::Error> {
        let status = QueueStatus::from_str(&row.status)
            .map_err(|e| serialization_error("queue status", e))?;
        let source = ReplySource::from_str(&row.source)
            .map_err(|e| serialization_error("reply source", e))?;
        let extra = serde_json::from_str(&row.extra)
            .map_err(|e| serialization_error("queue extra", e))?;
        let created_at = parse_timestamp(&row.ts)?;

        let item = NewQueueItem {
            bot_handle: row.bot_handle,
            parent_uri: row.parent_uri,
            author_handle: row.author_handle,
            source,
            post_text: row.post_text,
            reply_text: row.llm_reply,
            extra,
        };
        Ok(QueueItem::from_parts(row.id, item, status, created_at))
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = thread_memory)]
pub(crate) struct MemoryRow<'a> {
    pub bot_handle: &'a str,
    pub user_handle: &'a str,
    pub memory_json: String,
    pub updated_ts: String,
}
