//! Reply queue items and their status machine.

use crate::ReplySource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a queued reply.
///
/// ```text
/// created ──▶ pending ──approve──▶ approved-posted
///    │           └──────reject──▶ rejected
///    └──────▶ retry ──drain ok──▶ posted
///                └──not found───▶ gone
/// ```
///
/// Only `pending` and `retry` are open; every other status is terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum QueueStatus {
    /// Awaiting human approval
    Pending,
    /// Awaiting rate-limit capacity
    Retry,
    /// Sent by a drain
    Posted,
    /// Sent after human approval
    ApprovedPosted,
    /// Declined by a human
    Rejected,
    /// Target content no longer exists
    Gone,
}

impl QueueStatus {
    /// Whether no further transition can leave this status.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::Retry)
    }
}

/// A reply waiting in (or retired from) the durable queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct QueueItem {
    /// Monotonic identifier; creation order
    id: i64,
    /// Owning bot
    bot_handle: String,
    /// URI being replied to
    parent_uri: String,
    /// Author of the parent post
    author_handle: String,
    /// How the candidate was found
    source: ReplySource,
    /// Text of the parent post
    post_text: String,
    /// Generated reply after persona transform
    reply_text: String,
    /// Current status
    status: QueueStatus,
    /// Free-form metadata
    extra: serde_json::Value,
    /// When the item was enqueued
    created_at: DateTime<Utc>,
}

impl QueueItem {
    /// Assemble an item read back from storage.
    pub fn from_parts(
        id: i64,
        item: NewQueueItem,
        status: QueueStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            bot_handle: item.bot_handle,
            parent_uri: item.parent_uri,
            author_handle: item.author_handle,
            source: item.source,
            post_text: item.post_text,
            reply_text: item.reply_text,
            status,
            extra: item.extra,
            created_at,
        }
    }

    /// Same item with a different status.
    pub fn with_status(mut self, status: QueueStatus) -> Self {
        self.status = status;
        self
    }
}

/// Everything needed to enqueue a reply; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQueueItem {
    /// Owning bot
    pub bot_handle: String,
    /// URI being replied to
    pub parent_uri: String,
    /// Author of the parent post
    pub author_handle: String,
    /// How the candidate was found
    pub source: ReplySource,
    /// Text of the parent post
    pub post_text: String,
    /// Generated reply after persona transform
    pub reply_text: String,
    /// Free-form metadata
    pub extra: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_status_strings() {
        assert_eq!(QueueStatus::ApprovedPosted.to_string(), "approved-posted");
        assert_eq!(QueueStatus::from_str("retry").unwrap(), QueueStatus::Retry);
        assert!(QueueStatus::from_str("unknown").is_err());
        let json = serde_json::to_string(&QueueStatus::ApprovedPosted).unwrap();
        assert_eq!(json, "\"approved-posted\"");
    }

    #[test]
    fn test_only_pending_and_retry_are_open() {
        let open: Vec<_> = QueueStatus::iter().filter(|s| !s.is_terminal()).collect();
        assert_eq!(open, vec![QueueStatus::Pending, QueueStatus::Retry]);
    }
}
