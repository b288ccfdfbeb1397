//! Value types used by the store traits.

use bluejay_core::QueueStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the append-only action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    /// When the action happened
    pub timestamp: DateTime<Utc>,
    /// Acting bot
    pub bot_handle: String,
    /// What happened (`reply`, `approved_post`, ...)
    pub action: String,
    /// Content the action targeted
    pub target_uri: String,
    /// Short free-form note
    pub note: String,
}

/// Selection of queue items.
///
/// Results are always ordered by ascending id (creation order).
///
/// # Examples
///
/// ```
/// use bluejay_core::QueueStatus;
/// use bluejay_interface::QueueFilter;
///
/// let filter = QueueFilter::status(QueueStatus::Retry).bot("helper.bsky.social").limit(5);
/// assert_eq!(filter.statuses(), &[QueueStatus::Retry]);
/// assert_eq!(*filter.max_items(), Some(5));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_getters::Getters)]
pub struct QueueFilter {
    /// Accepted statuses; empty accepts all
    statuses: Vec<QueueStatus>,
    /// Only items of this bot
    bot_handle: Option<String>,
    /// At most this many items
    max_items: Option<usize>,
}

impl QueueFilter {
    /// Every item.
    pub fn all() -> Self {
        Self::default()
    }

    /// Items in one status.
    pub fn status(status: QueueStatus) -> Self {
        Self {
            statuses: vec![status],
            ..Self::default()
        }
    }

    /// Items in any of `statuses`.
    pub fn any_of(statuses: impl IntoIterator<Item = QueueStatus>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Restrict to one bot.
    pub fn bot(mut self, handle: impl Into<String>) -> Self {
        self.bot_handle = Some(handle.into());
        self
    }

    /// Cap the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.max_items = Some(limit);
        self
    }

    /// Whether an item with these attributes is selected.
    pub fn matches(&self, status: QueueStatus, bot_handle: &str) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&status))
            && self.bot_handle.as_deref().is_none_or(|h| h == bot_handle)
    }
}
