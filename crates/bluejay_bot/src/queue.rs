//! Reply queue operations and the retry drain.

use bluejay_core::{NewQueueItem, QueueStatus, truncate_chars};
use bluejay_error::BluejayResult;
use bluejay_interface::{ActionLog, BotStore, QueueFilter, ReplyQueueStore, Transport};
use bluejay_rate_limit::PostingLimiter;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Characters of reply text kept in action log notes.
pub(crate) const NOTE_CHARS: usize = 140;

/// Why a drain stopped before its batch was exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainStop {
    /// No posting capacity left
    RateLimited,
    /// A post failed for a reason other than a missing target
    TransportFailure(String),
}

/// Outcome of one drain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Items moved to `posted`
    pub posted: usize,
    /// Items moved to `gone`
    pub gone: usize,
    /// Items another drain claimed first
    pub skipped: usize,
    /// Set when the drain stopped early
    pub stopped: Option<DrainStop>,
}

/// The durable reply queue seen through its state machine.
#[derive(Clone)]
pub struct ReplyQueue {
    store: Arc<dyn BotStore>,
}

impl std::fmt::Debug for ReplyQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyQueue").finish_non_exhaustive()
    }
}

impl ReplyQueue {
    /// Wrap a store.
    pub fn new(store: Arc<dyn BotStore>) -> Self {
        Self { store }
    }

    /// Insert a reply as `pending` or `retry`.
    #[instrument(skip(self, item), fields(bot = %item.bot_handle, uri = %item.parent_uri))]
    pub async fn enqueue(&self, item: NewQueueItem, status: QueueStatus) -> BluejayResult<i64> {
        let id = self.store.enqueue(item, status).await?;
        info!(item_id = id, %status, "Reply queued");
        Ok(id)
    }

    /// Post up to `max_items` of a bot's oldest `retry` items.
    ///
    /// Each item is claimed (`retry → posted`) before it is posted, so two
    /// concurrent drains never post the same item. A post that fails because
    /// the target is gone finalises the item as `gone`; any other failure
    /// puts it back in `retry` and ends the drain.
    #[instrument(skip(self, transport, limiter), fields(bot = %bot_handle))]
    pub async fn drain(
        &self,
        bot_handle: &str,
        transport: &dyn Transport,
        limiter: &PostingLimiter,
        max_items: usize,
    ) -> BluejayResult<DrainReport> {
        let filter = QueueFilter::status(QueueStatus::Retry)
            .bot(bot_handle)
            .limit(max_items);
        let items = self.store.list_items(&filter).await?;
        let mut report = DrainReport::default();

        for item in items {
            let id = *item.id();
            if !limiter.has_capacity() {
                debug!(item_id = id, "Posting capacity exhausted, drain paused");
                report.stopped = Some(DrainStop::RateLimited);
                break;
            }

            if !self
                .store
                .transition(id, QueueStatus::Retry, QueueStatus::Posted)
                .await?
            {
                debug!(item_id = id, "Item already claimed");
                report.skipped += 1;
                continue;
            }

            if !limiter.try_reserve() {
                self.store
                    .transition(id, QueueStatus::Posted, QueueStatus::Retry)
                    .await?;
                report.stopped = Some(DrainStop::RateLimited);
                break;
            }

            match transport.post_reply(item.reply_text(), item.parent_uri()).await {
                Ok(receipt) => {
                    if let Err(e) = self
                        .store
                        .log_action(
                            bot_handle,
                            "reply",
                            item.parent_uri(),
                            truncate_chars(item.reply_text(), NOTE_CHARS),
                        )
                        .await
                    {
                        error!(item_id = id, error = %e, "Failed to log drained reply");
                    }
                    info!(item_id = id, uri = %receipt.uri, "Drained queued reply");
                    report.posted += 1;
                }
                Err(e) if e.is_not_found() => {
                    self.store
                        .transition(id, QueueStatus::Posted, QueueStatus::Gone)
                        .await?;
                    info!(item_id = id, error = %e, "Reply target gone");
                    report.gone += 1;
                }
                Err(e) => {
                    self.store
                        .transition(id, QueueStatus::Posted, QueueStatus::Retry)
                        .await?;
                    warn!(item_id = id, error = %e, "Drain post failed, stopping drain");
                    report.stopped = Some(DrainStop::TransportFailure(e.kind().to_string()));
                    break;
                }
            }
        }

        Ok(report)
    }
}
