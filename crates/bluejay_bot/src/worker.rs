//! Per-bot reply cycle.

use crate::persona::apply_persona;
use crate::queue::{DrainReport, NOTE_CHARS, ReplyQueue};
use bluejay_core::{
    BotProfile, Classification, ClassificationRequest, NewQueueItem, PostReceipt, QueueStatus,
    ReplySource, RuntimeSettings, truncate_chars,
};
use bluejay_error::{BluejayResult, ConfigError};
use bluejay_interface::{
    ActionLog, BotStore, Classifier, MemoryStore, SeenLedger, StateStore, Transport,
};
use bluejay_rate_limit::{PostingLimiter, SlidingWindowLimiter};
use bluejay_security::{ApprovalPolicy, FilterDecision, FilterPolicy};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// What happened to one generated reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// Sent straight away
    Posted(PostReceipt),
    /// Stored in the reply queue
    Queued {
        /// Queue item id
        id: i64,
        /// `pending` or `retry`
        status: QueueStatus,
    },
}

/// Tally of one [`BotWorker::run_once`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Result of the opening drain
    pub drain: DrainReport,
    /// Notifications returned by the transport
    pub notifications: usize,
    /// New candidates that reached the pipeline
    pub candidates: usize,
    /// Search results rejected by the filter policy
    pub filtered: usize,
    /// Candidates dropped by the LLM throttle
    pub throttled: usize,
    /// Candidates the classifier declined
    pub declined: usize,
    /// Replies posted straight away
    pub posted: usize,
    /// Replies queued for approval
    pub queued_pending: usize,
    /// Replies queued for posting capacity
    pub queued_retry: usize,
    /// Replies lost to a post or store failure
    pub failed: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: &PostOutcome) {
        match outcome {
            PostOutcome::Posted(_) => self.posted += 1,
            PostOutcome::Queued {
                status: QueueStatus::Pending,
                ..
            } => self.queued_pending += 1,
            PostOutcome::Queued { .. } => self.queued_retry += 1,
        }
    }
}

/// A candidate that passed intake.
struct Candidate<'a> {
    uri: &'a str,
    author: &'a str,
    text: &'a str,
    source: ReplySource,
}

/// One bot account's reply loop.
///
/// Steps within a cycle run strictly in order: every URI is marked seen
/// before it is classified, and classified before it is posted or queued.
pub struct BotWorker {
    profile: BotProfile,
    transport: Arc<dyn Transport>,
    classifier: Arc<dyn Classifier>,
    store: Arc<dyn BotStore>,
    queue: ReplyQueue,
    posting: PostingLimiter,
    llm_limiter: Arc<SlidingWindowLimiter>,
    approval: ApprovalPolicy,
    filter: FilterPolicy,
    settings: RuntimeSettings,
}

impl std::fmt::Debug for BotWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotWorker")
            .field("handle", self.profile.handle())
            .field("posting", &self.posting)
            .finish_non_exhaustive()
    }
}

impl BotWorker {
    /// Creates a new worker builder.
    pub fn builder() -> BotWorkerBuilder {
        BotWorkerBuilder::default()
    }

    /// The bot's handle.
    pub fn handle(&self) -> &str {
        self.profile.handle()
    }

    /// The bot's profile.
    pub fn profile(&self) -> &BotProfile {
        &self.profile
    }

    /// The bot's transport.
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Drain up to `max_items` of this bot's `retry` items.
    pub async fn drain(&self, max_items: usize) -> BluejayResult<DrainReport> {
        self.queue
            .drain(
                self.profile.handle(),
                self.transport.as_ref(),
                &self.posting,
                max_items,
            )
            .await
    }

    /// Run one cycle: drain, notifications, upstream mark-seen, search.
    ///
    /// # Errors
    ///
    /// Fails when notifications cannot be listed or the search watermark
    /// cannot be read or written. A failed drain only ends the drain, and a
    /// failure on one item is logged and counted in [`CycleReport::failed`].
    #[instrument(skip(self), fields(bot = %self.profile.handle()))]
    pub async fn run_once(&self) -> BluejayResult<CycleReport> {
        let drain = match self.drain(*self.settings.drain_batch_size()).await {
            Ok(drain) => drain,
            Err(e) => {
                error!(error = %e, "Drain failed");
                DrainReport::default()
            }
        };
        let mut report = CycleReport {
            drain,
            ..CycleReport::default()
        };

        self.notification_intake(&mut report).await?;

        if let Err(e) = self.transport.mark_all_seen().await {
            debug!(error = %e, "Upstream mark-seen failed, ignoring");
        }

        if self.profile.reply_rules().search_enabled() {
            self.search_intake(&mut report).await?;
        }

        info!(
            posted = report.posted,
            pending = report.queued_pending,
            retry = report.queued_retry,
            drained = report.drain.posted,
            throttled = report.throttled,
            failed = report.failed,
            "Cycle complete"
        );
        Ok(report)
    }

    async fn notification_intake(&self, report: &mut CycleReport) -> BluejayResult<()> {
        let notifications = self
            .transport
            .list_recent_notifications(*self.settings.notification_limit())
            .await?;
        report.notifications = notifications.len();

        for item in &notifications {
            let Some(source) = item.reason.source() else {
                debug!(uri = %item.uri, reason = ?item.reason, "Not a mention or reply");
                continue;
            };
            let candidate = Candidate {
                uri: &item.uri,
                author: &item.author,
                text: &item.text,
                source,
            };
            if let Err(e) = self.handle_notification(candidate, report).await {
                error!(uri = %item.uri, error = %e, "Failed to handle notification");
                report.failed += 1;
            }
        }
        Ok(())
    }

    async fn handle_notification(
        &self,
        candidate: Candidate<'_>,
        report: &mut CycleReport,
    ) -> BluejayResult<()> {
        if !self.claim(candidate.uri).await? {
            return Ok(());
        }
        self.respond(candidate, report).await
    }

    async fn search_intake(&self, report: &mut CycleReport) -> BluejayResult<()> {
        let handle = self.profile.handle();
        let watermark_key = format!("since_{}", handle);
        let since = self.store.get_state(&watermark_key).await?;

        for keyword in &self.profile.reply_rules().keywords {
            let results = match self
                .transport
                .search(keyword, since.as_deref(), *self.settings.search_limit())
                .await
            {
                Ok(results) => results,
                Err(e) => {
                    warn!(keyword = %keyword, error = %e, "Search failed");
                    Vec::new()
                }
            };

            for post in &results {
                if post.author == *handle {
                    continue;
                }
                if let Err(e) = self.handle_search_result(post, report).await {
                    error!(uri = %post.uri, error = %e, "Failed to handle search result");
                    report.failed += 1;
                }
            }
        }

        self.store
            .set_state(&watermark_key, &chrono::Utc::now().to_rfc3339())
            .await?;
        Ok(())
    }

    async fn handle_search_result(
        &self,
        post: &bluejay_core::Candidate,
        report: &mut CycleReport,
    ) -> BluejayResult<()> {
        if !self.claim(&post.uri).await? {
            return Ok(());
        }

        let allow_unprompted = self.profile.reply_rules().allow_unprompted;
        if let FilterDecision::Reject(reason) =
            self.filter.evaluate(&post.text, &post.author, allow_unprompted)
        {
            debug!(uri = %post.uri, %reason, "Search result filtered");
            report.filtered += 1;
            return Ok(());
        }

        self.respond(
            Candidate {
                uri: &post.uri,
                author: &post.author,
                text: &post.text,
                source: ReplySource::Search,
            },
            report,
        )
        .await
    }

    /// Mark `uri` seen; `false` when it already was.
    async fn claim(&self, uri: &str) -> BluejayResult<bool> {
        if self.store.is_seen(uri).await? {
            return Ok(false);
        }
        self.store.mark_seen(uri).await?;
        Ok(true)
    }

    /// Throttle, classify, transform, then post or queue one candidate.
    #[instrument(skip_all, fields(uri = %candidate.uri, source = %candidate.source))]
    async fn respond(
        &self,
        candidate: Candidate<'_>,
        report: &mut CycleReport,
    ) -> BluejayResult<()> {
        report.candidates += 1;
        if !self.llm_limiter.can_accept() || !self.llm_limiter.try_reserve() {
            info!("LLM throttled, dropping candidate this cycle");
            report.throttled += 1;
            return Ok(());
        }

        let handle = self.profile.handle();
        let mut memory = self.store.get_memory(handle, candidate.author).await?;
        let request = ClassificationRequest::new(
            candidate.text,
            candidate.author,
            *self.profile.nsfw_allowed(),
            self.profile.persona().clone(),
            memory.clone(),
        );

        let classification = match self.classifier.classify(&request).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!(error = %e, "Classifier unavailable, not replying");
                Classification::skip()
            }
        };
        let Some(reply) = classification.reply_text() else {
            debug!("Classifier declined");
            report.declined += 1;
            return Ok(());
        };
        let reply = apply_persona(reply, self.profile.persona());

        let outcome = match self.post_or_queue(&candidate, &reply).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Failed to handle reply");
                report.failed += 1;
                return Ok(());
            }
        };
        report.record(&outcome);

        memory.record(candidate.text, &reply);
        if let Err(e) = self
            .store
            .upsert_memory(handle, candidate.author, &memory)
            .await
        {
            error!(error = %e, "Failed to update thread memory");
        }
        Ok(())
    }

    /// Queue for approval, queue for capacity, or post now.
    async fn post_or_queue(
        &self,
        candidate: &Candidate<'_>,
        reply: &str,
    ) -> BluejayResult<PostOutcome> {
        let handle = self.profile.handle();
        let override_value = self
            .store
            .get_state(&ApprovalPolicy::override_key(handle))
            .await?;

        let queue_status = if self
            .approval
            .is_required(&self.profile, override_value.as_deref())
        {
            Some(QueueStatus::Pending)
        } else if !self.posting.has_capacity() {
            info!("Rate limited, queueing for retry");
            Some(QueueStatus::Retry)
        } else if !self.posting.try_reserve() {
            info!("Slot reservation failed, queueing for retry");
            Some(QueueStatus::Retry)
        } else {
            None
        };

        if let Some(status) = queue_status {
            let item = NewQueueItem {
                bot_handle: handle.clone(),
                parent_uri: candidate.uri.to_string(),
                author_handle: candidate.author.to_string(),
                source: candidate.source,
                post_text: candidate.text.to_string(),
                reply_text: reply.to_string(),
                extra: serde_json::json!({}),
            };
            let id = self.queue.enqueue(item, status).await?;
            return Ok(PostOutcome::Queued { id, status });
        }

        let receipt = self.transport.post_reply(reply, candidate.uri).await?;
        // The reply is out; a lost audit row must not count it as failed.
        if let Err(e) = self
            .store
            .log_action(handle, "reply", candidate.uri, truncate_chars(reply, NOTE_CHARS))
            .await
        {
            error!(error = %e, "Failed to log reply");
        }
        info!(reply_uri = %receipt.uri, "Replied");
        Ok(PostOutcome::Posted(receipt))
    }
}

/// Collaborators and settings a [`BotWorker`] is built from.
#[derive(derive_builder::Builder)]
#[builder(name = "BotWorkerBuilder", public, build_fn(private, name = "build_parts"))]
struct WorkerParts {
    /// Bot configuration
    profile: BotProfile,
    /// The bot's transport
    transport: Arc<dyn Transport>,
    /// Reply classifier
    classifier: Arc<dyn Classifier>,
    /// Durable store
    store: Arc<dyn BotStore>,
    /// LLM throttle shared with other workers; by default each worker gets
    /// its own from the settings
    #[builder(default, setter(strip_option))]
    llm_limiter: Option<Arc<SlidingWindowLimiter>>,
    /// Runtime settings
    #[builder(default)]
    settings: RuntimeSettings,
}

impl BotWorkerBuilder {
    /// Build the worker.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a collaborator is missing or the
    /// profile has no handle.
    pub fn build(&self) -> Result<BotWorker, ConfigError> {
        let parts = self
            .build_parts()
            .map_err(|e| ConfigError::new(format!("Cannot build bot worker: {}", e)))?;
        if parts.profile.handle().trim().is_empty() {
            return Err(ConfigError::new("Bot handle must not be empty"));
        }
        let llm_limiter = parts.llm_limiter.unwrap_or_else(|| {
            Arc::new(SlidingWindowLimiter::per_minute(
                *parts.settings.llm_rate_limit_per_minute(),
            ))
        });

        Ok(BotWorker {
            posting: PostingLimiter::new(*parts.profile.rate_limit()),
            approval: ApprovalPolicy::new(*parts.settings.approval_mode()),
            filter: FilterPolicy::new(
                parts.profile.allow().clone(),
                parts.profile.block().clone(),
                *parts.profile.nsfw_allowed(),
            ),
            queue: ReplyQueue::new(Arc::clone(&parts.store)),
            profile: parts.profile,
            transport: parts.transport,
            classifier: parts.classifier,
            store: parts.store,
            llm_limiter,
            settings: parts.settings,
        })
    }
}
