//! Human actions on the reply queue.

use crate::queue::NOTE_CHARS;
use bluejay_core::{BotProfile, QueueItem, QueueStatus, truncate_chars};
use bluejay_error::{BluejayResult, QueueError, QueueErrorKind};
use bluejay_interface::{ActionLog, BotStore, QueueFilter, ReplyQueueStore, StateStore, Transport};
use bluejay_security::{ApprovalMode, ApprovalPolicy};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Queue listing, approve/reject and approval-mode toggles.
///
/// Every action maps to one queue transition or one override write.
pub struct AdminService {
    store: Arc<dyn BotStore>,
    policy: ApprovalPolicy,
    bots: HashMap<String, BotProfile>,
    transports: HashMap<String, Arc<dyn Transport>>,
}

impl std::fmt::Debug for AdminService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminService")
            .field("policy", &self.policy)
            .field("bots", &self.bots.keys().collect::<Vec<_>>())
            .field("transports", &self.transports.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn invalid(id: i64, from: QueueStatus, to: QueueStatus) -> QueueError {
    QueueError::new(QueueErrorKind::InvalidTransition {
        id,
        from: from.to_string(),
        to: to.to_string(),
    })
}

impl AdminService {
    /// Create a service over the configured bots.
    pub fn new(
        store: Arc<dyn BotStore>,
        policy: ApprovalPolicy,
        bots: impl IntoIterator<Item = BotProfile>,
    ) -> Self {
        Self {
            store,
            policy,
            bots: bots
                .into_iter()
                .map(|bot| (bot.handle().clone(), bot))
                .collect(),
            transports: HashMap::new(),
        }
    }

    /// Register the transport used to post approved replies for `handle`.
    pub fn with_transport(
        mut self,
        handle: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        self.transports.insert(handle.into(), transport);
        self
    }

    fn profile(&self, handle: &str) -> Result<&BotProfile, QueueError> {
        self.bots
            .get(handle)
            .ok_or_else(|| QueueError::new(QueueErrorKind::UnknownBot(handle.to_string())))
    }

    async fn load(&self, id: i64) -> BluejayResult<QueueItem> {
        Ok(self
            .store
            .get_item(id)
            .await?
            .ok_or_else(|| QueueError::new(QueueErrorKind::ItemNotFound(id)))?)
    }

    /// Items in `status`, or every item when `None`; oldest first.
    pub async fn list_queue(&self, status: Option<QueueStatus>) -> BluejayResult<Vec<QueueItem>> {
        let filter = status.map(QueueFilter::status).unwrap_or_else(QueueFilter::all);
        Ok(self.store.list_items(&filter).await?)
    }

    /// Post a `pending` reply and mark it `approved-posted`.
    ///
    /// The item is claimed before posting; if the post fails it goes back to
    /// `pending`.
    ///
    /// # Errors
    ///
    /// `ItemNotFound` for unknown ids, `InvalidTransition` when the item is
    /// not pending, `UnknownBot` when no transport is registered for its bot,
    /// and the transport error when posting fails.
    #[instrument(skip(self), fields(item_id = id))]
    pub async fn approve(&self, id: i64) -> BluejayResult<QueueItem> {
        let item = self.load(id).await?;
        if *item.status() != QueueStatus::Pending {
            return Err(invalid(id, *item.status(), QueueStatus::ApprovedPosted).into());
        }
        let transport = self.transports.get(item.bot_handle()).ok_or_else(|| {
            QueueError::new(QueueErrorKind::UnknownBot(item.bot_handle().clone()))
        })?;

        if !self
            .store
            .transition(id, QueueStatus::Pending, QueueStatus::ApprovedPosted)
            .await?
        {
            let current = self.load(id).await?;
            return Err(invalid(id, *current.status(), QueueStatus::ApprovedPosted).into());
        }

        if let Err(e) = transport
            .post_reply(item.reply_text(), item.parent_uri())
            .await
        {
            warn!(error = %e, "Approved reply failed to post, returning to pending");
            self.store
                .transition(id, QueueStatus::ApprovedPosted, QueueStatus::Pending)
                .await?;
            return Err(e.into());
        }

        self.store
            .log_action(
                item.bot_handle(),
                "approved_post",
                item.parent_uri(),
                truncate_chars(item.reply_text(), NOTE_CHARS),
            )
            .await?;
        info!(bot = %item.bot_handle(), uri = %item.parent_uri(), "Approved reply posted");
        Ok(item.with_status(QueueStatus::ApprovedPosted))
    }

    /// Mark a `pending` reply `rejected`.
    #[instrument(skip(self), fields(item_id = id))]
    pub async fn reject(&self, id: i64) -> BluejayResult<QueueItem> {
        let item = self.load(id).await?;
        if !self
            .store
            .transition(id, QueueStatus::Pending, QueueStatus::Rejected)
            .await?
        {
            let current = self.load(id).await?;
            return Err(invalid(id, *current.status(), QueueStatus::Rejected).into());
        }
        info!(bot = %item.bot_handle(), "Reply rejected");
        Ok(item.with_status(QueueStatus::Rejected))
    }

    /// Store an approval override for a bot.
    #[instrument(skip(self))]
    pub async fn set_approval_mode(&self, handle: &str, mode: ApprovalMode) -> BluejayResult<()> {
        self.profile(handle)?;
        self.store
            .set_state(&ApprovalPolicy::override_key(handle), mode.as_ref())
            .await?;
        info!(bot = handle, %mode, "Approval override set");
        Ok(())
    }

    /// Whether replies of `handle` currently need approval.
    pub async fn approval_mode(&self, handle: &str) -> BluejayResult<bool> {
        let profile = self.profile(handle)?;
        let override_value = self
            .store
            .get_state(&ApprovalPolicy::override_key(handle))
            .await?;
        Ok(self.policy.is_required(profile, override_value.as_deref()))
    }

    /// Handles of the configured bots, sorted.
    pub fn bot_handles(&self) -> Vec<String> {
        let mut handles: Vec<String> = self.bots.keys().cloned().collect();
        handles.sort();
        handles
    }
}
