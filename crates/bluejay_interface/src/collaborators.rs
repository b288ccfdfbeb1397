//! Social network and classifier traits.

use async_trait::async_trait;
use bluejay_core::{
    Candidate, Classification, ClassificationRequest, NotificationItem, PostReceipt,
};
use bluejay_error::{ClassifierError, TransportError};

/// The social network as seen by one bot account.
///
/// Implementations resolve optional upstream fields to defaults before
/// returning, so callers never check for presence.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Most recent notifications, newest first as the service returns them.
    async fn list_recent_notifications(
        &self,
        limit: usize,
    ) -> Result<Vec<NotificationItem>, TransportError>;

    /// Mark every notification as read upstream.
    async fn mark_all_seen(&self) -> Result<(), TransportError>;

    /// Posts matching `keyword`, optionally only those newer than `since`
    /// (RFC 3339).
    async fn search(
        &self,
        keyword: &str,
        since: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Candidate>, TransportError>;

    /// Reply to `parent_uri`.
    ///
    /// # Errors
    ///
    /// Fails with [`bluejay_error::TransportErrorKind::NotFound`] when the
    /// parent no longer exists, and with another kind for anything that may
    /// succeed later.
    async fn post_reply(&self, text: &str, parent_uri: &str)
        -> Result<PostReceipt, TransportError>;
}

/// Decides whether and how to reply to a candidate.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify one candidate.
    ///
    /// Implementations apply their own bounded retry and treat malformed
    /// output as [`Classification::skip`].
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Classification, ClassifierError>;
}
