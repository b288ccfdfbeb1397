//! Read-only transport wrapper.

use async_trait::async_trait;
use bluejay_core::{Candidate, NotificationItem, PostReceipt};
use bluejay_error::TransportError;
use bluejay_interface::Transport;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Reads through to the wrapped transport; logs writes instead of sending them.
pub struct DryRunTransport {
    inner: Arc<dyn Transport>,
    counter: AtomicU64,
}

impl DryRunTransport {
    /// Wrap a live transport.
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self {
            inner,
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl Transport for DryRunTransport {
    async fn list_recent_notifications(
        &self,
        limit: usize,
    ) -> Result<Vec<NotificationItem>, TransportError> {
        self.inner.list_recent_notifications(limit).await
    }

    async fn mark_all_seen(&self) -> Result<(), TransportError> {
        info!("Dry run: skipping updateSeen");
        Ok(())
    }

    async fn search(
        &self,
        keyword: &str,
        since: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Candidate>, TransportError> {
        self.inner.search(keyword, since, limit).await
    }

    async fn post_reply(
        &self,
        text: &str,
        parent_uri: &str,
    ) -> Result<PostReceipt, TransportError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        info!(parent_uri, text, "Dry run: reply not posted");
        Ok(PostReceipt {
            uri: format!("at://dry-run/app.bsky.feed.post/{}", n),
            cid: format!("dry-run-{}", n),
        })
    }
}
