//! Hand-written collaborators for worker, queue and admin tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bluejay_bot::BotWorker;
use bluejay_core::{
    BotProfile, Candidate, Classification, ClassificationRequest, NewQueueItem,
    NotificationItem, NotificationReason, PostReceipt, QueueItem, QueueStatus, RuntimeSettings,
    ThreadMemory,
};
use bluejay_database::InMemoryStore;
use bluejay_error::{ClassifierError, DatabaseError, DatabaseErrorKind, TransportError};
use bluejay_interface::{
    ActionEntry, ActionLog, BotStore, Classifier, MemoryStore, QueueFilter, ReplyQueueStore,
    SeenLedger, StateStore, Transport,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Transport serving canned notifications and search results, recording posts.
#[derive(Default)]
pub struct MockTransport {
    notifications: Mutex<Vec<NotificationItem>>,
    search_results: Mutex<HashMap<String, Vec<Candidate>>>,
    post_failures: Mutex<VecDeque<TransportError>>,
    fail_listing: Mutex<bool>,
    posts: Mutex<Vec<(String, String)>>,
    searches: Mutex<Vec<(String, Option<String>)>>,
    mark_seen_calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_notification(&self, uri: &str, reason: &str, author: &str, text: &str) {
        self.notifications.lock().push(NotificationItem {
            uri: uri.to_string(),
            reason: NotificationReason::parse(reason),
            author: author.to_string(),
            text: text.to_string(),
        });
    }

    pub fn set_search_results(&self, keyword: &str, results: Vec<(&str, &str, &str)>) {
        self.search_results.lock().insert(
            keyword.to_string(),
            results
                .into_iter()
                .map(|(uri, author, text)| Candidate {
                    uri: uri.to_string(),
                    author: author.to_string(),
                    text: text.to_string(),
                })
                .collect(),
        );
    }

    /// The next post fails with `error`.
    pub fn fail_next_post(&self, error: TransportError) {
        self.post_failures.lock().push_back(error);
    }

    pub fn fail_listing(&self) {
        *self.fail_listing.lock() = true;
    }

    pub fn posts(&self) -> Vec<(String, String)> {
        self.posts.lock().clone()
    }

    pub fn searches(&self) -> Vec<(String, Option<String>)> {
        self.searches.lock().clone()
    }

    pub fn mark_seen_calls(&self) -> usize {
        self.mark_seen_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn list_recent_notifications(
        &self,
        limit: usize,
    ) -> Result<Vec<NotificationItem>, TransportError> {
        if *self.fail_listing.lock() {
            return Err(TransportError::transient("listing unavailable"));
        }
        Ok(self.notifications.lock().iter().take(limit).cloned().collect())
    }

    async fn mark_all_seen(&self) -> Result<(), TransportError> {
        self.mark_seen_calls.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::transient("updateSeen is flaky"))
    }

    async fn search(
        &self,
        keyword: &str,
        since: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Candidate>, TransportError> {
        self.searches
            .lock()
            .push((keyword.to_string(), since.map(str::to_string)));
        Ok(self
            .search_results
            .lock()
            .get(keyword)
            .map(|r| r.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn post_reply(
        &self,
        text: &str,
        parent_uri: &str,
    ) -> Result<PostReceipt, TransportError> {
        // Yield so racing drains interleave.
        tokio::task::yield_now().await;
        if let Some(error) = self.post_failures.lock().pop_front() {
            return Err(error);
        }
        let mut posts = self.posts.lock();
        posts.push((text.to_string(), parent_uri.to_string()));
        Ok(PostReceipt {
            uri: format!("at://did:plc:bot/app.bsky.feed.post/{}", posts.len()),
            cid: format!("cid-{}", posts.len()),
        })
    }
}

/// Classifier replaying scripted answers, then a fixed default.
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<Result<Classification, ClassifierError>>>,
    default: Classification,
    requests: Mutex<Vec<ClassificationRequest>>,
}

impl ScriptedClassifier {
    /// Always answers with `reply`.
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            default: Classification {
                should_reply: true,
                reply: reply.to_string(),
            },
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answers from `script` first.
    pub fn scripted(
        script: Vec<Result<Classification, ClassifierError>>,
        default: Classification,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            default,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<ClassificationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Classification, ClassifierError> {
        self.requests.lock().push(request.clone());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(self.default.clone()))
    }
}

pub const BOT: &str = "helper.bsky.social";

/// Profile with no emoji so reply text is predictable.
pub fn profile() -> bluejay_core::BotProfileBuilder {
    let mut builder = BotProfile::builder();
    builder.handle(BOT).persona(bluejay_core::Persona {
        emoji_density: 0,
        ..bluejay_core::Persona::default()
    });
    builder
}

pub fn worker(
    profile: BotProfile,
    transport: Arc<MockTransport>,
    classifier: Arc<ScriptedClassifier>,
    store: InMemoryStore,
    settings: RuntimeSettings,
) -> BotWorker {
    BotWorker::builder()
        .profile(profile)
        .transport(transport)
        .classifier(classifier)
        .store(Arc::new(store))
        .settings(settings)
        .build()
        .unwrap()
}

/// In-memory store that fails memory reads for one user and, on request,
/// every action log write.
#[derive(Clone, Default)]
pub struct FaultyStore {
    inner: InMemoryStore,
    broken_user: Arc<Mutex<Option<String>>>,
    fail_log: Arc<Mutex<bool>>,
}

impl FaultyStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Memory reads for `user` fail.
    pub fn break_memory_for(&self, user: &str) {
        *self.broken_user.lock() = Some(user.to_string());
    }

    /// Every `log_action` fails.
    pub fn fail_action_log(&self) {
        *self.fail_log.lock() = true;
    }

    fn corrupt() -> DatabaseError {
        DatabaseError::new(DatabaseErrorKind::Serialization("corrupt row".to_string()))
    }
}

#[async_trait]
impl SeenLedger for FaultyStore {
    async fn is_seen(&self, uri: &str) -> Result<bool, DatabaseError> {
        self.inner.is_seen(uri).await
    }

    async fn mark_seen(&self, uri: &str) -> Result<(), DatabaseError> {
        self.inner.mark_seen(uri).await
    }
}

#[async_trait]
impl StateStore for FaultyStore {
    async fn get_state(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        self.inner.get_state(key).await
    }

    async fn set_state(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.inner.set_state(key, value).await
    }
}

#[async_trait]
impl ActionLog for FaultyStore {
    async fn log_action(
        &self,
        bot_handle: &str,
        action: &str,
        target_uri: &str,
        note: &str,
    ) -> Result<(), DatabaseError> {
        if *self.fail_log.lock() {
            return Err(Self::corrupt());
        }
        self.inner
            .log_action(bot_handle, action, target_uri, note)
            .await
    }

    async fn recent_actions(
        &self,
        bot_handle: &str,
        limit: usize,
    ) -> Result<Vec<ActionEntry>, DatabaseError> {
        self.inner.recent_actions(bot_handle, limit).await
    }
}

#[async_trait]
impl ReplyQueueStore for FaultyStore {
    async fn enqueue(&self, item: NewQueueItem, status: QueueStatus) -> Result<i64, DatabaseError> {
        self.inner.enqueue(item, status).await
    }

    async fn get_item(&self, id: i64) -> Result<Option<QueueItem>, DatabaseError> {
        self.inner.get_item(id).await
    }

    async fn list_items(&self, filter: &QueueFilter) -> Result<Vec<QueueItem>, DatabaseError> {
        self.inner.list_items(filter).await
    }

    async fn transition(
        &self,
        id: i64,
        from: QueueStatus,
        to: QueueStatus,
    ) -> Result<bool, DatabaseError> {
        self.inner.transition(id, from, to).await
    }
}

#[async_trait]
impl MemoryStore for FaultyStore {
    async fn get_memory(
        &self,
        bot_handle: &str,
        user_handle: &str,
    ) -> Result<ThreadMemory, DatabaseError> {
        if self.broken_user.lock().as_deref() == Some(user_handle) {
            return Err(Self::corrupt());
        }
        self.inner.get_memory(bot_handle, user_handle).await
    }

    async fn upsert_memory(
        &self,
        bot_handle: &str,
        user_handle: &str,
        memory: &ThreadMemory,
    ) -> Result<(), DatabaseError> {
        self.inner.upsert_memory(bot_handle, user_handle, memory).await
    }
}

/// Worker over any store.
pub fn worker_with_store(
    profile: BotProfile,
    transport: Arc<MockTransport>,
    classifier: Arc<ScriptedClassifier>,
    store: Arc<dyn BotStore>,
) -> BotWorker {
    BotWorker::builder()
        .profile(profile)
        .transport(transport)
        .classifier(classifier)
        .store(store)
        .build()
        .unwrap()
}
