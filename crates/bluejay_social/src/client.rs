//! XRPC client for an AT Protocol PDS.

use crate::errors::classify_xrpc_error;
use crate::json_models::{
    CreateRecordRequest, CreateRecordResponse, CreateSessionRequest, GetPostThreadResponse,
    ListNotificationsResponse, PostRecord, ReplyRef, ResolveHandleResponse, SearchPostsResponse,
    SessionResponse, ThreadNode, UpdateSeenRequest, XrpcErrorBody,
};
use crate::uri::parse_bsky_app_url;
use async_trait::async_trait;
use bluejay_core::{Candidate, NotificationItem, NotificationReason, PostReceipt, truncate_chars};
use bluejay_error::{TransportError, TransportErrorKind};
use bluejay_interface::Transport;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default PDS.
pub const DEFAULT_SERVICE: &str = "https://bsky.social";

/// Maximum characters in a post.
const MAX_POST_CHARS: usize = 300;

/// Login details for one account.
#[derive(Clone, derive_getters::Getters)]
pub struct BlueskyConfig {
    /// PDS base URL
    service: String,
    /// Handle or email used to log in
    identifier: String,
    /// App password
    password: String,
    /// Per-request timeout
    timeout: Duration,
}

impl std::fmt::Debug for BlueskyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlueskyConfig")
            .field("service", &self.service)
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BlueskyConfig {
    /// Credentials against a PDS; `None` selects [`DEFAULT_SERVICE`].
    pub fn new(
        identifier: impl Into<String>,
        password: impl Into<String>,
        service: Option<&str>,
    ) -> Self {
        Self {
            service: service
                .unwrap_or(DEFAULT_SERVICE)
                .trim_end_matches('/')
                .to_string(),
            identifier: identifier.into(),
            password: password.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
struct Session {
    access_jwt: String,
    refresh_jwt: String,
    did: String,
    handle: String,
}

impl From<SessionResponse> for Session {
    fn from(r: SessionResponse) -> Self {
        Self {
            access_jwt: r.access_jwt,
            refresh_jwt: r.refresh_jwt,
            did: r.did,
            handle: r.handle,
        }
    }
}

/// Authenticated Bluesky client.
///
/// The session is refreshed once and the call retried when the PDS reports
/// `ExpiredToken`.
pub struct BlueskyClient {
    config: BlueskyConfig,
    http: reqwest::Client,
    session: RwLock<Session>,
}

impl std::fmt::Debug for BlueskyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlueskyClient")
            .field("service", &self.config.service)
            .field("handle", &self.session.read().handle)
            .finish()
    }
}

fn request_failed(e: reqwest::Error) -> TransportError {
    TransportError::transient(format!("Request failed: {}", e))
}

fn invalid_response(e: impl std::fmt::Display) -> TransportError {
    TransportError::new(TransportErrorKind::InvalidResponse(format!(
        "Failed to parse response: {}",
        e
    )))
}

async fn error_from_response(response: reqwest::Response) -> (u16, XrpcErrorBody) {
    let status = response.status().as_u16();
    let body = response.json::<XrpcErrorBody>().await.unwrap_or_default();
    (status, body)
}

impl BlueskyClient {
    /// Log in with `com.atproto.server.createSession`.
    ///
    /// # Errors
    ///
    /// Returns an `Authentication` error when the credentials are rejected
    /// and a `Transient` error when the PDS cannot be reached.
    #[instrument(skip(config), fields(service = %config.service, identifier = %config.identifier))]
    pub async fn login(config: BlueskyConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(request_failed)?;

        let url = format!("{}/xrpc/com.atproto.server.createSession", config.service);
        let response = http
            .post(&url)
            .json(&CreateSessionRequest {
                identifier: &config.identifier,
                password: &config.password,
            })
            .send()
            .await
            .map_err(request_failed)?;

        if !response.status().is_success() {
            let (status, body) = error_from_response(response).await;
            let err = classify_xrpc_error(status, body.error.as_deref(), body.message.as_deref());
            // A rejected login below 500 is a credential problem.
            let kind = match err.kind {
                TransportErrorKind::Transient(detail) if status < 500 => {
                    TransportErrorKind::Authentication(detail)
                }
                other => other,
            };
            return Err(TransportError::new(kind));
        }

        let session: SessionResponse = response.json().await.map_err(invalid_response)?;
        info!(handle = %session.handle, did = %session.did, "Logged in");
        Ok(Self {
            config,
            http,
            session: RwLock::new(session.into()),
        })
    }

    /// Handle of the logged-in account.
    pub fn handle(&self) -> String {
        self.session.read().handle.clone()
    }

    /// DID of the logged-in account.
    pub fn did(&self) -> String {
        self.session.read().did.clone()
    }

    fn xrpc_url(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.config.service, nsid)
    }

    #[instrument(skip(self))]
    async fn refresh_session(&self) -> Result<(), TransportError> {
        let refresh = self.session.read().refresh_jwt.clone();
        let response = self
            .http
            .post(self.xrpc_url("com.atproto.server.refreshSession"))
            .bearer_auth(refresh)
            .send()
            .await
            .map_err(request_failed)?;

        if !response.status().is_success() {
            let (status, body) = error_from_response(response).await;
            let detail = format!(
                "Session refresh failed with HTTP {}: {}",
                status,
                body.message.unwrap_or_default()
            );
            return Err(TransportError::new(TransportErrorKind::Authentication(detail)));
        }

        let session: SessionResponse = response.json().await.map_err(invalid_response)?;
        *self.session.write() = session.into();
        debug!("Session refreshed");
        Ok(())
    }

    /// Send an authenticated request, refreshing the session once on
    /// `ExpiredToken`.
    async fn send<F>(&self, build: F) -> Result<reqwest::Response, TransportError>
    where
        F: Fn(&str) -> reqwest::RequestBuilder + Send + Sync,
    {
        let mut refreshed = false;
        loop {
            let token = self.session.read().access_jwt.clone();
            let response = build(&token).send().await.map_err(request_failed)?;
            if response.status().is_success() {
                return Ok(response);
            }

            let (status, body) = error_from_response(response).await;
            if !refreshed && body.error.as_deref() == Some("ExpiredToken") {
                refreshed = true;
                self.refresh_session().await?;
                continue;
            }
            return Err(classify_xrpc_error(
                status,
                body.error.as_deref(),
                body.message.as_deref(),
            ));
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        nsid: &str,
        query: &[(&str, String)],
    ) -> Result<T, TransportError> {
        let url = self.xrpc_url(nsid);
        let response = self
            .send(|token| self.http.get(&url).query(query).bearer_auth(token))
            .await?;
        response.json().await.map_err(invalid_response)
    }

    async fn post_json<B, T>(&self, nsid: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.xrpc_url(nsid);
        let response = self
            .send(|token| self.http.post(&url).json(body).bearer_auth(token))
            .await?;
        response.json().await.map_err(invalid_response)
    }

    /// Turn a bsky.app post URL into an AT URI, resolving handles.
    /// Anything else is returned trimmed and unchanged.
    #[instrument(skip(self))]
    pub async fn normalize_uri(&self, input: &str) -> Result<String, TransportError> {
        let input = input.trim();
        if input.starts_with("at://") {
            return Ok(input.to_string());
        }
        let Some(url) = parse_bsky_app_url(input) else {
            return Ok(input.to_string());
        };
        if url.actor_is_did() {
            return Ok(url.at_uri(&url.actor));
        }
        let resolved: ResolveHandleResponse = self
            .get_json(
                "com.atproto.identity.resolveHandle",
                &[("handle", url.actor.clone())],
            )
            .await?;
        Ok(url.at_uri(&resolved.did))
    }

    /// Root and parent references for a reply to `uri`.
    async fn reply_ref(&self, uri: &str) -> Result<ReplyRef, TransportError> {
        let response: GetPostThreadResponse = self
            .get_json(
                "app.bsky.feed.getPostThread",
                &[
                    ("uri", uri.to_string()),
                    ("depth", "0".to_string()),
                    ("parentHeight", "10".to_string()),
                ],
            )
            .await?;
        reply_ref_from_thread(response.thread)
    }
}

/// Walk a thread view up to its root.
fn reply_ref_from_thread(thread: ThreadNode) -> Result<ReplyRef, TransportError> {
    let (parent, mut ancestor) = match thread {
        ThreadNode::Post { post, parent } => (post, parent),
        ThreadNode::NotFound { uri } => {
            return Err(TransportError::not_found(format!("Post not found: {}", uri)));
        }
        ThreadNode::Blocked { uri } => {
            return Err(TransportError::not_found(format!("Post blocked: {}", uri)));
        }
        ThreadNode::Unknown => {
            return Err(TransportError::new(TransportErrorKind::InvalidResponse(
                "Unexpected thread node".to_string(),
            )));
        }
    };

    let mut root = parent.clone();
    while let Some(node) = ancestor {
        match *node {
            ThreadNode::Post { post, parent } => {
                root = post;
                ancestor = parent;
            }
            _ => break,
        }
    }
    Ok(ReplyRef { root, parent })
}

#[async_trait]
impl Transport for BlueskyClient {
    #[instrument(skip(self))]
    async fn list_recent_notifications(
        &self,
        limit: usize,
    ) -> Result<Vec<NotificationItem>, TransportError> {
        let response: ListNotificationsResponse = self
            .get_json(
                "app.bsky.notification.listNotifications",
                &[
                    ("limit", limit.to_string()),
                    ("reasons", "mention".to_string()),
                    ("reasons", "reply".to_string()),
                ],
            )
            .await?;

        Ok(response
            .notifications
            .into_iter()
            .map(|n| NotificationItem {
                uri: n.uri,
                reason: NotificationReason::parse(&n.reason),
                author: n
                    .author
                    .and_then(|a| a.handle)
                    .unwrap_or_else(|| "user".to_string()),
                text: n.record.and_then(|r| r.text).unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn mark_all_seen(&self) -> Result<(), TransportError> {
        let url = self.xrpc_url("app.bsky.notification.updateSeen");
        let body = UpdateSeenRequest {
            seen_at: chrono::Utc::now().to_rfc3339(),
        };
        self.send(|token| self.http.post(&url).json(&body).bearer_auth(token))
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        keyword: &str,
        since: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Candidate>, TransportError> {
        let mut query = vec![("q", keyword.to_string()), ("limit", limit.to_string())];
        if let Some(since) = since {
            query.push(("since", since.to_string()));
        }
        let response: SearchPostsResponse =
            self.get_json("app.bsky.feed.searchPosts", &query).await?;

        Ok(response
            .posts
            .into_iter()
            .map(|p| Candidate {
                uri: p.uri,
                author: p
                    .author
                    .and_then(|a| a.handle)
                    .unwrap_or_else(|| "user".to_string()),
                text: p.record.and_then(|r| r.text).unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn post_reply(
        &self,
        text: &str,
        parent_uri: &str,
    ) -> Result<PostReceipt, TransportError> {
        let uri = self.normalize_uri(parent_uri).await?;
        let reply = self.reply_ref(&uri).await.inspect_err(|e| {
            warn!(error = %e, "Could not resolve reply reference");
        })?;

        let did = self.did();
        let request = CreateRecordRequest {
            repo: &did,
            collection: "app.bsky.feed.post",
            record: PostRecord {
                record_type: "app.bsky.feed.post",
                text: truncate_chars(text, MAX_POST_CHARS),
                created_at: chrono::Utc::now().to_rfc3339(),
                langs: vec!["en"],
                reply,
            },
        };
        let created: CreateRecordResponse = self
            .post_json("com.atproto.repo.createRecord", &request)
            .await?;
        info!(uri = %created.uri, "Reply posted");
        Ok(PostReceipt {
            uri: created.uri,
            cid: created.cid,
        })
    }
}
