//! XRPC request and response bodies.
//!
//! Only the fields the engine reads are modelled; everything else is ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionResponse {
    pub access_jwt: String,
    pub refresh_jwt: String,
    pub did: String,
    pub handle: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct XrpcErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AuthorView {
    #[serde(default)]
    pub handle: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PostRecordView {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationView {
    pub uri: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub author: Option<AuthorView>,
    #[serde(default)]
    pub record: Option<PostRecordView>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListNotificationsResponse {
    #[serde(default)]
    pub notifications: Vec<NotificationView>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostView {
    pub uri: String,
    #[serde(default)]
    pub author: Option<AuthorView>,
    #[serde(default)]
    pub record: Option<PostRecordView>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchPostsResponse {
    #[serde(default)]
    pub posts: Vec<PostView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StrongRef {
    pub uri: String,
    pub cid: String,
}

/// A node of `app.bsky.feed.getPostThread`.
#[derive(Debug, Deserialize)]
#[serde(tag = "$type")]
pub(crate) enum ThreadNode {
    #[serde(rename = "app.bsky.feed.defs#threadViewPost")]
    Post {
        post: StrongRef,
        #[serde(default)]
        parent: Option<Box<ThreadNode>>,
    },
    #[serde(rename = "app.bsky.feed.defs#notFoundPost")]
    NotFound { uri: String },
    #[serde(rename = "app.bsky.feed.defs#blockedPost")]
    Blocked { uri: String },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetPostThreadResponse {
    pub thread: ThreadNode,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ReplyRef {
    pub root: StrongRef,
    pub parent: StrongRef,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostRecord<'a> {
    #[serde(rename = "$type")]
    pub record_type: &'static str,
    pub text: &'a str,
    pub created_at: String,
    pub langs: Vec<&'static str>,
    pub reply: ReplyRef,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRecordRequest<'a> {
    pub repo: &'a str,
    pub collection: &'static str,
    pub record: PostRecord<'a>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateRecordResponse {
    pub uri: String,
    pub cid: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateSeenRequest {
    pub seen_at: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResolveHandleResponse {
    pub did: String,
}
