//! Inbound content and post results.

use serde::{Deserialize, Serialize};

/// Why a notification was delivered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationReason {
    /// The bot was mentioned
    Mention,
    /// Someone replied to the bot
    Reply,
    /// Anything else (likes, follows, reposts); never acted upon
    #[serde(untagged)]
    Other(String),
}

impl NotificationReason {
    /// Parse a reason string from the transport.
    pub fn parse(reason: &str) -> Self {
        match reason {
            "mention" => Self::Mention,
            "reply" => Self::Reply,
            other => Self::Other(other.to_string()),
        }
    }

    /// The reply source for a prompted reason.
    pub fn source(&self) -> Option<ReplySource> {
        match self {
            Self::Mention => Some(ReplySource::Mention),
            Self::Reply => Some(ReplySource::Reply),
            Self::Other(_) => None,
        }
    }

    /// Mentions and replies are the only prompted reasons.
    pub fn is_prompted(&self) -> bool {
        matches!(self, Self::Mention | Self::Reply)
    }
}

/// How a reply candidate entered the pipeline.
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
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    /// Bot was mentioned
    Mention,
    /// Someone replied to the bot
    Reply,
    /// Found through keyword search
    Search,
}

/// A notification as delivered by the transport.
///
/// Missing upstream fields are resolved to defaults at the transport
/// boundary: author `"user"`, text `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationItem {
    /// Content URI
    pub uri: String,
    /// Delivery reason
    pub reason: NotificationReason,
    /// Author handle
    pub author: String,
    /// Raw post text
    pub text: String,
}

/// A post found by keyword search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Content URI
    pub uri: String,
    /// Author handle
    pub author: String,
    /// Raw post text
    pub text: String,
}

/// Identifies a post created by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostReceipt {
    /// URI of the new post
    pub uri: String,
    /// Content hash of the new post
    pub cid: String,
}
