//! Classifier request and response types.

use crate::{Persona, ThreadMemory};
use serde::{Deserialize, Serialize};

/// Everything the classifier sees about one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ClassificationRequest {
    /// Text of the candidate post
    post_text: String,
    /// Author handle
    author: String,
    /// Whether the bot may engage with NSFW content
    nsfw_allowed: bool,
    /// Language the reply should be written in
    target_lang: String,
    /// Bot persona
    persona: Persona,
    /// Recent interactions with this author
    thread_context: ThreadMemory,
}

impl ClassificationRequest {
    /// Create a request targeting English replies.
    pub fn new(
        post_text: impl Into<String>,
        author: impl Into<String>,
        nsfw_allowed: bool,
        persona: Persona,
        thread_context: ThreadMemory,
    ) -> Self {
        Self {
            post_text: post_text.into(),
            author: author.into(),
            nsfw_allowed,
            target_lang: "en".to_string(),
            persona,
            thread_context,
        }
    }
}

/// Decision returned by the classifier.
///
/// Missing fields default to "do not reply".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Whether the bot should answer
    #[serde(default)]
    pub should_reply: bool,
    /// Proposed reply text
    #[serde(default)]
    pub reply: String,
}

impl Classification {
    /// The "do not reply" decision.
    pub fn skip() -> Self {
        Self::default()
    }

    /// The reply text, if the classifier wants to answer with something.
    pub fn reply_text(&self) -> Option<&str> {
        if self.should_reply && !self.reply.is_empty() {
            Some(&self.reply)
        } else {
            None
        }
    }
}
