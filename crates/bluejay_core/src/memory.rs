//! Bounded per-(bot, user) conversation history.

use crate::truncate_chars;
use serde::{Deserialize, Serialize};

/// History entries kept per user; older entries are evicted first.
pub const MAX_HISTORY: usize = 6;

/// Characters kept from each side of an interaction.
const MAX_INTERACTION_CHARS: usize = 300;

/// One post/reply exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// What the user wrote
    pub post: String,
    /// What the bot answered
    pub reply: String,
}

/// Recent interactions between one bot and one user.
///
/// Serialized as `{"history": [{"post": .., "reply": ..}, ..]}`, which is also
/// the shape handed to the classifier as thread context.
///
/// # Examples
///
/// ```
/// use bluejay_core::{ThreadMemory, MAX_HISTORY};
///
/// let mut memory = ThreadMemory::default();
/// for i in 0..10 {
///     memory.record(&format!("post {i}"), &format!("reply {i}"));
/// }
/// assert_eq!(memory.history().len(), MAX_HISTORY);
/// assert_eq!(memory.history()[0].post, "post 4");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMemory {
    #[serde(default)]
    history: Vec<Interaction>,
}

impl ThreadMemory {
    /// Interactions, oldest first.
    pub fn history(&self) -> &[Interaction] {
        &self.history
    }

    /// Append an interaction, truncating both texts and evicting the oldest
    /// entries beyond [`MAX_HISTORY`].
    pub fn record(&mut self, post: &str, reply: &str) {
        self.history.push(Interaction {
            post: truncate_chars(post, MAX_INTERACTION_CHARS).to_string(),
            reply: truncate_chars(reply, MAX_INTERACTION_CHARS).to_string(),
        });
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }

    /// JSON form passed to the classifier.
    pub fn to_context(&self) -> serde_json::Value {
        serde_json::json!({ "history": self.history })
    }
}
