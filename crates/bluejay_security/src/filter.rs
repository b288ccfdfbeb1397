//! Allow/block filtering for unprompted replies.

use bluejay_core::RuleSet;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, instrument};

/// Substrings that mark a post as political.
pub const POLITICAL_KEYWORDS: &[&str] = &[
    "election",
    "senate",
    "parliament",
    "congress",
    "prime minister",
    "president",
    "vote",
    "voting",
    "policy",
    "campaign",
    "minister",
    "referendum",
    "party",
];

/// Substrings that mark a post as NSFW.
pub const NSFW_KEYWORDS: &[&str] = &[
    "nsfw", "adult", "sex", "sext", "explicit", "nude", "porn", "xxx", "onlyfans",
];

static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("Valid hashtag regex"));

/// Lowercased hashtags in `text`, without the leading `#`.
///
/// # Examples
///
/// ```
/// use bluejay_security::extract_hashtags;
///
/// let tags = extract_hashtags("Look at my #Cats and #dogs!");
/// assert!(tags.contains("cats"));
/// assert!(tags.contains("dogs"));
/// ```
pub fn extract_hashtags(text: &str) -> HashSet<String> {
    HASHTAG
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RejectReason {
    /// Text looks political
    #[display("political content")]
    Political,
    /// Text looks NSFW and the bot does not allow it
    #[display("nsfw content")]
    Nsfw,
    /// Author is on the block list
    #[display("blocked user {}", _0)]
    BlockedUser(String),
    /// Text contains a blocked phrase
    #[display("blocked phrase {}", _0)]
    BlockedPhrase(String),
    /// Text carries a blocked hashtag
    #[display("blocked hashtag #{}", _0)]
    BlockedHashtag(String),
    /// Allow rules exist and none matched
    #[display("not covered by allow rules")]
    NotAllowListed,
    /// Unprompted replies are switched off
    #[display("unprompted replies disabled")]
    UnpromptedDisabled,
}

/// Outcome of [`FilterPolicy::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    /// The candidate may be answered
    Allow,
    /// The candidate must be skipped
    Reject(RejectReason),
}

impl FilterDecision {
    /// Whether the decision is [`FilterDecision::Allow`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Rules with every entry lowercased and hashtags stripped of `#`.
#[derive(Debug, Clone, Default)]
struct NormalizedRules {
    users: HashSet<String>,
    phrases: Vec<String>,
    hashtags: HashSet<String>,
}

impl NormalizedRules {
    fn from_rules(rules: &RuleSet) -> Self {
        Self {
            users: rules.users.iter().map(|u| u.to_lowercase()).collect(),
            phrases: rules
                .phrases
                .iter()
                .map(|p| p.to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            hashtags: rules
                .hashtags
                .iter()
                .map(|h| h.trim_start_matches('#').to_lowercase())
                .collect(),
        }
    }

    fn is_empty(&self) -> bool {
        self.users.is_empty() && self.phrases.is_empty() && self.hashtags.is_empty()
    }

    fn matching_user(&self, author: &str) -> Option<&str> {
        if author.is_empty() {
            return None;
        }
        self.users.get(&author.to_lowercase()).map(String::as_str)
    }

    fn matching_phrase(&self, lowered_text: &str) -> Option<&str> {
        self.phrases
            .iter()
            .find(|p| lowered_text.contains(p.as_str()))
            .map(String::as_str)
    }

    fn matching_hashtag(&self, tags: &HashSet<String>) -> Option<&str> {
        self.hashtags
            .iter()
            .find(|h| tags.contains(h.as_str()))
            .map(String::as_str)
    }
}

/// Decides whether an unprompted candidate may be answered.
///
/// Evaluation short-circuits in a fixed order and block rules win over
/// allow rules:
///
/// 1. political keywords
/// 2. NSFW keywords, unless the bot allows NSFW
/// 3. blocked author
/// 4. blocked phrase
/// 5. blocked hashtag
/// 6. when any allow rule exists, at least one must match
/// 7. finally, unprompted replies must be enabled
///
/// Mentions and replies never go through this filter.
///
/// # Examples
///
/// ```
/// use bluejay_core::RuleSet;
/// use bluejay_security::FilterPolicy;
///
/// let block = RuleSet { users: vec!["alice".into()], ..Default::default() };
/// let policy = FilterPolicy::new(RuleSet::default(), block, false);
///
/// assert!(!policy.allow("hello there", "Alice", true));
/// assert!(policy.allow("hello there", "bob", true));
/// ```
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    allow: NormalizedRules,
    block: NormalizedRules,
    nsfw_allowed: bool,
}

impl FilterPolicy {
    /// Create a policy from a bot's allow and block rules.
    pub fn new(allow: RuleSet, block: RuleSet, nsfw_allowed: bool) -> Self {
        Self {
            allow: NormalizedRules::from_rules(&allow),
            block: NormalizedRules::from_rules(&block),
            nsfw_allowed,
        }
    }

    /// Evaluate a candidate and report why it was rejected, if it was.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn evaluate(&self, text: &str, author: &str, allow_unprompted: bool) -> FilterDecision {
        let lowered = text.to_lowercase();

        let decision = self.check_block(&lowered, text, author).unwrap_or_else(|| {
            if !self.allow.is_empty() && !self.matches_allow(&lowered, text, author) {
                FilterDecision::Reject(RejectReason::NotAllowListed)
            } else if !allow_unprompted {
                FilterDecision::Reject(RejectReason::UnpromptedDisabled)
            } else {
                FilterDecision::Allow
            }
        });

        if let FilterDecision::Reject(reason) = &decision {
            debug!(%reason, "Candidate filtered");
        }
        decision
    }

    /// [`evaluate`](Self::evaluate) reduced to a boolean.
    pub fn allow(&self, text: &str, author: &str, allow_unprompted: bool) -> bool {
        self.evaluate(text, author, allow_unprompted).is_allowed()
    }

    fn check_block(&self, lowered: &str, text: &str, author: &str) -> Option<FilterDecision> {
        let reject = |reason| Some(FilterDecision::Reject(reason));

        if POLITICAL_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            return reject(RejectReason::Political);
        }
        if !self.nsfw_allowed && NSFW_KEYWORDS.iter().any(|k| lowered.contains(k)) {
            return reject(RejectReason::Nsfw);
        }
        if let Some(user) = self.block.matching_user(author) {
            return reject(RejectReason::BlockedUser(user.to_string()));
        }
        if let Some(phrase) = self.block.matching_phrase(lowered) {
            return reject(RejectReason::BlockedPhrase(phrase.to_string()));
        }
        if !self.block.hashtags.is_empty() {
            let tags = extract_hashtags(text);
            if let Some(tag) = self.block.matching_hashtag(&tags) {
                return reject(RejectReason::BlockedHashtag(tag.to_string()));
            }
        }
        None
    }

    fn matches_allow(&self, lowered: &str, text: &str, author: &str) -> bool {
        self.allow.matching_user(author).is_some()
            || self.allow.matching_phrase(lowered).is_some()
            || self.allow.matching_hashtag(&extract_hashtags(text)).is_some()
    }
}

/// One-shot form of [`FilterPolicy::allow`].
pub fn allow_post(
    text: &str,
    author: &str,
    allow_unprompted: bool,
    nsfw_allowed: bool,
    allow: &RuleSet,
    block: &RuleSet,
) -> bool {
    FilterPolicy::new(allow.clone(), block.clone(), nsfw_allowed).allow(
        text,
        author,
        allow_unprompted,
    )
}
