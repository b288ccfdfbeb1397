//! Bot profile configuration types.

use serde::{Deserialize, Serialize};

/// Persona parameters used to post-process generated replies.
///
/// # Examples
///
/// ```
/// use bluejay_core::Persona;
///
/// let persona = Persona::default();
/// assert_eq!(persona.tone, "warm");
/// assert_eq!(persona.emoji_density, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Persona {
    /// Free-form tone hint forwarded to the classifier
    pub tone: String,
    /// Number of emoji glyphs appended to each reply
    pub emoji_density: u32,
    /// 0 = casual (contractions), 1 = unchanged, 2+ = formal (expanded)
    pub formality: u32,
    /// Humour hint forwarded to the classifier
    pub humour: u32,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            tone: "warm".to_string(),
            emoji_density: 1,
            formality: 1,
            humour: 1,
        }
    }
}

/// Posting limits for one bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum posts in any trailing 60 seconds
    pub max_per_minute: u32,
    /// Maximum posts in any trailing hour
    pub max_per_hour: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_minute: 10,
            max_per_hour: 100,
        }
    }
}

/// A set of user, phrase and hashtag rules.
///
/// Used both as a block list and as an allow list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Author handles (case-insensitive)
    pub users: Vec<String>,
    /// Substrings matched case-insensitively against the text
    pub phrases: Vec<String>,
    /// Hashtags, with or without the leading `#`
    pub hashtags: Vec<String>,
}

impl RuleSet {
    /// True when no rule of any kind is present.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.phrases.is_empty() && self.hashtags.is_empty()
    }
}

/// Settings for unprompted (search-driven) replies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyRules {
    /// Whether the bot may reply to content it was not mentioned in
    pub allow_unprompted: bool,
    /// Search keywords
    pub keywords: Vec<String>,
}

impl ReplyRules {
    /// Unprompted search runs only when enabled and at least one keyword is set.
    pub fn search_enabled(&self) -> bool {
        self.allow_unprompted && !self.keywords.is_empty()
    }
}

/// Immutable per-process configuration of one bot account.
///
/// # Examples
///
/// ```
/// use bluejay_core::BotProfile;
///
/// let bot = BotProfile::builder()
///     .handle("helper.bsky.social")
///     .build()
///     .unwrap();
///
/// assert_eq!(bot.login_identifier(), "helper.bsky.social");
/// assert_eq!(bot.rate_limit().max_per_minute, 10);
/// assert!(bot.approval_mode().is_none());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into), default)]
pub struct BotProfile {
    /// Account handle, also used as the bot's key everywhere
    handle: String,
    /// Login identifier; falls back to the handle
    #[serde(default)]
    identifier: Option<String>,
    /// Custom PDS URL
    #[serde(default)]
    service: Option<String>,
    /// Name of the environment variable holding the app password
    #[serde(default)]
    app_password_env: Option<String>,
    /// Whether NSFW content may be engaged with
    #[serde(default)]
    nsfw_allowed: bool,
    /// Per-bot approval default; `None` defers to the global setting
    #[serde(default)]
    approval_mode: Option<bool>,
    /// Reply post-processing parameters
    #[serde(default)]
    persona: Persona,
    /// Posting limits
    #[serde(default)]
    rate_limit: RateLimitConfig,
    /// Allow rules for unprompted replies
    #[serde(default)]
    allow: RuleSet,
    /// Block rules for unprompted replies
    #[serde(default)]
    block: RuleSet,
    /// Unprompted reply settings
    #[serde(default)]
    reply_rules: ReplyRules,
}

impl Default for BotProfile {
    fn default() -> Self {
        Self {
            handle: String::new(),
            identifier: None,
            service: None,
            app_password_env: None,
            nsfw_allowed: false,
            approval_mode: None,
            persona: Persona::default(),
            rate_limit: RateLimitConfig::default(),
            allow: RuleSet::default(),
            block: RuleSet::default(),
            reply_rules: ReplyRules::default(),
        }
    }
}

impl BotProfile {
    /// Creates a new profile builder.
    pub fn builder() -> BotProfileBuilder {
        BotProfileBuilder::default()
    }

    /// The identifier used to log in.
    pub fn login_identifier(&self) -> &str {
        self.identifier.as_deref().unwrap_or(&self.handle)
    }

    /// Environment variable holding the app password.
    ///
    /// Defaults to the handle upper-cased with non-alphanumerics replaced by
    /// `_`, suffixed with `_APP_PASSWORD`.
    pub fn password_env(&self) -> String {
        match &self.app_password_env {
            Some(name) => name.clone(),
            None => {
                let stem: String = self
                    .handle
                    .chars()
                    .map(|c| {
                        if c.is_ascii_alphanumeric() {
                            c.to_ascii_uppercase()
                        } else {
                            '_'
                        }
                    })
                    .collect();
                format!("{stem}_APP_PASSWORD")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults_from_minimal_document() {
        let bot: BotProfile = from_json(r#"{"handle": "a.bsky.social"}"#);
        assert_eq!(bot.persona(), &Persona::default());
        assert_eq!(bot.rate_limit().max_per_hour, 100);
        assert!(bot.allow().is_empty());
        assert!(!bot.reply_rules().search_enabled());
    }

    #[test]
    fn test_password_env_derivation() {
        let bot = BotProfile::builder()
            .handle("helper.bsky.social")
            .build()
            .unwrap();
        assert_eq!(bot.password_env(), "HELPER_BSKY_SOCIAL_APP_PASSWORD");

        let bot = BotProfile::builder()
            .handle("helper.bsky.social")
            .app_password_env(Some("PW".to_string()))
            .build()
            .unwrap();
        assert_eq!(bot.password_env(), "PW");
    }

    #[test]
    fn test_search_requires_keywords() {
        let rules = ReplyRules {
            allow_unprompted: true,
            keywords: vec![],
        };
        assert!(!rules.search_enabled());
    }

    fn from_json(json: &str) -> BotProfile {
        serde_json::from_str(json).unwrap()
    }
}
