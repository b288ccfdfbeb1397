//! Approval mode resolution.

use bluejay_core::BotProfile;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Value of an admin approval override.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalMode {
    /// Replies wait for a human
    On,
    /// Replies go out directly
    Off,
}

impl ApprovalMode {
    /// Parse a stored override; anything but `on`/`off` is ignored.
    pub fn from_override(value: &str) -> Option<Self> {
        match value {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            _ => None,
        }
    }

    /// Whether approval is required in this mode.
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for ApprovalMode {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// Three-tier precedence: admin override, then bot setting, then global default.
///
/// # Examples
///
/// ```
/// use bluejay_security::approval_required;
///
/// assert!(approval_required(Some("on"), Some(false), false));
/// assert!(!approval_required(Some("off"), Some(true), true));
/// assert!(approval_required(Some("maybe"), Some(true), false));
/// assert!(approval_required(None, None, true));
/// ```
pub fn approval_required(
    override_value: Option<&str>,
    bot_setting: Option<bool>,
    global_default: bool,
) -> bool {
    override_value
        .and_then(ApprovalMode::from_override)
        .map(ApprovalMode::is_on)
        .or(bot_setting)
        .unwrap_or(global_default)
}

/// Resolves approval mode for bots against a global default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalPolicy {
    global_default: bool,
}

impl ApprovalPolicy {
    /// Create a policy with the configured global default.
    pub fn new(global_default: bool) -> Self {
        Self { global_default }
    }

    /// State key holding the admin override for `handle`.
    pub fn override_key(handle: &str) -> String {
        format!("approval.{handle}")
    }

    /// Whether `bot` needs approval, given the stored override (if any).
    pub fn is_required(&self, bot: &BotProfile, override_value: Option<&str>) -> bool {
        let required = approval_required(override_value, *bot.approval_mode(), self.global_default);
        trace!(bot = %bot.handle(), ?override_value, required, "Resolved approval mode");
        required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_chain() {
        assert!(!approval_required(None, Some(false), true));
        assert!(approval_required(None, Some(true), false));
        assert!(!approval_required(None, None, false));
        assert!(!approval_required(Some("off"), None, true));
        assert!(approval_required(Some(""), None, true));
    }

    #[test]
    fn test_override_values() {
        assert_eq!(ApprovalMode::from_override("on"), Some(ApprovalMode::On));
        assert_eq!(ApprovalMode::from_override("ON"), None);
        assert_eq!(ApprovalMode::On.to_string(), "on");
        assert_eq!(ApprovalMode::from(false), ApprovalMode::Off);
    }

    #[test]
    fn test_policy_uses_bot_setting() {
        let bot = BotProfile::builder()
            .handle("helper.bsky.social")
            .approval_mode(Some(true))
            .build()
            .unwrap();
        let policy = ApprovalPolicy::new(false);
        assert!(policy.is_required(&bot, None));
        assert!(!policy.is_required(&bot, Some("off")));
        assert_eq!(
            ApprovalPolicy::override_key("helper.bsky.social"),
            "approval.helper.bsky.social"
        );
    }
}
