//! Layered TOML configuration.

use bluejay_core::{BotProfile, RuntimeSettings};
use bluejay_error::ConfigError;
use bluejay_models::OpenAiClassifierConfig;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, instrument};

/// Environment variable prefix for overrides, e.g.
/// `BLUEJAY__SETTINGS__LOOP_SLEEP_SECONDS=5`.
const ENV_PREFIX: &str = "BLUEJAY";
const ENV_SEPARATOR: &str = "__";

/// Root of `bluejay.toml`.
///
/// # Examples
///
/// ```no_run
/// use bluejay::BluejayConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BluejayConfig::load("bluejay.toml")?;
/// config.validate()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BluejayConfig {
    /// `[settings]`
    #[serde(default)]
    pub settings: SettingsSection,
    /// `[admin]`
    #[serde(default)]
    pub admin: AdminConfig,
    /// `[logging]`
    #[serde(default)]
    pub logging: LoggingConfig,
    /// `[[bots]]`
    #[serde(default)]
    pub bots: Vec<BotProfile>,
}

/// `[settings]`: runtime settings plus the classifier subsection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSection {
    /// Loop, limiter and storage settings
    #[serde(flatten)]
    pub runtime: RuntimeSettings,
    /// `[settings.classifier]`
    #[serde(default)]
    pub classifier: OpenAiClassifierConfig,
}

/// `[admin]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Listen address of the admin HTTP server; disabled when absent
    #[serde(default)]
    pub bind: Option<String>,
}

/// `[logging]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl BluejayConfig {
    /// Load `path` with `BLUEJAY__*` environment overrides on top.
    ///
    /// The bot list is checked structurally; credentials are checked by
    /// [`validate_credentials`](Self::validate_credentials).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is missing or malformed, or if
    /// the bot list is invalid.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true);
        let config = Self::build(
            Config::builder()
                .add_source(File::from(path.as_ref()))
                .add_source(env),
            path.as_ref(),
        )?;
        config.validate_bots()?;
        Ok(config)
    }

    /// Load `path` alone, without environment overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is missing or malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(
            Config::builder().add_source(File::from(path.as_ref())),
            path.as_ref(),
        )
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        debug!("Loading configuration");
        let config: Self = builder
            .build()
            .map_err(|e| {
                ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.display(),
                    e
                ))
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        debug!(bots = config.bots.len(), "Configuration loaded");
        Ok(config)
    }

    /// Full startup validation against the process environment.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_bots()?;
        self.validate_credentials(env_lookup)
    }

    /// At least one bot, non-empty unique handles, positive rate limits.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate_bots(&self) -> Result<(), ConfigError> {
        if self.bots.is_empty() {
            return Err(ConfigError::new("No bots configured"));
        }
        let mut handles = HashSet::new();
        for (index, bot) in self.bots.iter().enumerate() {
            if bot.handle().trim().is_empty() {
                return Err(ConfigError::new(format!(
                    "Bot #{} has an empty handle",
                    index + 1
                )));
            }
            if !handles.insert(bot.handle().as_str()) {
                return Err(ConfigError::new(format!(
                    "Bot {} is configured twice",
                    bot.handle()
                )));
            }
            let limits = bot.rate_limit();
            if limits.max_per_minute == 0 || limits.max_per_hour == 0 {
                return Err(ConfigError::new(format!(
                    "Rate limits for {} must be positive",
                    bot.handle()
                )));
            }
        }
        if *self.settings.runtime.llm_rate_limit_per_minute() == 0 {
            return Err(ConfigError::new(
                "settings.llm_rate_limit_per_minute must be positive",
            ));
        }
        Ok(())
    }

    /// Every bot's app password and the classifier API key are present.
    ///
    /// `lookup` resolves an environment variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns the first missing variable.
    pub fn validate_credentials<F>(&self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for bot in &self.bots {
            self.bot_password_with(bot, &lookup)?;
        }
        let key_env = self.settings.classifier.api_key_env();
        match lookup(key_env.as_str()) {
            Some(value) if !value.is_empty() => Ok(()),
            _ => Err(ConfigError::new(format!("{} is not set", key_env))),
        }
    }

    /// Look up the configured bot with `handle`.
    pub fn bot(&self, handle: &str) -> Option<&BotProfile> {
        self.bots.iter().find(|b| b.handle() == handle)
    }

    /// App password of `bot` from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the variable is unset or empty.
    pub fn bot_password(&self, bot: &BotProfile) -> Result<String, ConfigError> {
        self.bot_password_with(bot, &env_lookup)
    }

    fn bot_password_with<F>(&self, bot: &BotProfile, lookup: &F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let name = bot.password_env();
        match lookup(name.as_str()) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ConfigError::new(format!(
                "{} is not set (app password for {})",
                name,
                bot.handle()
            ))),
        }
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluejay_core::RateLimitConfig;

    fn bot(handle: &str) -> BotProfile {
        BotProfile::builder().handle(handle).build().unwrap()
    }

    #[test]
    fn test_no_bots_rejected() {
        let err = BluejayConfig::default().validate_bots().unwrap_err();
        assert!(err.message.contains("No bots configured"));
    }

    #[test]
    fn test_duplicate_and_empty_handles_rejected() {
        let mut config = BluejayConfig {
            bots: vec![bot("a.bsky.social"), bot("a.bsky.social")],
            ..Default::default()
        };
        assert!(config.validate_bots().unwrap_err().message.contains("twice"));

        config.bots = vec![bot("  ")];
        assert!(config.validate_bots().unwrap_err().message.contains("empty handle"));
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let config = BluejayConfig {
            bots: vec![
                BotProfile::builder()
                    .handle("a.bsky.social")
                    .rate_limit(RateLimitConfig {
                        max_per_minute: 0,
                        max_per_hour: 100,
                    })
                    .build()
                    .unwrap(),
            ],
            ..Default::default()
        };
        assert!(config.validate_bots().unwrap_err().message.contains("positive"));
    }

    #[test]
    fn test_credentials_checked_per_bot_then_api_key() {
        let config = BluejayConfig {
            bots: vec![bot("a.bsky.social")],
            ..Default::default()
        };

        let err = config.validate_credentials(|_| None).unwrap_err();
        assert!(err.message.contains("A_BSKY_SOCIAL_APP_PASSWORD"));

        let err = config
            .validate_credentials(|name| {
                (name == "A_BSKY_SOCIAL_APP_PASSWORD").then(|| "secret".to_string())
            })
            .unwrap_err();
        assert!(err.message.contains("OPENAI_API_KEY"));

        assert!(
            config
                .validate_credentials(|_| Some("set".to_string()))
                .is_ok()
        );
    }
}
