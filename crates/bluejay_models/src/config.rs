//! Classifier settings.

use bluejay_error::ConfigError;
use bluejay_rate_limit::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// System prompt used when no prompt file is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// `[settings.classifier]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct OpenAiClassifierConfig {
    /// Chat model name
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// API root, without the `/chat/completions` suffix
    base_url: String,
    /// Environment variable holding the API key
    api_key_env: String,
    /// Optional file holding the system prompt
    system_prompt_path: Option<PathBuf>,
    /// Attempts per classification, including the first
    max_attempts: u32,
    /// First backoff delay in milliseconds
    initial_backoff_ms: u64,
    /// Backoff ceiling in seconds
    max_backoff_secs: u64,
    /// Deadline for all attempts in seconds
    total_timeout_secs: u64,
}

impl Default for OpenAiClassifierConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            system_prompt_path: None,
            max_attempts: 3,
            initial_backoff_ms: 1000,
            max_backoff_secs: 10,
            total_timeout_secs: 60,
        }
    }
}

impl OpenAiClassifierConfig {
    /// Point the classifier at another endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read the API key from another variable.
    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = name.into();
        self
    }

    /// Load the system prompt from a file.
    pub fn with_system_prompt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.system_prompt_path = Some(path.into());
        self
    }

    /// Override the retry schedule.
    pub fn with_retry(
        mut self,
        max_attempts: u32,
        initial_backoff_ms: u64,
        total_timeout_secs: u64,
    ) -> Self {
        self.max_attempts = max_attempts;
        self.initial_backoff_ms = initial_backoff_ms;
        self.total_timeout_secs = total_timeout_secs;
        self
    }

    /// The retry policy described by this section.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_secs(self.max_backoff_secs),
            Duration::from_secs(self.total_timeout_secs),
        )
    }

    /// The API key from the configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the variable is unset or empty.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::new(format!("{} is not set", self.api_key_env))),
        }
    }

    /// The system prompt: file contents when configured, else the default.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configured file cannot be read.
    pub fn system_prompt(&self) -> Result<String, ConfigError> {
        let Some(path) = &self.system_prompt_path else {
            return Ok(DEFAULT_SYSTEM_PROMPT.to_string());
        };
        let prompt = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::new(format!(
                "Cannot read system prompt {}: {}",
                path.display(),
                e
            ))
        })?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            Ok(DEFAULT_SYSTEM_PROMPT.to_string())
        } else {
            Ok(prompt.to_string())
        }
    }
}
