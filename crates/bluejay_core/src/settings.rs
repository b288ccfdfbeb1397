//! Process-wide runtime settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Global settings shared by every worker.
///
/// # Examples
///
/// ```
/// use bluejay_core::RuntimeSettings;
///
/// let settings = RuntimeSettings::default();
/// assert_eq!(*settings.drain_batch_size(), 5);
/// assert_eq!(settings.loop_sleep().as_secs(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Global approval default
    approval_mode: bool,
    /// Classifier calls allowed per minute across all bots
    llm_rate_limit_per_minute: u32,
    /// Pause between cycles
    loop_sleep_seconds: u64,
    /// Retry items drained per cycle
    drain_batch_size: usize,
    /// Notifications fetched per cycle
    notification_limit: usize,
    /// Search results fetched per keyword
    search_limit: usize,
    /// Run one task per bot
    parallel_bots: bool,
    /// SQLite database file
    database_path: PathBuf,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            approval_mode: false,
            llm_rate_limit_per_minute: 20,
            loop_sleep_seconds: 20,
            drain_batch_size: 5,
            notification_limit: 50,
            search_limit: 20,
            parallel_bots: false,
            database_path: PathBuf::from("/var/lib/bluejay/bots.db"),
        }
    }
}

impl RuntimeSettings {
    /// Pause between cycles as a duration.
    pub fn loop_sleep(&self) -> Duration {
        Duration::from_secs(self.loop_sleep_seconds)
    }

    /// Override the global approval default.
    pub fn with_approval_mode(mut self, on: bool) -> Self {
        self.approval_mode = on;
        self
    }

    /// Override the classifier throttle.
    pub fn with_llm_rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.llm_rate_limit_per_minute = limit;
        self
    }

    /// Override the drain batch size.
    pub fn with_drain_batch_size(mut self, size: usize) -> Self {
        self.drain_batch_size = size;
        self
    }

    /// Override parallel execution.
    pub fn with_parallel_bots(mut self, parallel: bool) -> Self {
        self.parallel_bots = parallel;
        self
    }

    /// Override the database location.
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }
}
