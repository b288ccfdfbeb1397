//! Logging initialisation.

use bluejay_error::ConfigError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. With `json`
/// set, events are written as JSON lines.
///
/// # Errors
///
/// Returns a [`ConfigError`] if `RUST_LOG` is malformed or a subscriber is
/// already installed.
pub fn init_logging(json: bool) -> Result<(), ConfigError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(&directives)
            .map_err(|e| ConfigError::new(format!("Invalid RUST_LOG '{}': {}", directives, e)))?,
        Err(_) => EnvFilter::new("info"),
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };
    result.map_err(|e| ConfigError::new(format!("Failed to initialise logging: {}", e)))
}
