//! Process assembly.

use crate::config::BluejayConfig;
use bluejay_bot::{AdminService, ApiState, BotWorker, create_router};
use bluejay_core::BotProfile;
use bluejay_database::{InMemoryStore, SqliteStore};
use bluejay_error::{BluejayResult, ConfigError};
use bluejay_interface::{BotStore, Classifier, Transport};
use bluejay_models::OpenAiClassifier;
use bluejay_rate_limit::SlidingWindowLimiter;
use bluejay_security::ApprovalPolicy;
use bluejay_social::{BlueskyClient, BlueskyConfig, DryRunTransport};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

/// A bot profile with its logged-in transport.
pub type ConnectedBot = (BotProfile, Arc<dyn Transport>);

/// Loaded configuration plus the store every component shares.
pub struct App {
    config: BluejayConfig,
    store: Arc<dyn BotStore>,
    dry_run: bool,
}

impl App {
    /// Open the SQLite store, or an in-memory one for a dry run.
    ///
    /// # Errors
    ///
    /// Returns a database error if the store cannot be opened.
    pub fn open(config: BluejayConfig, dry_run: bool) -> BluejayResult<Self> {
        let store: Arc<dyn BotStore> = if dry_run {
            info!("Dry run: using an in-memory store, nothing will be posted");
            Arc::new(InMemoryStore::new())
        } else {
            let path = config.settings.runtime.database_path();
            info!(path = %path.display(), "Opening store");
            Arc::new(SqliteStore::open(path)?)
        };
        Ok(Self {
            config,
            store,
            dry_run,
        })
    }

    /// Assemble around an existing store.
    pub fn with_store(config: BluejayConfig, store: Arc<dyn BotStore>) -> Self {
        Self {
            config,
            store,
            dry_run: false,
        }
    }

    /// Loaded configuration.
    pub fn config(&self) -> &BluejayConfig {
        &self.config
    }

    /// Shared store.
    pub fn store(&self) -> Arc<dyn BotStore> {
        Arc::clone(&self.store)
    }

    /// Configured bot with `handle`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for unknown handles.
    pub fn bot(&self, handle: &str) -> Result<&BotProfile, ConfigError> {
        self.config
            .bot(handle)
            .ok_or_else(|| ConfigError::new(format!("Unknown bot: {}", handle)))
    }

    /// Log `bot` in; wrapped so nothing is posted on a dry run.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the password is missing and the
    /// transport error when login fails.
    #[instrument(skip(self, bot), fields(bot = %bot.handle()))]
    pub async fn connect(&self, bot: &BotProfile) -> BluejayResult<Arc<dyn Transport>> {
        let password = self.config.bot_password(bot)?;
        let config = BlueskyConfig::new(bot.login_identifier(), password, bot.service().as_deref());
        let client: Arc<dyn Transport> = Arc::new(BlueskyClient::login(config).await?);
        info!("Logged in");
        if self.dry_run {
            Ok(Arc::new(DryRunTransport::new(client)))
        } else {
            Ok(client)
        }
    }

    /// Log every configured bot in.
    ///
    /// # Errors
    ///
    /// Fails on the first bot that cannot log in.
    pub async fn connect_all(&self) -> BluejayResult<Vec<ConnectedBot>> {
        let mut connected = Vec::with_capacity(self.config.bots.len());
        for bot in &self.config.bots {
            let transport = self.connect(bot).await?;
            connected.push((bot.clone(), transport));
        }
        Ok(connected)
    }

    /// The classifier configured in `[settings.classifier]`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the API key is missing or the prompt
    /// file cannot be read.
    pub fn classifier(&self) -> Result<Arc<dyn Classifier>, ConfigError> {
        Ok(Arc::new(OpenAiClassifier::new(
            &self.config.settings.classifier,
        )?))
    }

    /// One worker per connected bot, sharing a single LLM limiter.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a worker cannot be built.
    pub fn workers(
        &self,
        connected: &[ConnectedBot],
        classifier: Arc<dyn Classifier>,
    ) -> Result<Vec<BotWorker>, ConfigError> {
        let settings = &self.config.settings.runtime;
        let llm_limiter = Arc::new(SlidingWindowLimiter::per_minute(
            *settings.llm_rate_limit_per_minute(),
        ));
        connected
            .iter()
            .map(|(profile, transport)| {
                BotWorker::builder()
                    .profile(profile.clone())
                    .transport(Arc::clone(transport))
                    .classifier(Arc::clone(&classifier))
                    .store(self.store())
                    .llm_limiter(Arc::clone(&llm_limiter))
                    .settings(settings.clone())
                    .build()
            })
            .collect()
    }

    /// Admin service over every configured bot; only `connected` bots can
    /// have replies approved.
    pub fn admin(&self, connected: &[ConnectedBot]) -> AdminService {
        let policy = ApprovalPolicy::new(*self.config.settings.runtime.approval_mode());
        connected.iter().fold(
            AdminService::new(self.store(), policy, self.config.bots.clone()),
            |admin, (profile, transport)| {
                admin.with_transport(profile.handle().clone(), Arc::clone(transport))
            },
        )
    }
}

/// Bind the admin listener.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the address cannot be bound.
pub async fn bind_admin(bind: &str) -> Result<TcpListener, ConfigError> {
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|e| ConfigError::new(format!("Cannot bind admin server to {}: {}", bind, e)))?;
    info!(bind = %bind, "Admin server listening");
    Ok(listener)
}

/// Serve the admin router on `listener` until `shutdown` resolves.
pub async fn serve_admin<F>(listener: TcpListener, state: ApiState, shutdown: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Err(e) = axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
    {
        error!(error = %e, "Admin server stopped");
    }
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => error!(error = %e, "Cannot listen for Ctrl-C, shutting down"),
    }
}
