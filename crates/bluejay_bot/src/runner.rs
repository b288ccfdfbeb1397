//! Outer scheduling loop.

use crate::metrics::BotMetrics;
use crate::worker::BotWorker;
use bluejay_core::RuntimeSettings;
use bluejay_error::ConfigError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, instrument};

/// Outcome of one pass over every worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Workers whose cycle completed
    pub succeeded: usize,
    /// Workers whose cycle errored or panicked
    pub failed: usize,
}

/// Runs every worker once per period.
///
/// Each worker cycle runs in its own task, so an error or a panic in one bot
/// is logged and counted without touching the others.
#[derive(Debug)]
pub struct BotRunner {
    workers: Vec<Arc<BotWorker>>,
    parallel: bool,
    loop_sleep: Duration,
    metrics: BotMetrics,
}

impl BotRunner {
    /// Create a runner.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when there are no workers.
    pub fn new(
        workers: Vec<BotWorker>,
        settings: &RuntimeSettings,
        metrics: BotMetrics,
    ) -> Result<Self, ConfigError> {
        if workers.is_empty() {
            return Err(ConfigError::new("No bots configured"));
        }
        Ok(Self {
            workers: workers.into_iter().map(Arc::new).collect(),
            parallel: *settings.parallel_bots(),
            loop_sleep: settings.loop_sleep(),
            metrics,
        })
    }

    /// The managed workers.
    pub fn workers(&self) -> &[Arc<BotWorker>] {
        &self.workers
    }

    /// Shared metrics.
    pub fn metrics(&self) -> &BotMetrics {
        &self.metrics
    }

    /// Run every worker once; in parallel when configured, else in order.
    #[instrument(skip(self), fields(workers = self.workers.len(), parallel = self.parallel))]
    pub async fn run_cycle(&self) -> CycleSummary {
        let mut summary = CycleSummary::default();

        if self.parallel {
            let mut tasks = JoinSet::new();
            for worker in &self.workers {
                let worker = Arc::clone(worker);
                tasks.spawn(async move {
                    let handle = worker.handle().to_string();
                    (handle, worker.run_once().await)
                });
            }
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((_, Ok(report))) => {
                        self.metrics.record_cycle(&report);
                        summary.succeeded += 1;
                    }
                    Ok((bot, Err(e))) => {
                        error!(bot = %bot, error = %e, "Worker crashed");
                        self.metrics.record_cycle_failure();
                        summary.failed += 1;
                    }
                    Err(e) => {
                        error!(error = %e, "Worker task panicked");
                        self.metrics.record_cycle_failure();
                        summary.failed += 1;
                    }
                }
            }
        } else {
            for worker in &self.workers {
                let task = {
                    let worker = Arc::clone(worker);
                    tokio::spawn(async move { worker.run_once().await })
                };
                match task.await {
                    Ok(Ok(report)) => {
                        self.metrics.record_cycle(&report);
                        summary.succeeded += 1;
                    }
                    Ok(Err(e)) => {
                        error!(bot = %worker.handle(), error = %e, "Worker crashed");
                        self.metrics.record_cycle_failure();
                        summary.failed += 1;
                    }
                    Err(e) => {
                        error!(bot = %worker.handle(), error = %e, "Worker task panicked");
                        self.metrics.record_cycle_failure();
                        summary.failed += 1;
                    }
                }
            }
        }

        summary
    }

    /// Run cycles every `loop_sleep_seconds` until `shutdown` resolves.
    ///
    /// A cycle in progress is finished before shutting down.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(period_secs = self.loop_sleep.as_secs(), "Runner started");
        loop {
            self.run_cycle().await;
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.loop_sleep) => {}
            }
        }
        info!("Runner stopped");
    }
}
