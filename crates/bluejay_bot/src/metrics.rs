//! Metrics collection for bot cycles.

use crate::worker::CycleReport;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Process-wide counters, shared by clones.
#[derive(Debug, Clone)]
pub struct BotMetrics {
    inner: Arc<BotMetricsInner>,
}

#[derive(Debug)]
struct BotMetricsInner {
    cycles: AtomicU64,
    cycle_failures: AtomicU64,
    replies_posted: AtomicU64,
    replies_pending: AtomicU64,
    replies_retry: AtomicU64,
    drained: AtomicU64,
    gone: AtomicU64,
    llm_throttled: AtomicU64,
    last_success: parking_lot::Mutex<Option<Instant>>,
}

impl Default for BotMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl BotMetrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BotMetricsInner {
                cycles: AtomicU64::new(0),
                cycle_failures: AtomicU64::new(0),
                replies_posted: AtomicU64::new(0),
                replies_pending: AtomicU64::new(0),
                replies_retry: AtomicU64::new(0),
                drained: AtomicU64::new(0),
                gone: AtomicU64::new(0),
                llm_throttled: AtomicU64::new(0),
                last_success: parking_lot::Mutex::new(None),
            }),
        }
    }

    /// Records a completed worker cycle.
    pub fn record_cycle(&self, report: &CycleReport) {
        let inner = &self.inner;
        inner.cycles.fetch_add(1, Ordering::Relaxed);
        inner
            .replies_posted
            .fetch_add(report.posted as u64, Ordering::Relaxed);
        inner
            .replies_pending
            .fetch_add(report.queued_pending as u64, Ordering::Relaxed);
        inner
            .replies_retry
            .fetch_add(report.queued_retry as u64, Ordering::Relaxed);
        inner
            .drained
            .fetch_add(report.drain.posted as u64, Ordering::Relaxed);
        inner.gone.fetch_add(report.drain.gone as u64, Ordering::Relaxed);
        inner
            .llm_throttled
            .fetch_add(report.throttled as u64, Ordering::Relaxed);
        *inner.last_success.lock() = Some(Instant::now());
    }

    /// Records a worker cycle that errored or panicked.
    pub fn record_cycle_failure(&self) {
        self.inner.cycles.fetch_add(1, Ordering::Relaxed);
        self.inner.cycle_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the cycle count, failures included.
    pub fn cycles(&self) -> u64 {
        self.inner.cycles.load(Ordering::Relaxed)
    }

    /// Gets the failed cycle count.
    pub fn cycle_failures(&self) -> u64 {
        self.inner.cycle_failures.load(Ordering::Relaxed)
    }

    /// Creates a serializable snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = &self.inner;
        MetricsSnapshot {
            cycles: inner.cycles.load(Ordering::Relaxed),
            cycle_failures: inner.cycle_failures.load(Ordering::Relaxed),
            replies_posted: inner.replies_posted.load(Ordering::Relaxed),
            replies_pending: inner.replies_pending.load(Ordering::Relaxed),
            replies_retry: inner.replies_retry.load(Ordering::Relaxed),
            drained: inner.drained.load(Ordering::Relaxed),
            gone: inner.gone.load(Ordering::Relaxed),
            llm_throttled: inner.llm_throttled.load(Ordering::Relaxed),
            seconds_since_success: inner.last_success.lock().map(|i| i.elapsed().as_secs()),
        }
    }
}

/// Serializable snapshot of [`BotMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Worker cycles run
    pub cycles: u64,
    /// Cycles that errored or panicked
    pub cycle_failures: u64,
    /// Replies posted straight away
    pub replies_posted: u64,
    /// Replies queued for approval
    pub replies_pending: u64,
    /// Replies queued for rate-limit capacity
    pub replies_retry: u64,
    /// Retry items posted by drains
    pub drained: u64,
    /// Retry items whose target disappeared
    pub gone: u64,
    /// Candidates dropped by the LLM throttle
    pub llm_throttled: u64,
    /// Seconds since the last successful cycle
    pub seconds_since_success: Option<u64>,
}
