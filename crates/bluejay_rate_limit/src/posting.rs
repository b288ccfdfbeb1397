//! Dual minute/hour posting limiter.

use crate::window::EventWindow;
use bluejay_core::RateLimitConfig;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug)]
struct Windows {
    minute: EventWindow,
    hour: EventWindow,
}

/// A bot's posting budget over a trailing minute and a trailing hour.
///
/// Both windows sit behind one lock, so a reservation takes a slot in both or
/// in neither.
///
/// # Examples
///
/// ```
/// use bluejay_core::RateLimitConfig;
/// use bluejay_rate_limit::PostingLimiter;
///
/// let limiter = PostingLimiter::new(RateLimitConfig { max_per_minute: 1, max_per_hour: 100 });
/// assert!(limiter.try_reserve());
/// assert!(!limiter.has_capacity());
/// ```
#[derive(Debug)]
pub struct PostingLimiter {
    windows: Mutex<Windows>,
}

impl PostingLimiter {
    /// Create a limiter from a bot's rate-limit settings.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(Windows {
                minute: EventWindow::new(config.max_per_minute, Duration::from_secs(60)),
                hour: EventWindow::new(config.max_per_hour, Duration::from_secs(3600)),
            }),
        }
    }

    /// Peek: whether both windows have room. Never consumes.
    pub fn has_capacity(&self) -> bool {
        self.has_capacity_at(Instant::now())
    }

    /// Take one slot in both windows, or none.
    pub fn try_reserve(&self) -> bool {
        self.try_reserve_at(Instant::now())
    }

    /// [`has_capacity`](Self::has_capacity) at an explicit instant.
    pub fn has_capacity_at(&self, now: Instant) -> bool {
        let mut windows = self.windows.lock();
        // Evaluate both so each window is pruned.
        let minute = windows.minute.has_capacity(now);
        let hour = windows.hour.has_capacity(now);
        minute && hour
    }

    /// [`try_reserve`](Self::try_reserve) at an explicit instant.
    pub fn try_reserve_at(&self, now: Instant) -> bool {
        let mut windows = self.windows.lock();
        let minute = windows.minute.has_capacity(now);
        let hour = windows.hour.has_capacity(now);
        if minute && hour {
            windows.minute.record(now);
            windows.hour.record(now);
            true
        } else {
            debug!(minute_full = !minute, hour_full = !hour, "Posting window full");
            false
        }
    }
}
