//! Sliding-window event limiter.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::trace;

/// Event timestamps inside one trailing window.
#[derive(Debug)]
pub(crate) struct EventWindow {
    max_events: usize,
    window: Duration,
    events: VecDeque<Instant>,
}

impl EventWindow {
    pub(crate) fn new(max_events: u32, window: Duration) -> Self {
        Self {
            max_events: max_events as usize,
            window,
            events: VecDeque::with_capacity(max_events as usize),
        }
    }

    /// Drop events older than the window. An event exactly `window` old
    /// still counts.
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.events.front() {
            if now.saturating_duration_since(oldest) > self.window {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }

    pub(crate) fn has_capacity(&mut self, now: Instant) -> bool {
        self.prune(now);
        self.events.len() < self.max_events
    }

    pub(crate) fn record(&mut self, now: Instant) {
        self.events.push_back(now);
    }

    pub(crate) fn len(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.events.len()
    }
}

/// Tracks events in a trailing time window.
///
/// # Examples
///
/// ```
/// use bluejay_rate_limit::SlidingWindowLimiter;
/// use std::time::Duration;
///
/// let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60));
/// assert!(limiter.try_reserve());
/// assert!(limiter.can_accept());
/// assert!(limiter.try_reserve());
/// assert!(!limiter.can_accept());
/// assert!(!limiter.try_reserve());
/// ```
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    inner: Mutex<EventWindow>,
}

impl SlidingWindowLimiter {
    /// Allow at most `max_events` in any trailing `window`.
    pub fn new(max_events: u32, window: Duration) -> Self {
        Self {
            inner: Mutex::new(EventWindow::new(max_events, window)),
        }
    }

    /// Per-minute limiter.
    pub fn per_minute(max_events: u32) -> Self {
        Self::new(max_events, Duration::from_secs(60))
    }

    /// Whether a reservation would currently succeed. Never records an event.
    pub fn can_accept(&self) -> bool {
        self.can_accept_at(Instant::now())
    }

    /// Record an event if capacity is available.
    pub fn try_reserve(&self) -> bool {
        self.try_reserve_at(Instant::now())
    }

    /// [`can_accept`](Self::can_accept) at an explicit instant.
    pub fn can_accept_at(&self, now: Instant) -> bool {
        self.inner.lock().has_capacity(now)
    }

    /// [`try_reserve`](Self::try_reserve) at an explicit instant.
    pub fn try_reserve_at(&self, now: Instant) -> bool {
        let mut window = self.inner.lock();
        if window.has_capacity(now) {
            window.record(now);
            true
        } else {
            trace!(max = window.max_events, "Sliding window full");
            false
        }
    }

    /// Events currently inside the window.
    pub fn in_window(&self) -> usize {
        self.inner.lock().len(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_accept_does_not_consume() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        for _ in 0..5 {
            assert!(limiter.can_accept_at(now));
        }
        assert!(limiter.try_reserve_at(now));
        assert!(!limiter.can_accept_at(now));
    }

    #[test]
    fn test_events_expire_after_window() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.try_reserve_at(start));

        // Exactly one window later the event still counts.
        assert!(!limiter.try_reserve_at(start + Duration::from_secs(60)));
        assert!(limiter.try_reserve_at(start + Duration::from_secs(61)));
    }

    #[test]
    fn test_failed_reservation_does_not_mutate() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();
        assert!(limiter.try_reserve_at(start));
        assert!(limiter.try_reserve_at(start + Duration::from_secs(5)));
        assert!(!limiter.try_reserve_at(start + Duration::from_secs(6)));
        // Only the first event has expired; the rejected call left no trace.
        assert!(limiter.try_reserve_at(start + Duration::from_secs(11)));
        assert!(!limiter.try_reserve_at(start + Duration::from_secs(12)));
    }

    #[test]
    fn test_zero_capacity_never_accepts() {
        let limiter = SlidingWindowLimiter::per_minute(0);
        assert!(!limiter.can_accept());
        assert!(!limiter.try_reserve());
    }
}
