//! Flow control for the Bluejay bot engine.
//!
//! - [`SlidingWindowLimiter`]: exact trailing-window event counter with a
//!   peek-only [`can_accept`](SlidingWindowLimiter::can_accept) and an atomic
//!   [`try_reserve`](SlidingWindowLimiter::try_reserve)
//! - [`PostingLimiter`]: a bot's minute and hour windows, reserved together
//! - [`RetryPolicy`]: bounded attempts with exponential backoff and an
//!   overall deadline, used around classifier calls
//!
//! Limiter state lives in memory only; a restart resets capacity.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod posting;
mod retry;
mod window;

pub use posting::PostingLimiter;
pub use retry::RetryPolicy;
pub use window::SlidingWindowLimiter;
