use bluejay_rate_limit::SlidingWindowLimiter;
use proptest::prelude::*;
use std::time::{Duration, Instant};

proptest! {
    #[test]
    fn reservations_never_exceed_capacity_in_any_window(
        max in 1u32..6,
        window_ms in 10u64..500,
        gaps in prop::collection::vec(0u64..200, 1..200),
    ) {
        let limiter = SlidingWindowLimiter::new(max, Duration::from_millis(window_ms));
        let start = Instant::now();
        let mut offset = 0u64;
        let mut accepted = Vec::new();

        for gap in gaps {
            offset += gap;
            if limiter.try_reserve_at(start + Duration::from_millis(offset)) {
                accepted.push(offset);
            }
        }

        for &t in &accepted {
            let in_window = accepted
                .iter()
                .filter(|&&s| s <= t && t - s <= window_ms)
                .count();
            prop_assert!(in_window <= max as usize);
        }
    }

    #[test]
    fn peeking_never_changes_the_outcome(
        max in 1u32..4,
        peeks in 0usize..10,
    ) {
        let limiter = SlidingWindowLimiter::new(max, Duration::from_secs(60));
        let now = Instant::now();
        for _ in 0..peeks {
            limiter.can_accept_at(now);
        }
        let reserved = (0..max + 2).filter(|_| limiter.try_reserve_at(now)).count();
        prop_assert_eq!(reserved, max as usize);
    }
}

#[test]
fn limiter_is_shareable_across_threads() {
    let limiter = std::sync::Arc::new(SlidingWindowLimiter::per_minute(50));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let limiter = limiter.clone();
            std::thread::spawn(move || (0..20).filter(|_| limiter.try_reserve()).count())
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 50);
    assert_eq!(limiter.in_window(), 50);
}
