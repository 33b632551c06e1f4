//! Backend Call Rate Limiter
//!
//! Enforces a minimum spacing between generation calls.
//!
//! ## Policy
//!
//! ```text
//! interval = base + overload_signals * increment
//! ```
//!
//! The interval only grows, up to a ceiling of one day. Once the backend
//! reports quota exhaustion the limiter stays conservative for the rest of
//! the process lifetime.
//!
//! ## Concurrency
//!
//! `reserve` claims the next free slot under a short lock and returns the delay
//! until that slot. The caller sleeps outside the lock, so concurrent requests
//! queue behind each other slot by slot without holding the mutex while waiting.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::constants::rate_limit::MAX_INTERVAL_MS;

const MAX_INTERVAL: Duration = Duration::from_millis(MAX_INTERVAL_MS);

/// All mutable state in a single struct so slot claims and interval reads agree
#[derive(Debug)]
struct LimiterState {
    last_call: Option<Instant>,
    interval: Duration,
    overload_signals: u32,
}

/// Minimum-spacing rate limiter shared by all request tasks.
pub struct RateLimiter {
    base: Duration,
    increment: Duration,
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    pub fn new(base: Duration, increment: Duration) -> Self {
        let base = base.min(MAX_INTERVAL);
        Self {
            base,
            increment,
            state: Mutex::new(LimiterState {
                last_call: None,
                interval: base,
                overload_signals: 0,
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_interval_ms),
            Duration::from_millis(config.overload_increment_ms),
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LimiterState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim the next call slot without blocking.
    ///
    /// Returns how long the caller must wait before calling the backend. The
    /// slot is recorded as the new `last_call` immediately.
    pub fn reserve(&self) -> Duration {
        let now = Instant::now();
        let mut state = self.lock();

        let slot = match state.last_call {
            Some(last) => std::cmp::max(now, last + state.interval),
            None => now,
        };
        state.last_call = Some(slot);

        slot.saturating_duration_since(now)
    }

    /// Wait until at least one interval has passed since the previous call.
    pub async fn wait_for_next_call(&self) {
        let delay = self.reserve();
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "Rate limiting backend call");
            sleep(delay).await;
        }
    }

    /// Widen the interval after a quota/overload signal.
    ///
    /// Returns the new interval.
    pub fn on_overload_signal(&self) -> Duration {
        let mut state = self.lock();
        state.interval = state.interval.saturating_add(self.increment).min(MAX_INTERVAL);
        state.overload_signals = state.overload_signals.saturating_add(1);

        warn!(
            interval_ms = state.interval.as_millis() as u64,
            signals = state.overload_signals,
            "Backend overloaded, widening call interval"
        );

        state.interval
    }

    /// Current minimum spacing between calls
    pub fn min_call_interval(&self) -> Duration {
        self.lock().interval
    }

    /// Initial spacing before any overload signal
    pub fn base_interval(&self) -> Duration {
        self.base
    }

    /// Number of overload signals received so far
    pub fn overload_signals(&self) -> u32 {
        self.lock().overload_signals
    }

    /// Timestamp of the most recently claimed slot
    pub fn last_call(&self) -> Option<Instant> {
        self.lock().last_call
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn limiter() -> RateLimiter {
        RateLimiter::new(Duration::from_secs(2), Duration::from_secs(2))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_call_is_immediate() {
        let limiter = limiter();
        assert_eq!(limiter.reserve(), Duration::ZERO);
        assert!(limiter.last_call().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_call_waits_full_interval() {
        let limiter = limiter();
        limiter.reserve();
        assert_eq!(limiter.reserve(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_interval_elapsed() {
        let limiter = limiter();
        limiter.reserve();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(limiter.reserve(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_elapsed_waits_remainder() {
        let limiter = limiter();
        limiter.reserve();
        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(limiter.reserve(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_next_call_sleeps() {
        let limiter = limiter();
        let start = Instant::now();

        limiter.wait_for_next_call().await;
        limiter.wait_for_next_call().await;

        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[test]
    fn test_overload_monotonicity() {
        let limiter = limiter();
        let mut previous = limiter.min_call_interval();

        for n in 1..=5u32 {
            let widened = limiter.on_overload_signal();
            assert!(widened > previous);
            assert_eq!(
                widened,
                limiter.base_interval() + Duration::from_secs(2) * n
            );
            previous = widened;
        }

        assert_eq!(limiter.overload_signals(), 5);
        assert_eq!(limiter.min_call_interval(), Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_intervals_are_capped() {
        let limiter = RateLimiter::new(Duration::MAX, Duration::MAX);
        assert_eq!(limiter.min_call_interval(), MAX_INTERVAL);

        limiter.reserve();
        assert_eq!(limiter.on_overload_signal(), MAX_INTERVAL);
        assert_eq!(limiter.on_overload_signal(), MAX_INTERVAL);
        assert_eq!(limiter.reserve(), MAX_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overload_widens_next_wait() {
        let limiter = limiter();
        limiter.reserve();
        limiter.on_overload_signal();
        assert_eq!(limiter.reserve(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_reservations_get_distinct_slots() {
        let limiter = Arc::new(limiter());

        let mut delays: Vec<Duration> = futures::future::join_all(
            (0..4).map(|_| {
                let limiter = Arc::clone(&limiter);
                async move { limiter.reserve() }
            }),
        )
        .await;
        delays.sort();

        assert_eq!(
            delays,
            vec![
                Duration::ZERO,
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(6),
            ]
        );
    }
}
