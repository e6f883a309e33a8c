//! In-memory sliding-window rate limiter keyed by client identifier.
//!
//! Owned explicitly by [`crate::AppState`] rather than living in ambient
//! process state, and bounded: stale buckets are evicted once the table
//! grows past a threshold, so memory does not grow with the number of
//! distinct clients ever seen.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Bucket count above which a check also sweeps out stale keys.
const EVICTION_SCAN_THRESHOLD: usize = 1024;

/// Sliding-window counter per client key.
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    eviction_threshold: usize,
    buckets: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    /// A limiter accepting `max_requests` per `window` per key.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            eviction_threshold: EVICTION_SCAN_THRESHOLD,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    fn with_eviction_threshold(mut self, threshold: usize) -> Self {
        self.eviction_threshold = threshold;
        self
    }

    /// Record an attempt for `key` now.
    ///
    /// # Returns
    /// `true` when the request is accepted; the timestamp is recorded only
    /// on acceptance.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Time-injected variant of [`RateLimiter::check`].
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut buckets = match self.buckets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if buckets.len() > self.eviction_threshold {
            let window = self.window;
            buckets.retain(|_, timestamps| {
                timestamps
                    .back()
                    .is_some_and(|last| now.duration_since(*last) < window)
            });
        }

        let bucket = buckets.entry(key.to_string()).or_default();
        while let Some(oldest) = bucket.front() {
            if now.duration_since(*oldest) >= self.window {
                bucket.pop_front();
            } else {
                break;
            }
        }

        if bucket.len() >= self.max_requests {
            return false;
        }
        bucket.push_back(now);
        true
    }

    /// Number of client keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        match self.buckets.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RateLimiter;
    use std::time::{Duration, Instant};

    #[test]
    fn sixty_first_request_in_window_is_rejected() {
        let limiter = RateLimiter::new(60, Duration::from_secs(60));
        let base = Instant::now();

        for i in 0..60 {
            assert!(
                limiter.check_at("1.2.3.4", base + Duration::from_millis(i * 10)),
                "request {} should be accepted",
                i + 1
            );
        }
        assert!(!limiter.check_at("1.2.3.4", base + Duration::from_secs(30)));

        // After the window elapses, requests are accepted again.
        assert!(limiter.check_at("1.2.3.4", base + Duration::from_secs(61)));
    }

    #[test]
    fn rejected_requests_do_not_consume_budget() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let base = Instant::now();

        assert!(limiter.check_at("k", base));
        assert!(limiter.check_at("k", base));
        // Rejections record nothing, so the first two entries still define
        // when the window frees up.
        for i in 0..10 {
            assert!(!limiter.check_at("k", base + Duration::from_secs(i)));
        }
        assert!(limiter.check_at("k", base + Duration::from_secs(60)));
    }

    #[test]
    fn distinct_keys_have_independent_budgets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let base = Instant::now();

        assert!(limiter.check_at("a", base));
        assert!(!limiter.check_at("a", base));
        assert!(limiter.check_at("b", base));
    }

    #[test]
    fn stale_keys_are_evicted_once_threshold_is_passed() {
        let limiter =
            RateLimiter::new(10, Duration::from_secs(60)).with_eviction_threshold(8);
        let base = Instant::now();

        for i in 0..16 {
            assert!(limiter.check_at(&format!("client-{i}"), base));
        }
        assert_eq!(limiter.tracked_keys(), 16);

        // A check far past the window sweeps every stale bucket.
        assert!(limiter.check_at("fresh", base + Duration::from_secs(120)));
        assert_eq!(limiter.tracked_keys(), 1);
    }
}
