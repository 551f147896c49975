//! Sliding-window rate limiter
//!
//! Tracks request timestamps per endpoint key and admits a request only while
//! fewer than `limit` requests were made in the trailing window (60 seconds by
//! default). Denied requests are not recorded.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default sliding window length
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(60);

/// Per-endpoint sliding window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    /// Admitted request timestamps, oldest first
    requests: HashMap<String, Vec<Instant>>,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter with the default 60 second window
    pub fn new() -> Self {
        Self::with_window(DEFAULT_RATE_WINDOW)
    }

    /// Create a limiter with a custom window
    pub fn with_window(window: Duration) -> Self {
        Self {
            requests: HashMap::new(),
            window,
        }
    }

    /// Check whether a request to `endpoint` may be made now, recording it if so
    pub fn can_make_request(&mut self, endpoint: &str, limit: u32) -> bool {
        self.can_make_request_at(endpoint, limit, Instant::now())
    }

    /// Same as [`can_make_request`](Self::can_make_request) with an explicit clock
    pub fn can_make_request_at(&mut self, endpoint: &str, limit: u32, now: Instant) -> bool {
        let window = self.window;
        let history = self.requests.entry(endpoint.to_string()).or_default();

        history.retain(|&time| now.saturating_duration_since(time) < window);

        let admitted = history.len() < limit as usize;
        if admitted {
            history.push(now);
        } else {
            tracing::warn!(
                "Rate limit reached for {}: {}/{} in {:?}",
                endpoint,
                history.len(),
                limit,
                window
            );
        }

        if history.is_empty() {
            self.requests.remove(endpoint);
        }
        admitted
    }

    /// Forget history older than the window, dropping keys left empty
    pub fn prune(&mut self) {
        self.prune_at(Instant::now());
    }

    pub fn prune_at(&mut self, now: Instant) {
        let window = self.window;
        self.requests.retain(|_, history| {
            history.retain(|&time| now.saturating_duration_since(time) < window);
            !history.is_empty()
        });
    }

    /// Time until the oldest counted request leaves the window
    pub fn retry_after_at(&self, endpoint: &str, now: Instant) -> Option<Duration> {
        self.requests
            .get(endpoint)?
            .iter()
            .find(|&&time| now.saturating_duration_since(time) < self.window)
            .map(|&oldest| self.window - now.saturating_duration_since(oldest))
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_admitted() {
        let mut limiter = RateLimiter::new();
        assert!(limiter.can_make_request("/token-boosts/top/v1", 60));
    }

    #[test]
    fn test_limit_then_deny() {
        let mut limiter = RateLimiter::new();
        let t0 = Instant::now();

        for _ in 0..60 {
            assert!(limiter.can_make_request_at("boosts", 60, t0));
        }
        assert!(!limiter.can_make_request_at("boosts", 60, t0));
        assert!(!limiter.can_make_request_at("boosts", 60, t0 + Duration::from_secs(59)));
        assert_eq!(limiter.requests["boosts"].len(), 60);
    }

    #[test]
    fn test_admitted_again_after_oldest_ages_out() {
        let mut limiter = RateLimiter::new();
        let t0 = Instant::now();

        assert!(limiter.can_make_request_at("search", 2, t0));
        assert!(limiter.can_make_request_at("search", 2, t0 + Duration::from_secs(10)));
        assert!(!limiter.can_make_request_at("search", 2, t0 + Duration::from_secs(30)));

        // first request leaves the window at exactly 60s
        assert!(limiter.can_make_request_at("search", 2, t0 + Duration::from_secs(60)));
        assert!(!limiter.can_make_request_at("search", 2, t0 + Duration::from_secs(61)));
    }

    #[test]
    fn test_denied_request_not_recorded() {
        let mut limiter = RateLimiter::new();
        let t0 = Instant::now();

        assert!(limiter.can_make_request_at("pairs", 1, t0));
        for i in 1..10 {
            assert!(!limiter.can_make_request_at("pairs", 1, t0 + Duration::from_secs(i)));
        }
        assert_eq!(limiter.requests["pairs"].len(), 1);
        assert_eq!(
            limiter.retry_after_at("pairs", t0 + Duration::from_secs(10)),
            Some(Duration::from_secs(50))
        );
        assert!(limiter.can_make_request_at("pairs", 1, t0 + Duration::from_secs(60)));
    }

    #[test]
    fn test_endpoints_are_independent() {
        let mut limiter = RateLimiter::new();
        let t0 = Instant::now();

        assert!(limiter.can_make_request_at("a", 1, t0));
        assert!(!limiter.can_make_request_at("a", 1, t0));
        assert!(limiter.can_make_request_at("b", 1, t0));
    }

    #[test]
    fn test_zero_limit_always_denies() {
        let mut limiter = RateLimiter::new();
        assert!(!limiter.can_make_request("x", 0));
        assert!(limiter.requests.is_empty());
    }

    #[test]
    fn test_prune_drops_idle_keys() {
        let mut limiter = RateLimiter::new();
        let t0 = Instant::now();

        for i in 0..50 {
            assert!(limiter.can_make_request_at(&format!("/latest/dex/search?q={}", i), 300, t0));
        }
        assert!(limiter.can_make_request_at("fresh", 1, t0 + Duration::from_secs(30)));
        assert_eq!(limiter.requests.len(), 51);

        limiter.prune_at(t0 + Duration::from_secs(60));

        assert_eq!(limiter.requests.len(), 1);
        assert!(limiter.requests.contains_key("fresh"));
    }

    #[test]
    fn test_expired_key_removed_on_next_check() {
        let mut limiter = RateLimiter::new();
        let t0 = Instant::now();

        assert!(limiter.can_make_request_at("a", 1, t0));
        assert!(!limiter.can_make_request_at("b", 0, t0 + Duration::from_secs(61)));
        assert!(!limiter.requests.contains_key("b"));
        assert!(limiter.requests.contains_key("a"));
    }

    #[test]
    fn test_retry_after() {
        let mut limiter = RateLimiter::with_window(Duration::from_secs(10));
        let t0 = Instant::now();

        assert!(limiter.retry_after_at("x", t0).is_none());
        limiter.can_make_request_at("x", 1, t0);
        assert_eq!(
            limiter.retry_after_at("x", t0 + Duration::from_secs(4)),
            Some(Duration::from_secs(6))
        );
        assert!(limiter.retry_after_at("x", t0 + Duration::from_secs(10)).is_none());
    }

    #[test]
    fn test_short_window_real_clock() {
        let mut limiter = RateLimiter::with_window(Duration::from_millis(20));

        assert!(limiter.can_make_request("x", 1));
        assert!(!limiter.can_make_request("x", 1));

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.can_make_request("x", 1));
    }
}
