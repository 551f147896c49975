//! Response Cache
//!
//! Fixed-TTL memoization of parsed API responses keyed by request path.
//! Expired entries are treated as absent and evicted on lookup.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default time-to-live for cached responses (30 seconds)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Cached payload with its insertion time
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub payload: V,
    pub stored_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Valid while strictly younger than `ttl`
    pub fn is_fresh_at(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// TTL cache for API payloads
#[derive(Debug)]
pub struct ResponseCache<V = serde_json::Value> {
    entries: HashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a cache with the default 30 second TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Create a cache with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Get a fresh payload, evicting the entry if it has expired
    pub fn get(&mut self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Same as [`get`](Self::get) with an explicit clock
    pub fn get_at(&mut self, key: &str, now: Instant) -> Option<V> {
        match self.entries.get(key) {
            Some(entry) if entry.is_fresh_at(self.ttl, now) => Some(entry.payload.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a payload, replacing any previous entry
    pub fn set(&mut self, key: impl Into<String>, payload: V) {
        self.set_at(key, payload, Instant::now());
    }

    /// Same as [`set`](Self::set) with an explicit clock
    pub fn set_at(&mut self, key: impl Into<String>, payload: V, now: Instant) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                payload,
                stored_at: now,
            },
        );
    }

    /// Remove expired entries, returning how many were dropped
    pub fn cleanup(&mut self) -> usize {
        let before = self.entries.len();
        let now = Instant::now();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.is_fresh_at(ttl, now));
        before - self.entries.len()
    }

    /// Number of entries (including expired ones not yet looked up)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
