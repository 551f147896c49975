//! DexScreener Adapter
//!
//! Client for the public DexScreener API:
//! - `DexScreenerClient`: cached, rate-limited access to five endpoints
//! - `ResponseCache`: 30 second TTL memoization keyed by request path
//! - `RateLimiter`: sliding 60 second window per endpoint key
//! - `decode`: lenient decoding of pairs, profiles and boosts
//!
//! Endpoint budgets (requests per minute):
//! - token profiles, latest boosts, top boosts: 60
//! - pair search, token pairs: 300

mod cache;
mod client;
mod decode;
mod rate_limiter;
mod transport;

pub use cache::{CacheEntry, ResponseCache, DEFAULT_CACHE_TTL};
pub use client::{
    search_endpoint, ApiError, DexScreenerClient, DexScreenerConfig, BOOSTS_LATEST_PATH,
    BOOSTS_RATE_LIMIT, BOOSTS_TOP_PATH, DEXSCREENER_BASE_URL, PAIRS_RATE_LIMIT,
    PROFILES_RATE_LIMIT, SEARCH_PATH, SEARCH_RATE_LIMIT, TOKEN_PAIRS_PATH, TOKEN_PROFILES_PATH,
};
pub use rate_limiter::{RateLimiter, DEFAULT_RATE_WINDOW};
pub use transport::{ReqwestTransport, DEFAULT_TIMEOUT};
