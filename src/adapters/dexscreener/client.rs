//! DexScreener API Client
//!
//! Every request goes through the same pipeline: response cache, then the
//! per-endpoint rate limiter, then the network. The cache key and the rate
//! limiter key are both the endpoint path including its query string, so
//! distinct queries are cached and budgeted separately. Cache hits never
//! consume rate-limit budget.

use std::sync::Arc;
use std::time::{Duration, Instant};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

use super::cache::{ResponseCache, DEFAULT_CACHE_TTL};
use super::rate_limiter::{RateLimiter, DEFAULT_RATE_WINDOW};
use super::transport::{ReqwestTransport, DEFAULT_TIMEOUT};
use super::decode::{list_records, pair_records, search_result};
use crate::ports::http::{HttpTransport, TransportError};
use crate::ports::models::{BoostedToken, RawPair, SearchResult, TokenProfile};

/// Public DexScreener API host
pub const DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com";

pub const TOKEN_PROFILES_PATH: &str = "/token-profiles/latest/v1";
pub const BOOSTS_LATEST_PATH: &str = "/token-boosts/latest/v1";
pub const BOOSTS_TOP_PATH: &str = "/token-boosts/top/v1";
pub const SEARCH_PATH: &str = "/latest/dex/search";
pub const TOKEN_PAIRS_PATH: &str = "/token/pairs";

/// Requests per minute for profile and boost endpoints
pub const PROFILES_RATE_LIMIT: u32 = 60;
pub const BOOSTS_RATE_LIMIT: u32 = 60;
/// Requests per minute for search and pair endpoints
pub const SEARCH_RATE_LIMIT: u32 = 300;
pub const PAIRS_RATE_LIMIT: u32 = 300;

/// API client errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Rate limit exceeded for {}, retry in {}s", .endpoint, .retry_after.as_secs().max(1))]
    RateLimitExceeded { endpoint: String, retry_after: Duration },
    #[error("HTTP error: status {0}")]
    HttpError(u16),
    #[error("Network error: {0}")]
    Network(#[from] TransportError),
    #[error("Failed to parse response: {0}")]
    Parse(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ApiError {
    /// Failures a caller should treat as transient and fall back from
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::RateLimitExceeded { .. } | ApiError::Network(_) => true,
            ApiError::HttpError(status) => *status == 429 || *status >= 500,
            ApiError::Parse(_) | ApiError::Client(_) => false,
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    /// Base host, without trailing slash
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Response cache time-to-live
    pub cache_ttl: Duration,
    /// Rate limiter sliding window
    pub rate_window: Duration,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            base_url: DEXSCREENER_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            rate_window: DEFAULT_RATE_WINDOW,
        }
    }
}

/// Rate-limited, caching DexScreener client
///
/// Clones share the same cache and rate limiter.
#[derive(Debug, Clone)]
pub struct DexScreenerClient<T = ReqwestTransport> {
    config: DexScreenerConfig,
    transport: T,
    cache: Arc<Mutex<ResponseCache>>,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl DexScreenerClient<ReqwestTransport> {
    /// Create a client with default configuration
    pub fn new() -> Result<Self, ApiError> {
        Self::with_config(DexScreenerConfig::default())
    }

    /// Create a client with custom configuration over reqwest
    pub fn with_config(config: DexScreenerConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.timeout)
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: HttpTransport> DexScreenerClient<T> {
    /// Create a client over any transport
    pub fn with_transport(config: DexScreenerConfig, transport: T) -> Self {
        let cache = Arc::new(Mutex::new(ResponseCache::with_ttl(config.cache_ttl)));
        let rate_limiter = Arc::new(Mutex::new(RateLimiter::with_window(config.rate_window)));

        Self {
            config,
            transport,
            cache,
            rate_limiter,
        }
    }

    /// Latest token profiles
    pub async fn latest_token_profiles(&self) -> Result<Vec<TokenProfile>, ApiError> {
        let payload = self.request(TOKEN_PROFILES_PATH, PROFILES_RATE_LIMIT).await?;
        Ok(list_records(&payload))
    }

    /// Most recently boosted tokens
    pub async fn latest_boosted_tokens(&self) -> Result<Vec<BoostedToken>, ApiError> {
        let payload = self.request(BOOSTS_LATEST_PATH, BOOSTS_RATE_LIMIT).await?;
        Ok(list_records(&payload))
    }

    /// Tokens with the most active boosts
    pub async fn top_boosted_tokens(&self) -> Result<Vec<BoostedToken>, ApiError> {
        let payload = self.request(BOOSTS_TOP_PATH, BOOSTS_RATE_LIMIT).await?;
        Ok(list_records(&payload))
    }

    /// Free-text pair search. Blank queries return nothing without any I/O.
    pub async fn search_pairs(&self, query: &str) -> Result<SearchResult, ApiError> {
        if query.trim().is_empty() {
            return Ok(SearchResult::empty());
        }

        let endpoint = search_endpoint(query);
        let payload = self.request(&endpoint, SEARCH_RATE_LIMIT).await?;
        Ok(search_result(&payload))
    }

    /// All pairs trading a token on one chain
    pub async fn token_pairs(&self, chain_id: &str, token_address: &str) -> Result<Vec<RawPair>, ApiError> {
        let endpoint = format!("{}/{}/{}", TOKEN_PAIRS_PATH, chain_id, token_address);
        let payload = self.request(&endpoint, PAIRS_RATE_LIMIT).await?;
        Ok(pair_records(&payload))
    }

    /// Cache, then rate limit, then network
    async fn request(&self, endpoint: &str, rate_limit: u32) -> Result<Value, ApiError> {
        if let Some(cached) = self.cache.lock().await.get(endpoint) {
            tracing::debug!("Cache hit: {}", endpoint);
            return Ok(cached);
        }

        {
            let mut limiter = self.rate_limiter.lock().await;
            if !limiter.can_make_request(endpoint, rate_limit) {
                let retry_after = limiter
                    .retry_after_at(endpoint, Instant::now())
                    .unwrap_or(self.config.rate_window);
                return Err(ApiError::RateLimitExceeded {
                    endpoint: endpoint.to_string(),
                    retry_after,
                });
            }
        }

        let url = format!("{}{}", self.config.base_url, endpoint);
        tracing::debug!("GET {}", url);

        let response = self.transport.get(&url).await?;
        if !response.is_success() {
            tracing::warn!("DexScreener returned {} for {}", response.status, endpoint);
            return Err(ApiError::HttpError(response.status));
        }

        let payload: Value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Parse(format!("{}: {}", endpoint, e)))?;

        self.cache.lock().await.set(endpoint, payload.clone());
        Ok(payload)
    }

    /// Drop expired responses and rate-limit history that has left the
    /// window. Long-running callers invoke this between refreshes.
    pub async fn evict_expired(&self) {
        let evicted = self.cache.lock().await.cleanup();
        self.rate_limiter.lock().await.prune();
        if evicted > 0 {
            tracing::debug!("Evicted {} expired responses", evicted);
        }
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

/// `/latest/dex/search?q=<query>` with the query percent-encoded
pub fn search_endpoint(query: &str) -> String {
    format!("{}?q={}", SEARCH_PATH, encode_component(query))
}

/// Marks that `encodeURIComponent` leaves as-is but form encoding escapes
const UNRESERVED_MARKS: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%7E", "~"),
];

/// Percent-encode a query component the way browsers' `encodeURIComponent`
/// does: spaces as `%20`, and `!'()*-._~` kept literal
fn encode_component(value: &str) -> String {
    // form encoding turns spaces into '+' and escapes literal '+' as %2B
    let encoded = url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    UNRESERVED_MARKS
        .iter()
        .fold(encoded, |acc, (escaped, mark)| acc.replace(escaped, mark))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::http::HttpResponse;
    use crate::ports::mocks::MockTransport;

    fn client(transport: MockTransport) -> DexScreenerClient<MockTransport> {
        let config = DexScreenerConfig {
            base_url: "https://dex.test".to_string(),
            ..Default::default()
        };
        DexScreenerClient::with_transport(config, transport)
    }

    #[test]
    fn test_config_default() {
        let config = DexScreenerConfig::default();
        assert_eq!(config.base_url, "https://api.dexscreener.com");
        assert_eq!(config.cache_ttl, Duration::from_secs(30));
        assert_eq!(config.rate_window, Duration::from_secs(60));
    }

    #[test]
    fn test_client_creation() {
        assert!(DexScreenerClient::new().is_ok());
    }

    #[test]
    fn test_search_endpoint_encoding() {
        assert_eq!(search_endpoint("solana"), "/latest/dex/search?q=solana");
        assert_eq!(search_endpoint("pepe coin"), "/latest/dex/search?q=pepe%20coin");
        assert_eq!(search_endpoint("a+b&c"), "/latest/dex/search?q=a%2Bb%26c");
        assert_eq!(search_endpoint("wif!(dog)~'"), "/latest/dex/search?q=wif!(dog)~'");
        assert_eq!(search_endpoint("*-._"), "/latest/dex/search?q=*-._");
        assert_eq!(search_endpoint("%21"), "/latest/dex/search?q=%2521");
    }

    #[tokio::test]
    async fn test_boosted_latest_cached() {
        let mock = MockTransport::new().with_json(
            BOOSTS_LATEST_PATH,
            r#"[{"chainId":"solana","tokenAddress":"Mint","amount":100,"totalAmount":500}]"#,
        );
        let client = client(mock.clone());

        let first = client.latest_boosted_tokens().await.unwrap();
        let second = client.latest_boosted_tokens().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].token_address.as_deref(), Some("Mint"));
        assert_eq!(mock.get_calls(), vec!["https://dex.test/token-boosts/latest/v1".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_search_short_circuits() {
        let mock = MockTransport::new();
        let client = client(mock.clone());

        let result = client.search_pairs("   ").await.unwrap();

        assert!(result.pairs.is_empty());
        assert!(mock.get_calls().is_empty());
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mock = MockTransport::new()
            .with_response(BOOSTS_TOP_PATH, HttpResponse::new(503, "unavailable"));
        let client = client(mock);

        let err = client.top_boosted_tokens().await.unwrap_err();
        assert!(matches!(err, ApiError::HttpError(503)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_failed_response_not_cached() {
        let mock = MockTransport::new()
            .with_response(BOOSTS_TOP_PATH, HttpResponse::new(500, ""));
        let client = client(mock.clone());

        assert!(client.top_boosted_tokens().await.is_err());
        assert!(client.top_boosted_tokens().await.is_err());
        assert_eq!(mock.call_count(BOOSTS_TOP_PATH), 2);
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let mock = MockTransport::new().with_json(TOKEN_PROFILES_PATH, "<html>");
        let client = client(mock);

        let err = client.latest_token_profiles().await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_network_error() {
        let mock = MockTransport::new()
            .with_failure(TOKEN_PROFILES_PATH, TransportError::Request("timeout".into()));
        let client = client(mock);

        let err = client.latest_token_profiles().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn test_token_pairs_path() {
        let mock = MockTransport::new()
            .with_json("/token/pairs/ethereum/0xA", r#"[{"chainId":"ethereum"}]"#);
        let client = client(mock.clone());

        let pairs = client.token_pairs("ethereum", "0xA").await.unwrap();

        assert_eq!(pairs.len(), 1);
        assert_eq!(mock.get_calls(), vec!["https://dex.test/token/pairs/ethereum/0xA".to_string()]);
    }

    #[tokio::test]
    async fn test_rate_limit_error_carries_endpoint() {
        let config = DexScreenerConfig {
            base_url: "https://dex.test".to_string(),
            cache_ttl: Duration::ZERO,
            ..Default::default()
        };
        let mock = MockTransport::new().with_json(BOOSTS_TOP_PATH, "[]");
        let client = DexScreenerClient::with_transport(config, mock.clone());

        for _ in 0..BOOSTS_RATE_LIMIT {
            client.top_boosted_tokens().await.unwrap();
        }
        let err = client.top_boosted_tokens().await.unwrap_err();

        assert!(err.is_transient());
        match err {
            ApiError::RateLimitExceeded { endpoint, retry_after } => {
                assert_eq!(endpoint, BOOSTS_TOP_PATH);
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= DEFAULT_RATE_WINDOW);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(mock.call_count(BOOSTS_TOP_PATH), BOOSTS_RATE_LIMIT as usize);
    }

    #[tokio::test]
    async fn test_evict_expired_drops_stale_responses() {
        let config = DexScreenerConfig {
            base_url: "https://dex.test".to_string(),
            cache_ttl: Duration::from_millis(20),
            ..Default::default()
        };
        let mock = MockTransport::new().with_json(BOOSTS_TOP_PATH, "[]");
        let client = DexScreenerClient::with_transport(config, mock.clone());

        client.top_boosted_tokens().await.unwrap();
        assert_eq!(client.cache.lock().await.len(), 1);

        tokio::time::sleep(Duration::from_millis(30)).await;
        client.evict_expired().await;

        assert!(client.cache.lock().await.is_empty());
        client.top_boosted_tokens().await.unwrap();
        assert_eq!(mock.call_count(BOOSTS_TOP_PATH), 2);
    }
}
