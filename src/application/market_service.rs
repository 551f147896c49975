//! Market Service
//!
//! Screen-level use cases on top of the DexScreener client:
//! - token list and dashboard: one free-text search per chain, run
//!   concurrently, each failure replaced by an empty result, then
//!   aggregated and truncated
//! - boosted feeds: latest and top fetched together
//! - token detail: all pairs of a token plus synthetic chart points

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use super::refresh::ScreenState;
use crate::adapters::dexscreener::{ApiError, DexScreenerClient, ReqwestTransport};
use crate::domain::aggregator::{TokenAggregator, DEFAULT_MIN_VOLUME_USD};
use crate::domain::price_history::{base_price, synthetic_history, TimeFrame};
use crate::domain::token::Token;
use crate::ports::http::HttpTransport;
use crate::ports::models::{BoostedToken, RawPair, SearchResult, TokenProfile};

/// Chains searched when building the token list
pub const DEFAULT_CHAINS: [&str; 7] = [
    "ethereum",
    "bsc",
    "polygon",
    "arbitrum",
    "optimism",
    "avalanche",
    "solana",
];

pub const DEFAULT_TOKEN_LIST_LIMIT: usize = 200;
pub const DEFAULT_DASHBOARD_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    pub chains: Vec<String>,
    pub min_volume_usd: f64,
    pub token_list_limit: usize,
    pub dashboard_limit: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            chains: DEFAULT_CHAINS.iter().map(|c| c.to_string()).collect(),
            min_volume_usd: DEFAULT_MIN_VOLUME_USD,
            token_list_limit: DEFAULT_TOKEN_LIST_LIMIT,
            dashboard_limit: DEFAULT_DASHBOARD_LIMIT,
        }
    }
}

/// Latest and top boosted tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoostedFeeds {
    pub latest: Vec<BoostedToken>,
    pub top: Vec<BoostedToken>,
}

/// Everything the detail view shows for one token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetail {
    pub chain_id: String,
    pub token_address: String,
    /// Every pair trading the token, empty when the lookup failed
    pub pairs: Vec<RawPair>,
    pub timeframe: TimeFrame,
    /// Synthetic chart points around the current price
    pub price_history: Vec<f64>,
}

impl TokenDetail {
    /// Pair the detail view headlines, the first one returned
    pub fn primary_pair(&self) -> Option<&RawPair> {
        self.pairs.first()
    }
}

pub struct MarketService<T = ReqwestTransport> {
    client: DexScreenerClient<T>,
    aggregator: TokenAggregator,
    config: MarketConfig,
}

impl<T: HttpTransport> MarketService<T> {
    pub fn new(client: DexScreenerClient<T>, config: MarketConfig) -> Self {
        let aggregator = TokenAggregator::with_min_volume(config.min_volume_usd);
        Self {
            client,
            aggregator,
            config,
        }
    }

    /// Search every configured chain concurrently and flatten the pairs.
    /// A failed chain contributes nothing.
    pub async fn chain_pairs(&self) -> Vec<RawPair> {
        let searches = self
            .config
            .chains
            .iter()
            .map(|chain| async move {
                match self.client.search_pairs(chain).await {
                    Ok(result) => result,
                    Err(e) => {
                        log_fallback(&format!("Search for chain {}", chain), &e);
                        SearchResult::empty()
                    }
                }
            });

        let pairs: Vec<RawPair> = join_all(searches)
            .await
            .into_iter()
            .flat_map(|result| result.pairs)
            .collect();

        tracing::debug!(
            "Fetched {} pairs across {} chains",
            pairs.len(),
            self.config.chains.len()
        );
        pairs
    }

    /// Aggregated tokens across all chains, capped at `limit`
    pub async fn tokens(&self, limit: usize) -> Vec<Token> {
        let pairs = self.chain_pairs().await;
        let mut tokens = self.aggregator.aggregate(&pairs);
        tokens.truncate(limit);
        tokens
    }

    /// Token list screen
    pub async fn token_list(&self) -> Vec<Token> {
        self.tokens(self.config.token_list_limit).await
    }

    /// Dashboard screen
    pub async fn dashboard(&self) -> Vec<Token> {
        self.tokens(self.config.dashboard_limit).await
    }

    /// Refresh the dashboard into `screen`. Returns whether the result was
    /// published.
    pub async fn refresh_dashboard(&self, screen: &ScreenState<Vec<Token>>) -> bool {
        self.client.evict_expired().await;
        let ticket = screen.begin();
        let tokens = self.dashboard().await;
        screen.complete::<ApiError>(ticket, Ok(tokens))
    }

    /// Latest and top boosted tokens, fetched concurrently. Either failing
    /// fails the whole call.
    pub async fn boosted(&self) -> Result<BoostedFeeds, ApiError> {
        let (latest, top) = tokio::try_join!(
            self.client.latest_boosted_tokens(),
            self.client.top_boosted_tokens()
        )?;
        Ok(BoostedFeeds { latest, top })
    }

    pub async fn profiles(&self) -> Result<Vec<TokenProfile>, ApiError> {
        self.client.latest_token_profiles().await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<RawPair>, ApiError> {
        Ok(self.client.search_pairs(query).await?.pairs)
    }

    /// Pairs for a token, or an error for callers that need to tell
    /// "no pairs" from "lookup failed"
    pub async fn token_pairs(&self, chain_id: &str, token_address: &str) -> Result<Vec<RawPair>, ApiError> {
        self.client.token_pairs(chain_id, token_address).await
    }

    /// Detail view data. Lookup failures degrade to an empty pair list.
    pub async fn token_detail(&self, chain_id: &str, token_address: &str, timeframe: TimeFrame) -> TokenDetail {
        let pairs = match self.client.token_pairs(chain_id, token_address).await {
            Ok(pairs) => pairs,
            Err(e) => {
                log_fallback(&format!("Pair lookup for {} on {}", token_address, chain_id), &e);
                Vec::new()
            }
        };

        let price_history = base_price(pairs.first().and_then(|p| p.price_usd.as_deref()))
            .map(|price| synthetic_history(price, timeframe))
            .unwrap_or_default();
        TokenDetail {
            chain_id: chain_id.to_string(),
            token_address: token_address.to_string(),
            pairs,
            timeframe,
            price_history,
        }
    }

    pub fn client(&self) -> &DexScreenerClient<T> {
        &self.client
    }
}

/// Transient failures are expected under load and only warned about.
/// Anything else points at a bad response or a broken client.
fn log_fallback(what: &str, error: &ApiError) {
    if error.is_transient() {
        tracing::warn!("{} failed, using empty result: {}", what, error);
    } else {
        tracing::error!("{} failed permanently, using empty result: {}", what, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::dexscreener::{search_endpoint, DexScreenerConfig, TOKEN_PAIRS_PATH};
    use crate::ports::http::{HttpResponse, TransportError};
    use crate::ports::mocks::MockTransport;
    use approx::assert_relative_eq;

    fn service(transport: MockTransport, chains: &[&str]) -> MarketService<MockTransport> {
        let config = DexScreenerConfig {
            base_url: "https://dex.test".to_string(),
            ..Default::default()
        };
        MarketService::new(
            DexScreenerClient::with_transport(config, transport),
            MarketConfig {
                chains: chains.iter().map(|c| c.to_string()).collect(),
                ..Default::default()
            },
        )
    }

    fn pair_json(address: &str, chain: &str, volume: f64) -> String {
        format!(
            r#"{{"chainId":"{}","pairAddress":"{}-p","baseToken":{{"address":"{}","symbol":"{}"}},"priceUsd":"2.5","volume":{{"h24":{}}},"liquidity":{{"usd":10}}}}"#,
            chain, address, address, address, volume
        )
    }

    fn search_body(pairs: &[String]) -> String {
        format!(r#"{{"schemaVersion":"1.0.0","pairs":[{}]}}"#, pairs.join(","))
    }

    #[tokio::test]
    async fn test_token_list_merges_chains_and_filters() {
        let transport = MockTransport::new()
            .with_json(
                &search_endpoint("ethereum"),
                &search_body(&[pair_json("0xA", "ethereum", 600.0), pair_json("0xB", "ethereum", 50.0)]),
            )
            .with_json(
                &search_endpoint("bsc"),
                &search_body(&[pair_json("0xA", "ethereum", 700.0), pair_json("0xC", "bsc", 5000.0)]),
            );
        let service = service(transport, &["ethereum", "bsc"]);

        let tokens = service.token_list().await;

        let ids: Vec<&str> = tokens.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["0xA-ethereum", "0xC-bsc"]);
        assert_relative_eq!(tokens[0].volume_h24, 1300.0);
        assert_relative_eq!(tokens[0].liquidity_usd, 20.0);
    }

    #[tokio::test]
    async fn test_failed_chain_is_skipped() {
        let transport = MockTransport::new()
            .with_json(&search_endpoint("solana"), &search_body(&[pair_json("S1", "solana", 9000.0)]))
            .with_failure(&search_endpoint("ethereum"), TransportError::Request("timeout".into()))
            .with_response(&search_endpoint("bsc"), HttpResponse::new(500, "oops"));
        let service = service(transport, &["ethereum", "bsc", "solana"]);

        let tokens = service.token_list().await;

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].address, "S1");
    }

    #[tokio::test]
    async fn test_dashboard_truncates() {
        let pairs: Vec<String> = (0..30).map(|i| pair_json(&format!("T{}", i), "solana", 2000.0)).collect();
        let transport = MockTransport::new().with_json(&search_endpoint("solana"), &search_body(&pairs));
        let service = service(transport, &["solana"]);

        let dashboard = service.dashboard().await;
        assert_eq!(dashboard.len(), DEFAULT_DASHBOARD_LIMIT);
        assert_eq!(dashboard[0].address, "T0");

        // Served from cache
        assert_eq!(service.tokens(5).await.len(), 5);
        assert_eq!(service.client().transport().get_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_dashboard_publishes() {
        let transport = MockTransport::new()
            .with_json(&search_endpoint("solana"), &search_body(&[pair_json("S1", "solana", 9000.0)]));
        let service = service(transport, &["solana"]);
        let screen = ScreenState::new();

        assert!(service.refresh_dashboard(&screen).await);
        assert_eq!(screen.current().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_boosted_feeds() {
        let transport = MockTransport::new()
            .with_json("/token-boosts/latest/v1", r#"[{"chainId":"solana","tokenAddress":"A","amount":10}]"#)
            .with_json("/token-boosts/top/v1", r#"{"data":[{"chainId":"bsc","tokenAddress":"B","totalAmount":500}]}"#);
        let service = service(transport, &[]);

        let feeds = service.boosted().await.unwrap();

        assert_eq!(feeds.latest.len(), 1);
        assert_eq!(feeds.top[0].token_address.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_boosted_fails_when_one_feed_fails() {
        let transport = MockTransport::new()
            .with_json("/token-boosts/latest/v1", "[]")
            .with_response("/token-boosts/top/v1", HttpResponse::new(503, ""));
        let service = service(transport, &[]);

        assert!(matches!(service.boosted().await, Err(ApiError::HttpError(503))));
    }

    #[tokio::test]
    async fn test_token_detail() {
        let path = format!("{}/solana/MINT", TOKEN_PAIRS_PATH);
        let transport = MockTransport::new().with_json(&path, &format!("[{}]", pair_json("MINT", "solana", 1.0)));
        let service = service(transport, &[]);

        let detail = service.token_detail("solana", "MINT", TimeFrame::OneWeek).await;

        assert_eq!(detail.pairs.len(), 1);
        assert_eq!(detail.primary_pair().unwrap().pair_address.as_deref(), Some("MINT-p"));
        assert_eq!(detail.price_history.len(), 7);
        assert!(detail.price_history.iter().all(|p| (2.375..=2.625).contains(p)));
    }

    #[tokio::test]
    async fn test_token_detail_degrades_to_empty() {
        let service = service(MockTransport::new(), &[]);

        let detail = service.token_detail("solana", "MISSING", TimeFrame::OneDay).await;

        assert!(detail.pairs.is_empty());
        assert_eq!(detail.price_history.len(), 24);
        assert!(service.token_pairs("solana", "MISSING").await.is_err());
    }

    #[tokio::test]
    async fn test_token_detail_unparseable_price_has_no_chart() {
        let path = format!("{}/solana/MINT", TOKEN_PAIRS_PATH);
        let body = r#"[{"chainId":"solana","pairAddress":"MINT-p","baseToken":{"address":"MINT","symbol":"MINT"},"priceUsd":"n/a"}]"#;
        let service = service(MockTransport::new().with_json(&path, body), &[]);

        let detail = service.token_detail("solana", "MINT", TimeFrame::OneMonth).await;

        assert_eq!(detail.pairs.len(), 1);
        assert!(detail.price_history.is_empty());
    }
}
