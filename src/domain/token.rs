//! Canonical token record
//!
//! A `Token` is the post-aggregation view of every pair that trades one base
//! token on one chain. Identity is `(address, chain_id)`, rendered as the
//! `"<address>-<chainId>"` key. Tokens are rebuilt on every refresh.

use serde::{Deserialize, Serialize};

use crate::ports::models::RawPair;

/// Canonical token built from one or more raw pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Aggregation key, `"<address>-<chainId>"`
    pub id: String,
    pub symbol: String,
    pub name: String,
    /// Base token address
    pub address: String,
    pub chain_id: String,
    pub logo_uri: Option<String>,
    /// Decimal string as reported by the first pair seen
    pub price_usd: Option<String>,
    /// 24h price change in percent
    pub price_change_h24: f64,
    /// 24h volume in USD, summed across pairs
    pub volume_h24: f64,
    /// Liquidity in USD, summed across pairs
    pub liquidity_usd: f64,
    pub market_cap: Option<f64>,
    /// Address of the first pair seen for this token
    pub pair_address: Option<String>,
    pub dex_id: Option<String>,
    pub url: Option<String>,
    pub quote_symbol: Option<String>,
    pub active_boosts: u32,
}

impl Token {
    /// Aggregation key for a base token on a chain
    pub fn key(address: &str, chain_id: &str) -> String {
        format!("{}-{}", address, chain_id)
    }

    /// Seed a token from its first pair.
    ///
    /// Returns `None` for unusable records: no base token, no base token
    /// address, or no chain.
    pub fn from_pair(pair: &RawPair) -> Option<Self> {
        let base = pair.base_token.as_ref()?;
        let address = pair.base_address()?;
        let chain_id = pair.chain_id.as_deref().filter(|c| !c.is_empty())?;

        Some(Self {
            id: Self::key(address, chain_id),
            symbol: base.symbol.clone().unwrap_or_default(),
            name: base.name.clone().unwrap_or_default(),
            address: address.to_string(),
            chain_id: chain_id.to_string(),
            logo_uri: base.logo_uri.clone(),
            price_usd: pair.price_usd.clone(),
            price_change_h24: pair.price_change_h24().unwrap_or(0.0),
            volume_h24: pair.volume_h24(),
            liquidity_usd: pair.liquidity_usd(),
            market_cap: pair.market_cap,
            pair_address: pair.pair_address.clone(),
            dex_id: pair.dex_id.clone(),
            url: pair.url.clone(),
            quote_symbol: pair.quote_token.as_ref().and_then(|q| q.symbol.clone()),
            active_boosts: base.active_boosts(),
        })
    }

    /// Accumulate volume and liquidity of another pair of the same token
    pub fn absorb(&mut self, pair: &RawPair) {
        self.volume_h24 += pair.volume_h24();
        self.liquidity_usd += pair.liquidity_usd();
    }

    /// Parsed USD price, zero when missing or unparseable
    pub fn price(&self) -> f64 {
        parse_price(self.price_usd.as_deref()).unwrap_or(0.0)
    }
}

/// Parse a decimal price string, rejecting non-finite values
pub fn parse_price(price: Option<&str>) -> Option<f64> {
    price
        .and_then(|p| p.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite())
}
