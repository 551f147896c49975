//! Raw market data structures exchanged across the ports
//!
//! Every field is optional: upstream payloads are heterogeneous and the
//! aggregation layer decides how missing values default.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Token side of a pair (`baseToken` / `quoteToken`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawToken {
    pub address: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub logo_uri: Option<String>,
    pub boosts: Option<Boosts>,
}

impl RawToken {
    /// Active boosts, zero when absent
    pub fn active_boosts(&self) -> u32 {
        self.boosts.as_ref().and_then(|b| b.active).unwrap_or(0)
    }
}

/// Active boost counter attached to a token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Boosts {
    pub active: Option<u32>,
}

/// Per-timeframe numeric values (`volume`, `priceChange`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeframes {
    pub m5: Option<f64>,
    pub h1: Option<f64>,
    pub h6: Option<f64>,
    pub h24: Option<f64>,
}

/// Pool liquidity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Liquidity {
    pub usd: Option<f64>,
    pub base: Option<f64>,
    pub quote: Option<f64>,
}

/// A trading pair as returned by search and token-pairs endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPair {
    pub chain_id: Option<String>,
    pub dex_id: Option<String>,
    pub url: Option<String>,
    pub pair_address: Option<String>,
    pub base_token: Option<RawToken>,
    pub quote_token: Option<RawToken>,
    #[serde(default, deserialize_with = "decimal_string")]
    pub price_native: Option<String>,
    #[serde(default, deserialize_with = "decimal_string")]
    pub price_usd: Option<String>,
    pub price_change: Option<Timeframes>,
    pub volume: Option<Timeframes>,
    pub liquidity: Option<Liquidity>,
    pub fdv: Option<f64>,
    pub market_cap: Option<f64>,
    pub pair_created_at: Option<i64>,
}

impl RawPair {
    /// `baseToken.address`, if present and non-empty
    pub fn base_address(&self) -> Option<&str> {
        self.base_token
            .as_ref()
            .and_then(|t| t.address.as_deref())
            .filter(|a| !a.is_empty())
    }

    /// `volume.h24`, zero when absent
    pub fn volume_h24(&self) -> f64 {
        self.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0)
    }

    /// `liquidity.usd`, zero when absent
    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0)
    }

    /// `priceChange.h24`, if present
    pub fn price_change_h24(&self) -> Option<f64> {
        self.price_change.as_ref().and_then(|p| p.h24)
    }
}

/// Link attached to a profile or boost
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub label: Option<String>,
    pub url: Option<String>,
}

/// Entry of `/token-profiles/latest/v1`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenProfile {
    pub url: Option<String>,
    pub chain_id: Option<String>,
    pub token_address: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub icon: Option<String>,
    pub header: Option<String>,
    pub description: Option<String>,
    pub links: Option<Vec<Link>>,
}

/// Entry of `/token-boosts/latest/v1` and `/token-boosts/top/v1`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostedToken {
    pub url: Option<String>,
    pub chain_id: Option<String>,
    pub token_address: Option<String>,
    pub amount: Option<f64>,
    pub total_amount: Option<f64>,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub links: Option<Vec<Link>>,
}

/// Result of `/latest/dex/search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub pairs: Vec<RawPair>,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Prices arrive as decimal strings, but numbers are accepted too
fn decimal_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pair_deserialization() {
        let pair: RawPair = serde_json::from_value(json!({
            "chainId": "solana",
            "dexId": "raydium",
            "pairAddress": "PairAddr",
            "baseToken": { "address": "Mint", "name": "Bonk", "symbol": "BONK" },
            "quoteToken": { "address": "So111", "name": "Wrapped SOL", "symbol": "SOL" },
            "priceUsd": "0.00002",
            "priceChange": { "h24": -3.5 },
            "volume": { "h24": 1500000.5, "h6": 20000 },
            "liquidity": { "usd": 250000, "base": 1, "quote": 2 },
            "marketCap": 1.2e9
        }))
        .unwrap();

        assert_eq!(pair.base_address(), Some("Mint"));
        assert_eq!(pair.price_usd.as_deref(), Some("0.00002"));
        assert_eq!(pair.volume_h24(), 1500000.5);
        assert_eq!(pair.liquidity_usd(), 250000.0);
        assert_eq!(pair.price_change_h24(), Some(-3.5));
        assert_eq!(pair.market_cap, Some(1.2e9));
    }

    #[test]
    fn test_numeric_price_accepted() {
        let pair: RawPair = serde_json::from_value(json!({ "priceUsd": 1.25 })).unwrap();
        assert_eq!(pair.price_usd.as_deref(), Some("1.25"));
    }

    #[test]
    fn test_missing_fields_default() {
        let pair: RawPair = serde_json::from_value(json!({})).unwrap();
        assert!(pair.base_address().is_none());
        assert_eq!(pair.volume_h24(), 0.0);
        assert_eq!(pair.liquidity_usd(), 0.0);
        assert!(pair.price_usd.is_none());
    }

    #[test]
    fn test_empty_base_address_is_absent() {
        let pair: RawPair =
            serde_json::from_value(json!({ "baseToken": { "address": "" } })).unwrap();
        assert!(pair.base_address().is_none());
    }

    #[test]
    fn test_boosts_on_base_token() {
        let pair: RawPair = serde_json::from_value(json!({
            "baseToken": { "address": "A", "boosts": { "active": 3 } }
        }))
        .unwrap();
        assert_eq!(pair.base_token.unwrap().active_boosts(), 3);
    }
}
