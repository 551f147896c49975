//! Watchlist
//!
//! The user's tracked tokens plus a portfolio value, persisted as one JSON
//! blob under [`WATCHLIST_STORAGE_KEY`]. State is loaded once when the store
//! is opened and written back after every mutation. A mutation whose write
//! fails leaves the in-memory state untouched.
//!
//! Tokens enter the watchlist from several shapes (canonical tokens, raw
//! pairs, previously saved entries), so input goes through [`WatchCandidate`]
//! and is projected with fixed fallback rules:
//!
//! | field            | first choice              | then                 | default   |
//! |------------------|---------------------------|----------------------|-----------|
//! | `id`             | pair address              | id, address          | timestamp |
//! | `symbol`         | base token symbol         | symbol               | `UNKNOWN` |
//! | `price`          | parsed `priceUsd` (non-0) | price                | 0         |
//! | `priceChange24h` | `priceChange.h24`         | `priceChange24h`     | 0         |
//! | `volume24h`      | `volume.h24`              | `volume24h`          | 0         |

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use super::token::{parse_price, Token};
use crate::ports::models::{RawPair, RawToken};
use crate::ports::storage::{KeyValueStore, StoreError};

/// Storage key of the persisted watchlist blob
pub const WATCHLIST_STORAGE_KEY: &str = "dex-screener-storage";

/// Portfolio value shown before the user sets one
pub const DEFAULT_PORTFOLIO_VALUE: f64 = 125_430.0;

/// A tracked token as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub id: String,
    pub symbol: String,
    pub name: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub price_change_24h: f64,
    #[serde(default)]
    pub volume_24h: f64,
    pub liquidity: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    pub address: Option<String>,
    pub logo_uri: Option<String>,
    pub chain_id: Option<String>,
    pub pair_address: Option<String>,
    #[serde(default)]
    pub active_boosts: u32,
}

impl WatchlistEntry {
    pub fn is_boosted(&self) -> bool {
        self.active_boosts > 0
    }
}

/// Partial token accepted by [`WatchlistStore::add`]
///
/// `pair_*` fields carry values nested in a raw pair (`priceChange.h24`,
/// `volume.h24`) and take precedence over the flat ones.
#[derive(Debug, Clone, Default)]
pub struct WatchCandidate {
    pub pair_address: Option<String>,
    pub id: Option<String>,
    pub address: Option<String>,
    pub chain_id: Option<String>,
    pub base_token: Option<RawToken>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub price_usd: Option<String>,
    pub price: Option<f64>,
    pub pair_change_h24: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub pair_volume_h24: Option<f64>,
    pub volume_24h: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub market_cap: Option<f64>,
    pub logo_uri: Option<String>,
    pub active_boosts: u32,
}

/// Treat empty strings as missing, the way the stored data was written
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl WatchCandidate {
    /// Identity the entry would be stored under, if the input carries one
    pub fn derived_id(&self) -> Option<String> {
        present(&self.pair_address)
            .or_else(|| present(&self.id))
            .or_else(|| present(&self.address))
            .map(str::to_string)
    }

    /// Project into the stored shape. `fallback_id` is used when the input
    /// has no identity of its own.
    pub fn into_entry(self, fallback_id: impl FnOnce() -> String) -> WatchlistEntry {
        let id = self.derived_id().unwrap_or_else(fallback_id);
        let base = self.base_token.as_ref();

        let symbol = base
            .and_then(|b| present(&b.symbol))
            .or_else(|| present(&self.symbol))
            .unwrap_or("UNKNOWN")
            .to_string();
        let name = base
            .and_then(|b| present(&b.name))
            .or_else(|| present(&self.name))
            .map(str::to_string);
        let price = parse_price(Some(self.price_usd.as_deref().unwrap_or("0")))
            .filter(|p| *p != 0.0)
            .or(self.price.filter(|p| p.is_finite()))
            .unwrap_or(0.0);
        let address = present(&self.address)
            .or_else(|| base.and_then(|b| present(&b.address)))
            .map(str::to_string);
        let logo_uri = present(&self.logo_uri)
            .or_else(|| base.and_then(|b| present(&b.logo_uri)))
            .map(str::to_string);
        let active_boosts = base
            .map(RawToken::active_boosts)
            .unwrap_or(0)
            .max(self.active_boosts);

        WatchlistEntry {
            id,
            symbol,
            name,
            price,
            price_change_24h: self.pair_change_h24.or(self.price_change_24h).unwrap_or(0.0),
            volume_24h: self.pair_volume_h24.or(self.volume_24h).unwrap_or(0.0),
            liquidity: self.liquidity_usd,
            market_cap: self.market_cap.filter(|m| m.is_finite()),
            address,
            logo_uri,
            chain_id: self.chain_id,
            pair_address: self.pair_address,
            active_boosts,
        }
    }
}

impl From<&RawPair> for WatchCandidate {
    fn from(pair: &RawPair) -> Self {
        Self {
            pair_address: pair.pair_address.clone(),
            chain_id: pair.chain_id.clone(),
            base_token: pair.base_token.clone(),
            price_usd: pair.price_usd.clone(),
            pair_change_h24: pair.price_change_h24(),
            pair_volume_h24: pair.volume.as_ref().and_then(|v| v.h24),
            liquidity_usd: pair.liquidity.as_ref().and_then(|l| l.usd),
            market_cap: pair.market_cap,
            ..Default::default()
        }
    }
}

impl From<&Token> for WatchCandidate {
    fn from(token: &Token) -> Self {
        Self {
            pair_address: token.pair_address.clone(),
            id: Some(token.id.clone()),
            address: Some(token.address.clone()),
            chain_id: Some(token.chain_id.clone()),
            symbol: Some(token.symbol.clone()),
            name: Some(token.name.clone()),
            price_usd: token.price_usd.clone(),
            pair_change_h24: Some(token.price_change_h24),
            pair_volume_h24: Some(token.volume_h24),
            liquidity_usd: Some(token.liquidity_usd),
            market_cap: token.market_cap,
            logo_uri: token.logo_uri.clone(),
            active_boosts: token.active_boosts,
            ..Default::default()
        }
    }
}

/// Persisted blob layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistState {
    #[serde(default)]
    pub watchlist: Vec<WatchlistEntry>,
    #[serde(default = "default_portfolio_value")]
    pub portfolio_value: f64,
}

fn default_portfolio_value() -> f64 {
    DEFAULT_PORTFOLIO_VALUE
}

impl Default for WatchlistState {
    fn default() -> Self {
        Self {
            watchlist: Vec::new(),
            portfolio_value: DEFAULT_PORTFOLIO_VALUE,
        }
    }
}

/// Persisted watchlist, constructed once per process
pub struct WatchlistStore {
    store: Arc<dyn KeyValueStore>,
    state: WatchlistState,
}

impl WatchlistStore {
    /// Load persisted state. A missing blob starts empty; an unreadable
    /// blob is logged and replaced by defaults on the next write.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let state = match store.get(WATCHLIST_STORAGE_KEY)? {
            None => WatchlistState::default(),
            Some(raw) => match serde_json::from_str::<WatchlistState>(&raw) {
                Ok(state) => {
                    tracing::info!("Watchlist loaded: {} entries", state.watchlist.len());
                    state
                }
                Err(e) => {
                    tracing::warn!("Discarding corrupted watchlist blob: {}", e);
                    WatchlistState::default()
                }
            },
        };

        Ok(Self { store, state })
    }

    /// Add a token. Returns `false` when an entry with the same id exists.
    pub fn add(&mut self, candidate: impl Into<WatchCandidate>) -> Result<bool, StoreError> {
        let candidate = candidate.into();
        if let Some(id) = candidate.derived_id() {
            if self.contains(&id) {
                tracing::debug!("Watchlist already contains {}", id);
                return Ok(false);
            }
        }

        let entry = candidate.into_entry(timestamp_id);
        if self.contains(&entry.id) {
            return Ok(false);
        }

        let mut next = self.state.clone();
        tracing::info!("Watching {} ({})", entry.symbol, entry.id);
        next.watchlist.push(entry);
        self.commit(next)?;
        Ok(true)
    }

    /// Remove by id. Returns `false` when nothing matched.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        if !self.contains(id) {
            return Ok(false);
        }

        let mut next = self.state.clone();
        next.watchlist.retain(|entry| entry.id != id);
        self.commit(next)?;
        tracing::info!("Stopped watching {}", id);
        Ok(true)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.watchlist.iter().any(|entry| entry.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&WatchlistEntry> {
        self.state.watchlist.iter().find(|entry| entry.id == id)
    }

    pub fn set_portfolio_value(&mut self, value: f64) -> Result<(), StoreError> {
        let mut next = self.state.clone();
        next.portfolio_value = value;
        self.commit(next)?;
        tracing::info!("Portfolio value set to {}", value);
        Ok(())
    }

    pub fn portfolio_value(&self) -> f64 {
        self.state.portfolio_value
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.state.watchlist
    }

    pub fn len(&self) -> usize {
        self.state.watchlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.watchlist.is_empty()
    }

    /// Entries with at least one active boost
    pub fn boosted(&self) -> Vec<&WatchlistEntry> {
        self.state.watchlist.iter().filter(|e| e.is_boosted()).collect()
    }

    /// Entries without an active boost
    pub fn regular(&self) -> Vec<&WatchlistEntry> {
        self.state.watchlist.iter().filter(|e| !e.is_boosted()).collect()
    }

    fn commit(&mut self, next: WatchlistState) -> Result<(), StoreError> {
        let blob = serde_json::to_string(&next).map_err(|e| StoreError::Serialization {
            key: WATCHLIST_STORAGE_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.store.set(WATCHLIST_STORAGE_KEY, &blob)?;
        self.state = next;
        Ok(())
    }
}

fn timestamp_id() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}
