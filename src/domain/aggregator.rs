//! Token Aggregator
//!
//! Turns a flat list of raw pairs (usually gathered from several per-chain
//! searches) into canonical tokens:
//! 1. Unusable records are skipped (no base token, address or chain)
//! 2. Pairs sharing `(baseToken.address, chainId)` collapse into one token,
//!    the first pair seeds identity fields and later ones only add volume
//!    and liquidity
//! 3. Tokens at or below the volume floor are dropped as dust
//!
//! Output keeps first-occurrence order. Sorting and text filtering for list
//! views live here too.

use std::cmp::Ordering;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};

use super::token::Token;
use crate::ports::models::RawPair;

/// Default 24h volume floor in USD
pub const DEFAULT_MIN_VOLUME_USD: f64 = 1_000.0;

/// Merges raw pairs into canonical tokens
#[derive(Debug, Clone)]
pub struct TokenAggregator {
    /// Tokens whose summed 24h volume is at or below this are dropped
    min_volume_usd: f64,
}

impl TokenAggregator {
    /// Create an aggregator with the default 1000 USD floor
    pub fn new() -> Self {
        Self::with_min_volume(DEFAULT_MIN_VOLUME_USD)
    }

    /// Create an aggregator with a custom volume floor
    pub fn with_min_volume(min_volume_usd: f64) -> Self {
        Self { min_volume_usd }
    }

    /// Merge, then apply the volume floor
    pub fn aggregate<'a, I>(&self, pairs: I) -> Vec<Token>
    where
        I: IntoIterator<Item = &'a RawPair>,
    {
        let floor = self.min_volume_usd;
        let tokens: Vec<Token> = Self::merge(pairs)
            .into_iter()
            .filter(|token| token.volume_h24 > floor)
            .collect();

        tracing::debug!("Aggregated {} tokens above ${} volume", tokens.len(), floor);
        tokens
    }

    /// Deduplicate by `(address, chain)` and accumulate, without filtering
    pub fn merge<'a, I>(pairs: I) -> Vec<Token>
    where
        I: IntoIterator<Item = &'a RawPair>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut tokens: Vec<Token> = Vec::new();
        let mut skipped = 0usize;

        for pair in pairs {
            let (Some(address), Some(chain_id)) = (pair.base_address(), pair.chain_id.as_deref()) else {
                skipped += 1;
                continue;
            };

            let key = Token::key(address, chain_id);
            match index.get(&key) {
                Some(&position) => tokens[position].absorb(pair),
                None => match Token::from_pair(pair) {
                    Some(token) => {
                        index.insert(key, tokens.len());
                        tokens.push(token);
                    }
                    None => skipped += 1,
                },
            }
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} unusable pair records", skipped);
        }
        tokens
    }

    pub fn min_volume_usd(&self) -> f64 {
        self.min_volume_usd
    }
}

impl Default for TokenAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Sortable list columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Orders by ticker symbol, which is what list rows display
    Name,
    Price,
    Change,
    Volume,
    MarketCap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Current sort of a list view. Defaults to volume, descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::Volume,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    /// Selecting the active field flips direction, a new field starts descending
    pub fn select(&mut self, field: SortField) {
        if self.field == field {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.field = field;
            self.direction = SortDirection::Descending;
        }
    }

    pub fn apply(&self, tokens: &mut [Token]) {
        sort_tokens(tokens, self.field, self.direction);
    }
}

/// Stable sort; numeric fields default missing values to zero
pub fn sort_tokens(tokens: &mut [Token], field: SortField, direction: SortDirection) {
    tokens.sort_by(|a, b| {
        let ordering = match field {
            SortField::Name => compare_text(&a.symbol, &b.symbol),
            SortField::Price => a.price().total_cmp(&b.price()),
            SortField::Change => a.price_change_h24.total_cmp(&b.price_change_h24),
            SortField::Volume => a.volume_h24.total_cmp(&b.volume_h24),
            SortField::MarketCap => a
                .market_cap
                .unwrap_or(0.0)
                .total_cmp(&b.market_cap.unwrap_or(0.0)),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Case-insensitive first, then exact, so "abc" and "ABC" still order deterministically
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Case-insensitive substring match on symbol, name or address
pub fn filter_by_query<'a>(tokens: &'a [Token], query: &str) -> Vec<&'a Token> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return tokens.iter().collect();
    }

    tokens
        .iter()
        .filter(|t| {
            t.symbol.to_lowercase().contains(&query)
                || t.name.to_lowercase().contains(&query)
                || t.address.to_lowercase().contains(&query)
        })
        .collect()
}
