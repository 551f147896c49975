//! Process-wide wiring
//!
//! The API client (with its cache and rate limiter), the local store and the
//! watchlist are built once here and handed to whoever needs them.

use std::sync::Arc;
use thiserror::Error;

use super::market_service::{MarketConfig, MarketService};
use crate::adapters::dexscreener::{ApiError, DexScreenerClient, DexScreenerConfig, ReqwestTransport};
use crate::adapters::storage::FileKeyValueStore;
use crate::config::Config;
use crate::domain::theme::Theme;
use crate::domain::watchlist::{WatchCandidate, WatchlistStore};
use crate::ports::http::HttpTransport;
use crate::ports::storage::{KeyValueStore, StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("No pairs found for {address} on {chain}")]
    TokenNotFound { chain: String, address: String },
}

pub struct AppContext<T = ReqwestTransport> {
    pub market: MarketService<T>,
    pub watchlist: WatchlistStore,
    store: Arc<dyn KeyValueStore>,
}

impl AppContext {
    /// Build the reqwest-backed context from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = DexScreenerClient::with_config(DexScreenerConfig::from(config))?;
        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileKeyValueStore::new(config.storage.expanded_data_dir()));
        Self::with_parts(client, MarketConfig::from(config), store)
    }
}

impl<T: HttpTransport> AppContext<T> {
    pub fn with_parts(
        client: DexScreenerClient<T>,
        market: MarketConfig,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, AppError> {
        let watchlist = WatchlistStore::open(store.clone())?;
        Ok(Self {
            market: MarketService::new(client, market),
            watchlist,
            store,
        })
    }

    /// Look a token up and add its first pair to the watchlist.
    /// Returns the entry id and whether it was newly added.
    pub async fn watch_token(&mut self, chain_id: &str, address: &str) -> Result<(String, bool), AppError> {
        let pairs = self.market.token_pairs(chain_id, address).await?;
        let pair = pairs.first().ok_or_else(|| AppError::TokenNotFound {
            chain: chain_id.to_string(),
            address: address.to_string(),
        })?;

        let mut candidate = WatchCandidate::from(pair);
        if candidate.address.is_none() {
            candidate.address = Some(address.to_string());
        }
        let id = candidate.derived_id().unwrap_or_else(|| address.to_string());
        let added = self.watchlist.add(candidate)?;
        Ok((id, added))
    }

    pub fn theme(&self) -> Theme {
        Theme::load(self.store.as_ref())
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), AppError> {
        theme.save(self.store.as_ref())?;
        Ok(())
    }
}
