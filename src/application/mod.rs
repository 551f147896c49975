//! Application Layer
//!
//! Use cases composed from the client, the aggregator and local storage.

pub mod context;
pub mod market_service;
pub mod refresh;

pub use context::{AppContext, AppError};
pub use market_service::{BoostedFeeds, MarketConfig, MarketService, TokenDetail};
pub use refresh::{RefreshGeneration, RefreshTicket, ScreenState};
