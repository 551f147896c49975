//! Domain Layer - Core logic for the token browser
//!
//! Pure types and logic. Storage is reached only through the
//! `KeyValueStore` port.
//!
//! - `token`: canonical per-token record
//! - `aggregator`: merge raw pairs into tokens, sort and filter lists
//! - `watchlist`: persisted tracked tokens and portfolio value
//! - `theme`: appearance preference
//! - `price_history`: synthetic chart points

pub mod token;
pub mod aggregator;
pub mod watchlist;
pub mod theme;
pub mod price_history;

pub use token::Token;
pub use aggregator::{TokenAggregator, SortField, SortDirection, SortState, sort_tokens, filter_by_query};
pub use watchlist::{WatchlistStore, WatchlistEntry, WatchCandidate, WatchlistState};
pub use theme::Theme;
pub use price_history::{TimeFrame, synthetic_history};
