//! dexwatch - DexScreener token browser library
//!
//! Data layer for browsing DexScreener: a caching, rate-limited API client,
//! aggregation of raw pairs into one record per token, and a persisted
//! watchlist.
//!
//! # Modules
//!
//! - `domain`: Core logic (Token, TokenAggregator, WatchlistStore, Theme, price history)
//! - `ports`: Trait abstractions (HttpTransport, KeyValueStore) and API records
//! - `adapters`: External implementations (DexScreener client, file storage, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Market use cases, refresh generations, process wiring

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
