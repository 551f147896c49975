//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Outbound HTTP GET requests (DexScreener API)
//! - Local device key-value storage (watchlist blob, theme preference)
//!
//! `models` holds the raw market data structures shared by both sides.

pub mod http;
pub mod storage;
pub mod mocks;
pub mod models;

pub use http::{HttpResponse, HttpTransport, TransportError};
pub use storage::{KeyValueStore, StoreError};
pub use models::{BoostedToken, RawPair, RawToken, SearchResult, TokenProfile};
