//! Adapters Layer - External implementations
//!
//! - `dexscreener`: rate-limited, caching DexScreener API client
//! - `storage`: local key-value stores
//! - `cli`: command-line interface

pub mod dexscreener;
pub mod storage;
pub mod cli;
