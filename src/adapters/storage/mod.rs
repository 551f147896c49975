//! Local key-value storage adapters
//!
//! - `FileKeyValueStore`: one JSON file per key under a data directory
//! - `MemoryStore`: process-local map, used in tests and dry runs

mod file;
mod memory;

pub use file::FileKeyValueStore;
pub use memory::MemoryStore;
