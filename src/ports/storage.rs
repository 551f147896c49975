//! Local storage port
//!
//! String-keyed, string-valued storage mirroring what a device key-value
//! store offers. Values are JSON blobs or plain strings.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Failed to serialize value for '{key}': {reason}")]
    Serialization { key: String, reason: String },

    #[error("Failed to write '{key}': {reason}")]
    Write { key: String, reason: String },

    #[error("Failed to read '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to create storage directory: {0}")]
    Directory(String),
}

/// Key-value storage shared by the watchlist and the theme preference
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key; deleting a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
