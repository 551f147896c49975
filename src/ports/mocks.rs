//! Recording mocks for the ports
//!
//! Used by unit tests across the crate and by the integration tests. The
//! transport mock matches on URL suffix so tests can register responses by
//! endpoint path without caring about the configured base host.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use async_trait::async_trait;

use super::http::{HttpResponse, HttpTransport, TransportError};
use super::storage::{KeyValueStore, StoreError};

/// Mock transport that records calls and allows controlled responses
#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    calls: Arc<Mutex<Vec<String>>>,
    responses: Arc<Mutex<HashMap<String, Result<HttpResponse, TransportError>>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to answer a path with a 200 and the given JSON body
    pub fn with_json(self, path: &str, body: &str) -> Self {
        self.with_response(path, HttpResponse::new(200, body))
    }

    /// Builder method to answer a path with an arbitrary response
    pub fn with_response(self, path: &str, response: HttpResponse) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Ok(response));
        self
    }

    /// Builder method to fail a path at the network level
    pub fn with_failure(self, path: &str, error: TransportError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), Err(error));
        self
    }

    /// Get all recorded URLs
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose URL ends with `path`
    pub fn call_count(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.ends_with(path))
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .iter()
            .find(|(path, _)| url.ends_with(path.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Ok(HttpResponse::new(404, "not found")))
    }
}

/// Store that rejects every write, for exercising persistence failures
#[derive(Debug, Default)]
pub struct ReadOnlyStore {
    values: HashMap<String, String>,
}

impl ReadOnlyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Write {
            key: key.to_string(),
            reason: "read-only store".to_string(),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        Err(StoreError::Write {
            key: key.to_string(),
            reason: "read-only store".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport() {
        let mock = MockTransport::new()
            .with_json("/token-boosts/top/v1", "[]");

        let result = mock.get("https://api.example.com/token-boosts/top/v1").await;
        assert_eq!(result, Ok(HttpResponse::new(200, "[]")));
        assert_eq!(mock.call_count("/token-boosts/top/v1"), 1);
    }

    #[tokio::test]
    async fn test_mock_transport_unknown_path() {
        let mock = MockTransport::new();

        let result = mock.get("https://api.example.com/nope").await.unwrap();
        assert_eq!(result.status, 404);
        assert_eq!(mock.get_calls(), vec!["https://api.example.com/nope".to_string()]);
    }

    #[test]
    fn test_read_only_store() {
        let store = ReadOnlyStore::new().with_value("theme", "dark");

        assert_eq!(store.get("theme").unwrap(), Some("dark".to_string()));
        assert!(store.get("missing").unwrap().is_none());
        assert!(store.set("theme", "light").is_err());
    }
}
