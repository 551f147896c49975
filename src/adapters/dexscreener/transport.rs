//! reqwest-backed HTTP transport

use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;

use crate::ports::http::{HttpResponse, HttpTransport, TransportError};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// HTTP transport over a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Create a transport with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dexwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new(DEFAULT_TIMEOUT).is_ok());
    }
}
