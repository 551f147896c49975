//! HTTP transport port
//!
//! The API client only needs unauthenticated GET requests that return a
//! status code and a body. Everything else (headers, retries, TLS) is the
//! adapter's business.

use async_trait::async_trait;
use thiserror::Error;

/// Network-level failure (timeout, DNS, connection reset)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Raw HTTP response as seen by the API client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP GET
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request against a fully composed URL
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(429, "").is_success());
    }
}
