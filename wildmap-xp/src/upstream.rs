//! xeno-canto recordings API client
//!
//! One GET per proxied request: no retry, no timeout, no caching. The
//! upstream status code is not inspected; whatever JSON comes back is
//! handed to the caller byte for byte.
//!
//! The request URL carries the API key, so error messages are built from
//! reqwest errors with the URL stripped.

use axum::body::Bytes;
use serde::de::IgnoredAny;
use thiserror::Error;

const USER_AGENT: &str = concat!("wildmap-xp/", env!("CARGO_PKG_VERSION"));

/// Upstream call failures
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS or transfer failure
    #[error("{0}")]
    Network(String),

    /// Response body was not JSON
    #[error("{0}")]
    Decode(String),
}

/// Recordings API client
#[derive(Debug, Clone)]
pub struct XenoCantoClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl XenoCantoClient {
    /// Create a client for the given recordings endpoint
    pub fn new(base_url: impl Into<String>) -> Result<Self, UpstreamError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a recordings search and return the raw JSON body.
    ///
    /// `query` and `key` are URL-encoded into the request's query string.
    pub async fn search(&self, query: &str, key: &str) -> Result<Bytes, UpstreamError> {
        tracing::debug!(query = %query, url = %self.base_url, "Forwarding recordings query");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("query", query), ("key", key)])
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();

        let bytes = response.bytes().await.map_err(network_error)?;

        serde_json::from_slice::<IgnoredAny>(&bytes)
            .map_err(|e| UpstreamError::Decode(e.to_string()))?;

        tracing::info!(
            query = %query,
            upstream_status = status.as_u16(),
            bytes = bytes.len(),
            "Upstream query complete"
        );

        Ok(bytes)
    }
}

fn network_error(e: reqwest::Error) -> UpstreamError {
    UpstreamError::Network(e.without_url().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = XenoCantoClient::new("https://xeno-canto.org/api/3/recordings");
        assert!(client.is_ok());
        assert_eq!(
            client.unwrap().base_url(),
            "https://xeno-canto.org/api/3/recordings"
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_network_error() {
        // Grab a free port, then release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = XenoCantoClient::new(format!("http://{}/recordings", addr)).unwrap();
        let result = client.search("owl", "k").await;

        assert!(matches!(result, Err(UpstreamError::Network(_))));
    }

    #[tokio::test]
    async fn test_network_error_omits_key() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = XenoCantoClient::new(format!("http://{}/recordings", addr)).unwrap();
        let err = client.search("owl", "hunter2-key").await.unwrap_err();

        let message = err.to_string();
        assert!(!message.is_empty());
        assert!(!message.contains("hunter2-key"), "leaked: {}", message);
        assert!(!message.contains("key="), "leaked: {}", message);
    }
}
