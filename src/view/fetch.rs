//! HTTP client used to hydrate a view from a JSON endpoint.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tokio::time::timeout;
use tracing::debug;

use crate::config::FetchConfig;

/// Errors from fetching hydration data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to '{url}' failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to '{url}' timed out after {duration}s")]
    Timeout { url: String, duration: u64 },

    #[error("Request to '{url}' failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Response from '{url}' is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn error_type(&self) -> &'static str {
        match self {
            FetchError::Client(_) => "client_error",
            FetchError::Connection { .. } => "connection_error",
            FetchError::Timeout { .. } => "request_timeout",
            FetchError::Status { .. } => "upstream_status",
            FetchError::Decode { .. } => "invalid_json",
        }
    }
}

/// GETs JSON documents with the configured timeouts.
#[derive(Clone)]
pub struct HydrationClient {
    client: Client,
    timeout: Duration,
}

impl HydrationClient {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds.into()))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            timeout: Duration::from_secs(config.timeout_seconds.into()),
        })
    }

    /// Fetches `url` and decodes the body as JSON.
    ///
    /// Any non-2xx status is an error, whatever the body says.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        match timeout(self.timeout, self.do_fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                duration: self.timeout.as_secs(),
            }),
        }
    }

    async fn do_fetch(&self, url: &str) -> Result<Value, FetchError> {
        debug!(url, "Fetching hydration data");

        let connection = |source: reqwest::Error| FetchError::Connection {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(connection)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(connection)?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let err = FetchError::Status {
            url: "http://x/items".to_string(),
            status: 404,
        };
        assert_eq!(err.error_type(), "upstream_status");
        assert_eq!(err.to_string(), "Request to 'http://x/items' failed with status 404");
        let err = FetchError::Timeout {
            url: "http://x".to_string(),
            duration: 3,
        };
        assert_eq!(err.error_type(), "request_timeout");
        assert_eq!(err.to_string(), "Request to 'http://x' timed out after 3s");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_connection_error() {
        let client = HydrationClient::new(&FetchConfig::default()).unwrap();
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let err = client.fetch_json("http://127.0.0.1:9/data").await.unwrap_err();
        assert_eq!(err.error_type(), "connection_error");
    }
}
