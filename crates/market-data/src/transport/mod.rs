//! Outbound HTTP transport.
//!
//! Providers only ever issue `GET` requests that return JSON, so the seam is
//! a single method. Pooling and timeouts belong to whoever builds the
//! underlying client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::errors::MarketDataError;

/// Default HTTP request timeout for [`ReqwestTransport::new`].
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// JSON-over-HTTP transport used by every provider.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` and decode the body as JSON.
    ///
    /// Connection failures map to [`MarketDataError::Transport`], non-success
    /// statuses to [`MarketDataError::HttpStatus`], undecodable bodies to
    /// [`MarketDataError::InvalidResponse`].
    async fn get_json(&self, url: &str) -> Result<Value, MarketDataError>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with its own client and the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// Wrap a caller-owned client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> Result<Value, MarketDataError> {
        debug!("GET {}", url);

        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| MarketDataError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MarketDataError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        serde_json::from_slice(&bytes).map_err(|e| MarketDataError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
