//! The transport seam.
//!
//! [`Transport`] is the single injection point for I/O: it takes a fully
//! built wire value and a URL and returns the raw response. The default
//! [`HttpTransport`] POSTs JSON over [`reqwest`]; tests swap in canned
//! transports to drive the response interpreter without a network.

use crate::Error;
use async_trait::async_trait;
use odoo_rpc_core::RawResponse;
use serde_json::Value;

/// Sends one envelope and returns the raw response.
///
/// An `Err` means the exchange never completed. Any completed exchange,
/// whatever its status code, comes back as a response for the interpreter
/// to judge.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` as JSON to `url`.
    async fn send(&self, url: &str, body: &Value) -> Result<RawResponse, Error>;
}

/// The default transport: JSON POSTs over a shared [`reqwest::Client`].
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a fresh connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport over a caller-configured client (proxies,
    /// timeouts, extra root certificates).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, url: &str, body: &Value) -> Result<RawResponse, Error> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("POST {url} failed: {e}")))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("reading response from {url} failed: {e}")))?;

        Ok(RawResponse::new(status, headers, body))
    }
}
