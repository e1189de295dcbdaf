//! Network boundary.
//!
//! The coordinator talks to the remote API through the [`Transport`] trait
//! so drain cycles are testable against a scripted fake. The production
//! implementation is a thin [`reqwest`] wrapper sending JSON bodies.
//!
//! A delivered response is never an error at this seam, whatever its
//! status: the coordinator inspects the code itself. In particular 401 is
//! forwarded untouched — token invalidation is the UI layer's contract.

use async_trait::async_trait;
use thiserror::Error;

use crate::action::{Method, PendingAction};
use crate::config::OfflineSyncConfig;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("request could not be sent: {0}")]
    Send(String),
    #[error("request timed out after {0} ms")]
    Timeout(u64),
}

/// One replay attempt of a deferred mutation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue the HTTP request described by the action. Returns the response
    /// status code, or [`NetworkError`] when no response was received.
    async fn send(&self, action: &PendingAction) -> Result<u16, NetworkError>;
}

/// HTTP transport with JSON bodies (`Content-Type: application/json`).
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpTransport {
    pub fn new(config: &OfflineSyncConfig) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| NetworkError::Send(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.request_timeout_ms,
        })
    }

    fn endpoint(&self, action: &PendingAction) -> String {
        format!("{}{}", self.base_url, action.url)
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, action: &PendingAction) -> Result<u16, NetworkError> {
        let response = self
            .client
            .request(to_reqwest_method(action.method), self.endpoint(action))
            .json(&action.payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NetworkError::Timeout(self.timeout_ms)
                } else {
                    NetworkError::Send(e.to_string())
                }
            })?;

        Ok(response.status().as_u16())
    }
}
