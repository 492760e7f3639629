//! reqwest-backed transport.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;

use super::{is_success_status, HttpTransport, PostOutcome};

/// Longest slice of a rejected response body kept in diagnostics.
const MAX_LOGGED_BODY: usize = 512;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),

    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("Failed to read response body from {url}: {reason}")]
    Body { url: String, reason: String },
}

/// Transport tuning. `None` timeouts defer to the HTTP stack defaults.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// Honour `HTTP(S)_PROXY` environment variables.
    pub use_system_proxy: bool,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: None,
            connect_timeout: None,
            use_system_proxy: true,
            user_agent: format!("gg-export/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTPS transport over a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: Bytes,
    ) -> Result<(u16, String), TransportError> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| TransportError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| TransportError::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok((status, text))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(&self, url: &str, headers: &[(String, String)], body: Bytes) -> PostOutcome {
        let started = Instant::now();
        let size = body.len();

        match self.send(url, headers, body).await {
            Ok((status, text)) => {
                if is_success_status(status) {
                    tracing::debug!(
                        url,
                        status,
                        bytes = size,
                        latency_ms = started.elapsed().as_millis() as u64,
                        "POST accepted"
                    );
                } else {
                    tracing::warn!(
                        url,
                        status,
                        bytes = size,
                        response = %truncate(&text, MAX_LOGGED_BODY),
                        "POST rejected"
                    );
                }
                PostOutcome::from_response(status, text)
            }
            Err(e) => {
                tracing::error!(url, bytes = size, error = %e, "POST failed");
                PostOutcome::failed()
            }
        }
    }
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
