//! HTTP transport for collector and token-endpoint requests.
//!
//! A transport performs exactly one POST per call. Failures never escape:
//! every error reduces to an unsuccessful [`PostOutcome`] plus a log line.

mod http;

pub use http::{ReqwestTransport, TransportConfig, TransportError};

use async_trait::async_trait;
use bytes::Bytes;

/// Header list sent with a request, in order.
pub type Headers = Vec<(String, String)>;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";

/// Result of a single POST.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostOutcome {
    /// True iff the response status was 200, 201 or 204.
    pub success: bool,
    /// Response status, absent when no response arrived.
    pub status: Option<u16>,
    /// Response body, only retained on success.
    pub body: Option<String>,
}

impl PostOutcome {
    /// Outcome for a request that never produced a response.
    pub fn failed() -> Self {
        Self::default()
    }

    /// Outcome for a response with the given status and body text.
    ///
    /// The body is dropped unless the status counts as success.
    pub fn from_response(status: u16, body: String) -> Self {
        let success = is_success_status(status);
        Self {
            success,
            status: Some(status),
            body: success.then_some(body),
        }
    }
}

/// Statuses the collector and token endpoint use to signal acceptance.
pub fn is_success_status(status: u16) -> bool {
    matches!(status, 200 | 201 | 204)
}

/// Capability to POST a byte body to a URL.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(&self, url: &str, headers: &[(String, String)], body: Bytes) -> PostOutcome;
}
