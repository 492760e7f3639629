//! Signal kinds and the opaque payloads that travel through the transport.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Telemetry category a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Metrics,
    Logs,
    Traces,
}

impl SignalKind {
    /// All signal kinds, in a stable order.
    pub const ALL: [SignalKind; 3] = [SignalKind::Metrics, SignalKind::Logs, SignalKind::Traces];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metrics => "metrics",
            Self::Logs => "logs",
            Self::Traces => "traces",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown signal kind: {0}")]
pub struct UnknownSignalKind(pub String);

impl FromStr for SignalKind {
    type Err = UnknownSignalKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metrics" | "metric" => Ok(Self::Metrics),
            "logs" | "log" => Ok(Self::Logs),
            "traces" | "trace" => Ok(Self::Traces),
            _ => Err(UnknownSignalKind(s.to_string())),
        }
    }
}

/// An already-serialized export request, tagged with its signal kind.
///
/// The body is treated as opaque bytes. Cloning is cheap, which lets the
/// ledger keep every payload it is handed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMessage {
    kind: SignalKind,
    body: Bytes,
}

impl TransportMessage {
    pub fn new(kind: SignalKind, body: impl Into<Bytes>) -> Self {
        Self { kind, body: body.into() }
    }

    pub fn metrics(body: impl Into<Bytes>) -> Self {
        Self::new(SignalKind::Metrics, body)
    }

    pub fn logs(body: impl Into<Bytes>) -> Self {
        Self::new(SignalKind::Logs, body)
    }

    pub fn traces(body: impl Into<Bytes>) -> Self {
        Self::new(SignalKind::Traces, body)
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    /// Serialized bytes, shared rather than copied.
    pub fn body(&self) -> Bytes {
        self.body.clone()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
