//! Per-signal URL paths appended to the collector base URL.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::SignalKind;

/// Named default path sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathPreset {
    /// `/v1/metrics`, `/v1/logs`, `/v1/traces`.
    #[default]
    Otlp,
    /// `/otlp/v1/metrics`, `/otlp/v1/logs`, `/otlp/v1/traces`.
    OtlpPrefixed,
}

impl PathPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Otlp => "otlp",
            Self::OtlpPrefixed => "otlp-prefixed",
        }
    }

    pub fn paths(&self) -> SignalPaths {
        match self {
            Self::Otlp => SignalPaths::otlp(),
            Self::OtlpPrefixed => SignalPaths::otlp_prefixed(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown path preset: {0} (expected otlp or otlp-prefixed)")]
pub struct UnknownPathPreset(pub String);

impl FromStr for PathPreset {
    type Err = UnknownPathPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "otlp" => Ok(Self::Otlp),
            "otlp-prefixed" | "otlp_prefixed" | "prefixed" => Ok(Self::OtlpPrefixed),
            _ => Err(UnknownPathPreset(s.to_string())),
        }
    }
}

/// URL path per signal kind. Each one can be overridden on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalPaths {
    pub metrics: String,
    pub logs: String,
    pub traces: String,
}

impl SignalPaths {
    pub fn otlp() -> Self {
        Self {
            metrics: "/v1/metrics".to_string(),
            logs: "/v1/logs".to_string(),
            traces: "/v1/traces".to_string(),
        }
    }

    pub fn otlp_prefixed() -> Self {
        Self {
            metrics: "/otlp/v1/metrics".to_string(),
            logs: "/otlp/v1/logs".to_string(),
            traces: "/otlp/v1/traces".to_string(),
        }
    }

    pub fn with_metrics(mut self, path: impl Into<String>) -> Self {
        self.metrics = path.into();
        self
    }

    pub fn with_logs(mut self, path: impl Into<String>) -> Self {
        self.logs = path.into();
        self
    }

    pub fn with_traces(mut self, path: impl Into<String>) -> Self {
        self.traces = path.into();
        self
    }

    pub fn for_kind(&self, kind: SignalKind) -> &str {
        match kind {
            SignalKind::Metrics => &self.metrics,
            SignalKind::Logs => &self.logs,
            SignalKind::Traces => &self.traces,
        }
    }
}

impl Default for SignalPaths {
    fn default() -> Self {
        Self::otlp()
    }
}

/// Join a base URL and a path, collapsing a doubled `/` at the seam.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim();
    if base.ends_with('/') && path.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), path)
    } else {
        format!("{}{}", base, path)
    }
}
