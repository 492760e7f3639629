//! Exporter configuration from environment variables or a TOML file.
//!
//! Environment values are loaded from `GG_EXPORT_*` variables with sensible
//! defaults. Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `GG_EXPORT_BASE_URL` | (empty) | Collector base URL |
//! | `GG_EXPORT_PATH_PRESET` | otlp | `otlp` or `otlp-prefixed` |
//! | `GG_EXPORT_METRICS_PATH` | preset | Metrics path override |
//! | `GG_EXPORT_LOGS_PATH` | preset | Logs path override |
//! | `GG_EXPORT_TRACES_PATH` | preset | Traces path override |
//! | `GG_EXPORT_TOKEN_URL` | (empty) | OAuth token endpoint (empty = no auth) |
//! | `GG_EXPORT_CLIENT_ID` | (empty) | OAuth client id |
//! | `GG_EXPORT_CLIENT_SECRET` | (empty) | OAuth client secret |
//! | `GG_EXPORT_SCOPE` | (unset) | OAuth scope |
//! | `GG_EXPORT_REQUEST_TIMEOUT` | 0 | Request timeout (secs, 0 = no limit) |
//! | `GG_EXPORT_CONNECT_TIMEOUT` | 0 | Connect timeout (secs, 0 = no limit) |
//! | `GG_EXPORT_MAX_IN_FLIGHT` | 16 | Max concurrent background exports |
//! | `GG_EXPORT_LOG_FORMAT` | json | `json` or `pretty` |
//! | `GG_EXPORT_LOG_LEVEL` | info | `EnvFilter` directive |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::OAuthCredentials;
use crate::dispatch::{join_url, DispatcherConfig, PathPreset, SignalPaths};
use crate::message::SignalKind;
use crate::telemetry::{LogConfig, LogFormat};
use crate::transport::TransportConfig;

pub const DEFAULT_MAX_IN_FLIGHT: usize = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config: {0}")]
    Parse(String),
}

/// All exporter settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub base_url: String,
    pub path_preset: PathPreset,
    pub metrics_path: Option<String>,
    pub logs_path: Option<String>,
    pub traces_path: Option<String>,
    pub token_url: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub scope: Option<String>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_in_flight: usize,
    pub log_format: LogFormat,
    pub log_level: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            path_preset: PathPreset::default(),
            metrics_path: None,
            logs_path: None,
            traces_path: None,
            token_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            scope: None,
            request_timeout_secs: 0,
            connect_timeout_secs: 0,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            log_format: LogFormat::Json,
            log_level: "info".to_string(),
        }
    }
}

impl std::fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportConfig")
            .field("base_url", &self.base_url)
            .field("path_preset", &self.path_preset)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &redact(&self.client_secret))
            .field("scope", &self.scope)
            .field("max_in_flight", &self.max_in_flight)
            .finish_non_exhaustive()
    }
}

/// Effective configuration summary (serializable, secret redacted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub base_url: String,
    pub path_preset: String,
    pub metrics_url: String,
    pub logs_url: String,
    pub traces_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: Option<String>,
    pub auth_enabled: bool,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_in_flight: usize,
    pub log_format: String,
    pub log_level: String,
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> ExportConfig {
    let defaults = ExportConfig::default();

    let path_preset = env_string("GG_EXPORT_PATH_PRESET")
        .and_then(|v| v.parse::<PathPreset>().ok())
        .unwrap_or(defaults.path_preset);
    let log_format = env_string("GG_EXPORT_LOG_FORMAT")
        .and_then(|v| v.parse::<LogFormat>().ok())
        .unwrap_or(defaults.log_format);

    let config = ExportConfig {
        base_url: std::env::var("GG_EXPORT_BASE_URL").unwrap_or_default(),
        path_preset,
        metrics_path: env_string("GG_EXPORT_METRICS_PATH"),
        logs_path: env_string("GG_EXPORT_LOGS_PATH"),
        traces_path: env_string("GG_EXPORT_TRACES_PATH"),
        token_url: std::env::var("GG_EXPORT_TOKEN_URL").unwrap_or_default(),
        client_id: std::env::var("GG_EXPORT_CLIENT_ID").unwrap_or_default(),
        client_secret: std::env::var("GG_EXPORT_CLIENT_SECRET").unwrap_or_default(),
        scope: env_string("GG_EXPORT_SCOPE"),
        request_timeout_secs: parse_u64("GG_EXPORT_REQUEST_TIMEOUT", 0),
        connect_timeout_secs: parse_u64("GG_EXPORT_CONNECT_TIMEOUT", 0),
        max_in_flight: parse_usize("GG_EXPORT_MAX_IN_FLIGHT", DEFAULT_MAX_IN_FLIGHT),
        log_format,
        log_level: env_string("GG_EXPORT_LOG_LEVEL").unwrap_or(defaults.log_level),
    };
    config.normalized()
}

impl ExportConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config.normalized())
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    fn normalized(mut self) -> Self {
        self.max_in_flight = self.max_in_flight.max(1);
        self
    }

    /// Preset paths with any per-kind overrides applied.
    pub fn signal_paths(&self) -> SignalPaths {
        let mut paths = self.path_preset.paths();
        if let Some(path) = &self.metrics_path {
            paths = paths.with_metrics(path.as_str());
        }
        if let Some(path) = &self.logs_path {
            paths = paths.with_logs(path.as_str());
        }
        if let Some(path) = &self.traces_path {
            paths = paths.with_traces(path.as_str());
        }
        paths
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig::new(self.base_url.as_str()).with_paths(self.signal_paths())
    }

    pub fn transport_config(&self) -> TransportConfig {
        let secs = |s: u64| (s > 0).then(|| Duration::from_secs(s));
        TransportConfig {
            request_timeout: secs(self.request_timeout_secs),
            connect_timeout: secs(self.connect_timeout_secs),
            ..TransportConfig::default()
        }
    }

    /// OAuth credentials, or `None` when no token endpoint is configured.
    pub fn credentials(&self) -> Option<OAuthCredentials> {
        if self.token_url.trim().is_empty() {
            return None;
        }
        let credentials = OAuthCredentials::new(
            self.token_url.as_str(),
            self.client_id.as_str(),
            self.client_secret.as_str(),
        );
        Some(match &self.scope {
            Some(scope) => credentials.with_scope(scope.as_str()),
            None => credentials,
        })
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            format: self.log_format,
            level: self.log_level.clone(),
            output_path: None,
        }
    }

    /// Human-readable problems that will make exports fail or leak.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.base_url.trim().is_empty() {
            warnings.push("base_url is blank; every export will be refused".to_string());
        } else if !self.base_url.starts_with("https://") {
            warnings.push(format!("base_url {} is not https", self.base_url));
        }
        if self.token_url.trim().is_empty() {
            warnings.push("token_url is blank; no auth provider will be configured".to_string());
        } else {
            if !self.token_url.starts_with("https://") {
                warnings.push(format!("token_url {} is not https", self.token_url));
            }
            if self.client_id.is_empty() {
                warnings.push("token_url is set but client_id is blank".to_string());
            }
            if self.client_secret.is_empty() {
                warnings.push("token_url is set but client_secret is blank".to_string());
            }
        }
        warnings
    }

    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        let dispatcher = self.dispatcher_config();
        let url = |kind: SignalKind| join_url(&dispatcher.base_url, dispatcher.paths.for_kind(kind));
        EffectiveConfig {
            base_url: self.base_url.clone(),
            path_preset: self.path_preset.as_str().to_string(),
            metrics_url: url(SignalKind::Metrics),
            logs_url: url(SignalKind::Logs),
            traces_url: url(SignalKind::Traces),
            token_url: self.token_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: redact(&self.client_secret).to_string(),
            scope: self.scope.clone(),
            auth_enabled: !self.token_url.trim().is_empty(),
            request_timeout_secs: self.request_timeout_secs,
            connect_timeout_secs: self.connect_timeout_secs,
            max_in_flight: self.max_in_flight,
            log_format: self.log_format.as_str().to_string(),
            log_level: self.log_level.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serialize env-mutating tests to avoid cross-test pollution.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "GG_EXPORT_BASE_URL",
        "GG_EXPORT_PATH_PRESET",
        "GG_EXPORT_METRICS_PATH",
        "GG_EXPORT_LOGS_PATH",
        "GG_EXPORT_TRACES_PATH",
        "GG_EXPORT_TOKEN_URL",
        "GG_EXPORT_CLIENT_ID",
        "GG_EXPORT_CLIENT_SECRET",
        "GG_EXPORT_SCOPE",
        "GG_EXPORT_REQUEST_TIMEOUT",
        "GG_EXPORT_CONNECT_TIMEOUT",
        "GG_EXPORT_MAX_IN_FLIGHT",
        "GG_EXPORT_LOG_FORMAT",
        "GG_EXPORT_LOG_LEVEL",
    ];

    fn clear_env_vars() {
        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn test_defaults_are_sensible() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let cfg = load();
        assert_eq!(cfg, ExportConfig::default());
        assert_eq!(cfg.max_in_flight, 16);
        assert_eq!(cfg.signal_paths(), SignalPaths::otlp());
        assert!(cfg.credentials().is_none());
        assert!(cfg.transport_config().request_timeout.is_none());
    }

    #[test]
    fn test_env_vars_override_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("GG_EXPORT_BASE_URL", "https://collector.example.com");
        std::env::set_var("GG_EXPORT_PATH_PRESET", "otlp-prefixed");
        std::env::set_var("GG_EXPORT_TRACES_PATH", "/custom/traces");
        std::env::set_var("GG_EXPORT_TOKEN_URL", "https://auth.example.com/token");
        std::env::set_var("GG_EXPORT_CLIENT_ID", "exporter");
        std::env::set_var("GG_EXPORT_CLIENT_SECRET", "s3cret");
        std::env::set_var("GG_EXPORT_SCOPE", "telemetry.write");
        std::env::set_var("GG_EXPORT_REQUEST_TIMEOUT", "30");
        std::env::set_var("GG_EXPORT_MAX_IN_FLIGHT", "4");
        std::env::set_var("GG_EXPORT_LOG_FORMAT", "pretty");
        let cfg = load();
        assert_eq!(cfg.path_preset, PathPreset::OtlpPrefixed);
        assert_eq!(cfg.signal_paths().metrics, "/otlp/v1/metrics");
        assert_eq!(cfg.signal_paths().traces, "/custom/traces");
        assert_eq!(cfg.max_in_flight, 4);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert_eq!(
            cfg.transport_config().request_timeout,
            Some(Duration::from_secs(30))
        );
        let credentials = cfg.credentials().unwrap();
        assert_eq!(credentials.scope.as_deref(), Some("telemetry.write"));
        assert!(cfg.validate().is_empty());
        clear_env_vars();
    }

    #[test]
    fn test_invalid_env_falls_back_to_default() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("GG_EXPORT_PATH_PRESET", "vendor");
        std::env::set_var("GG_EXPORT_REQUEST_TIMEOUT", "soon");
        std::env::set_var("GG_EXPORT_MAX_IN_FLIGHT", "many");
        std::env::set_var("GG_EXPORT_LOG_FORMAT", "xml");
        let cfg = load();
        assert_eq!(cfg.path_preset, PathPreset::Otlp);
        assert_eq!(cfg.request_timeout_secs, 0);
        assert_eq!(cfg.max_in_flight, DEFAULT_MAX_IN_FLIGHT);
        assert_eq!(cfg.log_format, LogFormat::Json);
        clear_env_vars();
    }

    #[test]
    fn test_max_in_flight_floor() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("GG_EXPORT_MAX_IN_FLIGHT", "0");
        let cfg = load();
        assert_eq!(cfg.max_in_flight, 1, "max_in_flight must have floor");
        clear_env_vars();
    }

    #[test]
    fn test_toml_partial_document() {
        let cfg = ExportConfig::from_toml_str(
            r#"
            base_url = "https://collector.example.com/"
            path_preset = "otlp-prefixed"
            logs_path = "/ingest/logs"
            max_in_flight = 0
            log_format = "text"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.max_in_flight, 1);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        let eff = cfg.effective_config();
        assert_eq!(eff.metrics_url, "https://collector.example.com/otlp/v1/metrics");
        assert_eq!(eff.logs_url, "https://collector.example.com/ingest/logs");
        assert!(!eff.auth_enabled);
    }

    #[test]
    fn test_toml_rejects_bad_types() {
        let result = ExportConfig::from_toml_str("max_in_flight = \"lots\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_file_missing() {
        let result = ExportConfig::load_file("/nonexistent/gg-export.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_secret_never_displayed() {
        let cfg = ExportConfig {
            client_secret: "hunter2".to_string(),
            ..ExportConfig::default()
        };
        assert!(!format!("{:?}", cfg).contains("hunter2"));
        let eff = cfg.effective_config();
        assert_eq!(eff.client_secret, "<redacted>");
        let json = serde_json::to_string(&eff).unwrap();
        assert!(!json.contains("hunter2"));
        let toml = toml::to_string(&cfg).unwrap();
        assert!(!toml.contains("hunter2"));
    }

    #[test]
    fn test_validate_flags_problems() {
        let cfg = ExportConfig {
            base_url: "http://collector.local".to_string(),
            token_url: "https://auth.example.com/token".to_string(),
            ..ExportConfig::default()
        };
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("not https")));
        assert!(warnings.iter().any(|w| w.contains("client_id is blank")));
        assert!(warnings.iter().any(|w| w.contains("client_secret is blank")));

        let warnings = ExportConfig::default().validate();
        assert!(warnings.iter().any(|w| w.contains("base_url is blank")));
    }
}
