//! Audit logging for credential and authorization events.
//!
//! Token lifecycle events are emitted as structured `tracing` events with a
//! severity, so operators can alert on repeated refresh failures without
//! parsing free-form messages. Token values are never logged.

/// Credential lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// A new access token was stored.
    TokenRefreshed,
    /// The token endpoint could not be reached or rejected the request.
    TokenRequestFailed,
    /// The token endpoint replied with something that is not JSON.
    TokenResponseUnparsable,
    /// The token endpoint replied without an `access_token`.
    TokenMissingAccessToken,
    /// The token endpoint omitted `expires_in`; the default lifetime applies.
    TokenLifetimeDefaulted,
    /// An export was attempted with no auth provider configured.
    ProviderMissing,
}

impl AuthEvent {
    pub fn severity(&self) -> AuthSeverity {
        match self {
            Self::TokenRefreshed => AuthSeverity::Info,
            Self::TokenLifetimeDefaulted => AuthSeverity::Warning,
            Self::TokenRequestFailed => AuthSeverity::Error,
            Self::TokenResponseUnparsable => AuthSeverity::Error,
            Self::TokenMissingAccessToken => AuthSeverity::Error,
            Self::ProviderMissing => AuthSeverity::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenRefreshed => "token_refreshed",
            Self::TokenRequestFailed => "token_request_failed",
            Self::TokenResponseUnparsable => "token_response_unparsable",
            Self::TokenMissingAccessToken => "token_missing_access_token",
            Self::TokenLifetimeDefaulted => "token_lifetime_defaulted",
            Self::ProviderMissing => "provider_missing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuthSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

impl AuthSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// Log an auth event with key-value details.
///
/// ```
/// use gg_export::telemetry::{log_auth_event, AuthEvent};
///
/// log_auth_event(
///     AuthEvent::TokenRequestFailed,
///     "Token endpoint unreachable",
///     &[("token_url", "https://auth.example.com/oauth2/token")],
/// );
/// ```
pub fn log_auth_event(event: AuthEvent, message: &str, details: &[(&str, &str)]) {
    let details = details
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ");

    let event_type = event.as_str();
    match event.severity() {
        AuthSeverity::Debug => {
            tracing::debug!(target: "gg_export::auth", event = event_type, details = %details, "{}", message)
        }
        AuthSeverity::Info => {
            tracing::info!(target: "gg_export::auth", event = event_type, details = %details, "{}", message)
        }
        AuthSeverity::Warning => {
            tracing::warn!(target: "gg_export::auth", event = event_type, details = %details, "{}", message)
        }
        AuthSeverity::Error => {
            tracing::error!(target: "gg_export::auth", event = event_type, details = %details, "{}", message)
        }
    }
}

/// Shorthand for [`log_auth_event`].
#[macro_export]
macro_rules! auth_log {
    ($event:expr, $message:expr) => {
        $crate::telemetry::log_auth_event($event, $message, &[])
    };
    ($event:expr, $message:expr, $($key:expr => $value:expr),+) => {
        $crate::telemetry::log_auth_event(
            $event,
            $message,
            &[$(($key, $value)),+]
        )
    };
}
