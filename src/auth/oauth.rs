//! OAuth2 client-credentials token provider.
//!
//! The provider caches one access token and refreshes it once the clock
//! reaches its expiry. The check-then-refresh sequence runs under an async
//! mutex: concurrent callers that find the token expired wait for a single
//! in-flight fetch instead of each issuing their own.
//!
//! A failed refresh never surfaces as an error to the caller. The cached
//! token and expiry stay as they were, and the caller receives the stale (or
//! empty) bearer string; the collector will reject it and the dispatch
//! reports `false`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::Instrument;

use super::clock::{Clock, SystemClock};
use super::{bearer, AuthProvider};
use crate::telemetry::{record_token_refresh, AuthEvent, SpanExt};
use crate::transport::{HttpTransport, AUTHORIZATION, CONTENT_TYPE};

/// Lifetime assumed when the token response omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

const NEVER_FETCHED: i64 = -1;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token request to {0} returned no usable response")]
    RequestFailed(String),

    #[error("Unparsable token response: {0}")]
    Unparsable(String),

    #[error("Token response has no access_token")]
    MissingAccessToken,
}

/// Cached bearer token and the epoch second at which it lapses.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    expiry_epoch_seconds: i64,
}

impl AccessToken {
    /// Empty token that is due for a fetch at any time.
    pub fn unfetched() -> Self {
        Self {
            token: String::new(),
            expiry_epoch_seconds: NEVER_FETCHED,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expiry_epoch_seconds(&self) -> i64 {
        self.expiry_epoch_seconds
    }

    pub fn is_fetched(&self) -> bool {
        self.expiry_epoch_seconds != NEVER_FETCHED
    }

    pub fn needs_refresh(&self, now_seconds: i64) -> bool {
        now_seconds >= self.expiry_epoch_seconds
    }
}

impl Default for AccessToken {
    fn default() -> Self {
        Self::unfetched()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("expiry_epoch_seconds", &self.expiry_epoch_seconds)
            .finish()
    }
}

/// Fields extracted from a token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime in seconds; `None` when absent or not an integer.
    pub expires_in: Option<i64>,
}

/// Parse a token endpoint JSON document.
///
/// `access_token` must be a string. `expires_in` is optional.
pub fn parse_token_response(body: &str) -> Result<TokenGrant, TokenError> {
    let document: Value =
        serde_json::from_str(body).map_err(|e| TokenError::Unparsable(e.to_string()))?;
    let access_token = document
        .get("access_token")
        .and_then(Value::as_str)
        .ok_or(TokenError::MissingAccessToken)?
        .to_string();
    let expires_in = document.get("expires_in").and_then(Value::as_i64);
    Ok(TokenGrant {
        access_token,
        expires_in,
    })
}

/// Token endpoint location and client credentials.
pub struct OAuthCredentials {
    pub token_url: String,
    pub client_id: String,
    client_secret: SecretString,
    pub scope: Option<String>,
}

impl OAuthCredentials {
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let client_secret: String = client_secret.into();
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// `grant_type=client_credentials`, plus `&scope=` when a scope is set.
    pub fn form_body(&self) -> String {
        match &self.scope {
            Some(scope) => format!("grant_type=client_credentials&scope={}", scope),
            None => "grant_type=client_credentials".to_string(),
        }
    }

    /// `Basic base64(client_id:client_secret)`.
    pub fn basic_authorization(&self) -> String {
        let pair = format!("{}:{}", self.client_id, self.client_secret.expose_secret());
        format!("Basic {}", BASE64.encode(pair))
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

/// Client-credentials provider with a cached, self-refreshing token.
pub struct OAuthClientCredentialsProvider {
    credentials: OAuthCredentials,
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    token: Mutex<AccessToken>,
}

impl OAuthClientCredentialsProvider {
    pub fn new(credentials: OAuthCredentials, transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_clock(credentials, transport, Arc::new(SystemClock))
    }

    pub fn with_clock(
        credentials: OAuthCredentials,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            transport,
            clock,
            token: Mutex::new(AccessToken::unfetched()),
        }
    }

    pub fn credentials(&self) -> &OAuthCredentials {
        &self.credentials
    }

    /// Snapshot of the cached token.
    pub async fn cached_token(&self) -> AccessToken {
        self.token.lock().await.clone()
    }

    /// Force the next `auth_string` call to fetch, keeping the current token
    /// as the fallback.
    pub async fn invalidate(&self) {
        self.token.lock().await.expiry_epoch_seconds = NEVER_FETCHED;
    }

    async fn refresh(&self, cached: &mut AccessToken) -> Result<(), TokenError> {
        let url = self.credentials.token_url.as_str();
        let headers = vec![
            (CONTENT_TYPE.to_string(), FORM_CONTENT_TYPE.to_string()),
            (AUTHORIZATION.to_string(), self.credentials.basic_authorization()),
        ];
        let body = Bytes::from(self.credentials.form_body());

        let outcome = self.transport.post(url, &headers, body).await;
        let text = outcome
            .body
            .ok_or_else(|| TokenError::RequestFailed(url.to_string()))?;
        let grant = parse_token_response(&text)?;

        let now = self.clock.now_seconds();
        let lifetime = match grant.expires_in {
            Some(seconds) => seconds,
            None => {
                crate::auth_log!(
                    AuthEvent::TokenLifetimeDefaulted,
                    "Token response has no integer expires_in; assuming default lifetime",
                    "token_url" => url
                );
                DEFAULT_TOKEN_LIFETIME_SECS
            }
        };

        cached.token = grant.access_token;
        cached.expiry_epoch_seconds = now.saturating_add(lifetime);
        crate::auth_log!(
            AuthEvent::TokenRefreshed,
            "Access token refreshed",
            "token_url" => url,
            "expires_in" => lifetime.to_string().as_str()
        );
        Ok(())
    }
}

impl fmt::Debug for OAuthClientCredentialsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClientCredentialsProvider")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for OAuthClientCredentialsProvider {
    async fn auth_string(&self) -> String {
        let mut cached = self.token.lock().await;
        if cached.needs_refresh(self.clock.now_seconds()) {
            let span = tracing::info_span!(
                "token_refresh",
                token_url = %self.credentials.token_url,
                status = tracing::field::Empty,
                error.message = tracing::field::Empty,
            );
            let result = self.refresh(&mut cached).instrument(span.clone()).await;
            span.record_result(&result);
            record_token_refresh(result.is_ok());

            if let Err(e) = &result {
                let event = match e {
                    TokenError::RequestFailed(_) => AuthEvent::TokenRequestFailed,
                    TokenError::Unparsable(_) => AuthEvent::TokenResponseUnparsable,
                    TokenError::MissingAccessToken => AuthEvent::TokenMissingAccessToken,
                };
                crate::auth_log!(
                    event,
                    "Token refresh failed; keeping cached token",
                    "token_url" => self.credentials.token_url.as_str(),
                    "error" => e.to_string().as_str()
                );
            }
        }
        bearer(cached.token())
    }
}
