//! Authorization header providers for collector requests.
//!
//! A provider hands out a complete `Authorization` header value. Callers ask
//! for it on every request, so refreshing an expired token stays invisible
//! to them.

mod clock;
mod oauth;

pub use clock::{Clock, ManualClock, SystemClock};
pub use oauth::{
    parse_token_response, AccessToken, OAuthClientCredentialsProvider, OAuthCredentials,
    TokenError, TokenGrant, DEFAULT_TOKEN_LIFETIME_SECS, FORM_CONTENT_TYPE,
};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

/// Capability to produce the current `Authorization` header value.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn auth_string(&self) -> String;
}

/// Pre-issued bearer token that never refreshes.
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        let token: String = token.into();
        Self {
            token: SecretString::from(token),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for StaticTokenProvider {
    async fn auth_string(&self) -> String {
        bearer(self.token.expose_secret())
    }
}

pub(crate) fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
