// Copyright 2024-2026 GG-EXPORT Contributors
// SPDX-License-Identifier: Apache-2.0

//! `token` subcommand: fetch an access token and report its expiry.

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::auth::{AuthProvider, OAuthClientCredentialsProvider};
use crate::config::ExportConfig;
use crate::transport::ReqwestTransport;

use super::{EXIT_CONFIG, EXIT_FAILURE, EXIT_OK};

/// Fetch a token with the configured credentials.
///
/// The token itself is only printed when `reveal` is set.
pub async fn run_token(config: &ExportConfig, reveal: bool) -> i32 {
    let Some(credentials) = config.credentials() else {
        eprintln!("GG_EXPORT_TOKEN_URL is not set; nothing to fetch");
        return EXIT_CONFIG;
    };
    let transport = match ReqwestTransport::new(&config.transport_config()) {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            eprintln!("Failed to build HTTP client: {}", e);
            return EXIT_CONFIG;
        }
    };
    let provider = OAuthClientCredentialsProvider::new(credentials, transport);

    let header = provider.auth_string().await;
    let token = provider.cached_token().await;
    if !token.is_fetched() {
        eprintln!("Token request failed; see logs for details");
        return EXIT_FAILURE;
    }

    let expires_at = Utc
        .timestamp_opt(token.expiry_epoch_seconds(), 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| token.expiry_epoch_seconds().to_string());
    let authorization = if reveal {
        header
    } else {
        "Bearer <redacted>".to_string()
    };
    println!(
        "{}",
        serde_json::json!({
            "token_url": provider.credentials().token_url,
            "expires_at": expires_at,
            "authorization": authorization,
        })
    );
    EXIT_OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_token_url_is_config_error() {
        assert_eq!(run_token(&ExportConfig::default(), false).await, EXIT_CONFIG);
    }
}
