//! Signal-aware payload dispatcher.
//!
//! Headers are rebuilt for every request so the `Authorization` value always
//! reflects the provider's current token. The dispatcher does not record
//! outcomes; callers decide what goes into the ledger.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::Instrument;

use super::paths::{join_url, SignalPaths};
use super::PayloadSender;
use crate::auth::AuthProvider;
use crate::message::TransportMessage;
use crate::telemetry::{
    record_export, record_precondition_failure, AuthEvent, ExportSpan, SpanExt,
};
use crate::transport::{Headers, HttpTransport, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

pub const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";

/// Collector location and per-signal paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatcherConfig {
    pub base_url: String,
    pub paths: SignalPaths,
}

impl DispatcherConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            paths: SignalPaths::default(),
        }
    }

    pub fn with_paths(mut self, paths: SignalPaths) -> Self {
        self.paths = paths;
        self
    }
}

pub struct PayloadDispatcher {
    config: DispatcherConfig,
    auth: Option<Arc<dyn AuthProvider>>,
    transport: Arc<dyn HttpTransport>,
}

impl PayloadDispatcher {
    pub fn new(
        config: DispatcherConfig,
        auth: Option<Arc<dyn AuthProvider>>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            config,
            auth,
            transport,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Full URL a payload of this message's kind is sent to.
    pub fn target_url(&self, message: &TransportMessage) -> String {
        join_url(&self.config.base_url, self.config.paths.for_kind(message.kind()))
    }

    async fn headers(&self, auth: &dyn AuthProvider) -> Headers {
        vec![
            (AUTHORIZATION.to_string(), auth.auth_string().await),
            (CONTENT_TYPE.to_string(), PROTOBUF_CONTENT_TYPE.to_string()),
            (ACCEPT.to_string(), PROTOBUF_CONTENT_TYPE.to_string()),
        ]
    }
}

impl std::fmt::Debug for PayloadDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadDispatcher")
            .field("config", &self.config)
            .field("has_auth", &self.auth.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PayloadSender for PayloadDispatcher {
    async fn post_payload(&self, message: &TransportMessage) -> bool {
        let kind = message.kind();

        if self.config.base_url.trim().is_empty() {
            tracing::error!(signal = %kind, "No collector base URL configured; payload not sent");
            record_precondition_failure(kind, "blank_base_url");
            return false;
        }
        let Some(auth) = self.auth.as_deref() else {
            crate::auth_log!(
                AuthEvent::ProviderMissing,
                "No auth provider configured; payload not sent",
                "signal" => kind.as_str()
            );
            record_precondition_failure(kind, "missing_auth_provider");
            return false;
        };

        let request_id = uuid::Uuid::new_v4().to_string();
        let span = ExportSpan::new(&request_id, kind);
        let url = self.target_url(message);

        let started = Instant::now();
        let outcome = async {
            let headers = self.headers(auth).await;
            self.transport.post(&url, &headers, message.body()).await
        }
        .instrument(span.clone())
        .await;
        let elapsed = started.elapsed();

        span.record_outcome(outcome.success);
        if let Some(status) = outcome.status {
            span.record("http.status", status);
        }
        span.record("latency_ms", elapsed.as_millis() as u64);
        span.record("payload_bytes", message.len() as u64);
        record_export(kind, outcome.success, elapsed);

        if outcome.success {
            tracing::debug!(parent: &span, url = %url, "Payload accepted");
        } else {
            tracing::warn!(parent: &span, url = %url, status = ?outcome.status, "Payload rejected");
        }
        outcome.success
    }
}
