//! GG-EXPORT
//!
//! Ships serialized telemetry payloads (metrics, logs, traces) to an OTLP
//! collector over HTTPS, authenticating with an OAuth 2.0 client-credentials
//! token, and keeps an in-memory ledger of every payload and its outcome.
//!
//! # Components
//!
//! - [`transport`]: one HTTP POST per call, success iff 200/201/204
//! - [`auth`]: cached, self-refreshing bearer token provider
//! - [`dispatch`]: routes a payload to the collector path for its signal
//! - [`ledger`]: append-only record of what was sent and whether it landed
//! - [`codec`]: typed attribute values to and from their wire form
//!
//! Payload bodies are opaque; encoding them is the caller's job.

pub mod auth;
pub mod cli;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod ledger;
pub mod message;
pub mod telemetry;
pub mod transport;

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use auth::{AuthProvider, OAuthClientCredentialsProvider};
use config::ExportConfig;
use dispatch::{PayloadDispatcher, PayloadSender};
use ledger::{LedgerError, ResponseLedger};
use message::{SignalKind, TransportMessage};
use transport::{HttpTransport, ReqwestTransport, TransportError};

/// The export pipeline: a sender, its ledger, and a bound on background
/// exports.
pub struct Exporter {
    sender: Arc<dyn PayloadSender>,
    ledger: Arc<ResponseLedger>,
    in_flight: Arc<Semaphore>,
    max_in_flight: usize,
}

impl Exporter {
    pub fn new(
        sender: Arc<dyn PayloadSender>,
        ledger: Arc<ResponseLedger>,
        max_in_flight: usize,
    ) -> Self {
        let max_in_flight = max_in_flight.max(1);
        Self {
            sender,
            ledger,
            in_flight: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
        }
    }

    /// Build the reqwest transport, the OAuth provider (when a token URL is
    /// configured), the dispatcher and a fully initialized ledger.
    pub fn from_config(config: &ExportConfig) -> Result<Self, TransportError> {
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::new(&config.transport_config())?);
        let auth = config.credentials().map(|credentials| {
            Arc::new(OAuthClientCredentialsProvider::new(
                credentials,
                Arc::clone(&transport),
            )) as Arc<dyn AuthProvider>
        });
        let dispatcher = PayloadDispatcher::new(config.dispatcher_config(), auth, transport);

        tracing::info!(
            base_url = %config.base_url,
            preset = config.path_preset.as_str(),
            auth_enabled = config.credentials().is_some(),
            max_in_flight = config.max_in_flight,
            "Exporter configured"
        );
        Ok(Self::new(
            Arc::new(dispatcher),
            Arc::new(ResponseLedger::with_all_signals()),
            config.max_in_flight,
        ))
    }

    pub fn ledger(&self) -> &Arc<ResponseLedger> {
        &self.ledger
    }

    /// Permits currently free for [`Exporter::spawn_export`].
    pub fn available_permits(&self) -> usize {
        self.in_flight.available_permits()
    }

    /// Send a metrics or traces payload and record the outcome under
    /// `resource_key`.
    ///
    /// Nothing is sent when the ledger could not record the outcome.
    pub async fn export(
        &self,
        resource_key: &str,
        message: TransportMessage,
    ) -> Result<bool, LedgerError> {
        if message.kind() == SignalKind::Logs {
            return Err(LedgerError::LogStreamRequired);
        }
        self.ensure_initialized(message.kind())?;
        let success = self.sender.post_payload(&message).await;
        self.ledger.record(resource_key, message, success)?;
        Ok(success)
    }

    /// Send a logs payload and record the outcome under
    /// `(log_stream, resource_key)`.
    pub async fn export_log(
        &self,
        log_stream: &str,
        resource_key: &str,
        message: TransportMessage,
    ) -> Result<bool, LedgerError> {
        if message.kind() != SignalKind::Logs {
            return Err(LedgerError::UnexpectedSignal(message.kind()));
        }
        self.ensure_initialized(SignalKind::Logs)?;
        let success = self.sender.post_payload(&message).await;
        self.ledger
            .record_log(log_stream, resource_key, message, success)?;
        Ok(success)
    }

    /// Export metrics or traces payloads for several resources. Each payload
    /// is still its own request and holds an in-flight permit while it runs,
    /// so the bound is shared with [`Exporter::spawn_export`]. Results come
    /// back in input order.
    pub async fn export_concurrently(
        &self,
        batch: Vec<(String, TransportMessage)>,
    ) -> Vec<Result<bool, LedgerError>> {
        stream::iter(batch)
            .map(|(resource_key, message)| async move {
                let _permit = self.in_flight.acquire().await.ok();
                self.export(&resource_key, message).await
            })
            .buffered(self.max_in_flight)
            .collect()
            .await
    }

    fn ensure_initialized(&self, kind: SignalKind) -> Result<(), LedgerError> {
        if self.ledger.is_initialized(kind) {
            Ok(())
        } else {
            Err(LedgerError::NotInitialized(kind))
        }
    }

    /// Run [`Exporter::export`] as a background task, waiting for an
    /// in-flight permit first.
    pub fn spawn_export(
        &self,
        resource_key: impl Into<String>,
        message: TransportMessage,
    ) -> JoinHandle<Result<bool, LedgerError>> {
        let exporter = self.detached();
        let resource_key = resource_key.into();
        let permits = Arc::clone(&self.in_flight);
        tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            exporter.export(&resource_key, message).await
        })
    }

    /// Background counterpart of [`Exporter::export_log`].
    pub fn spawn_export_log(
        &self,
        log_stream: impl Into<String>,
        resource_key: impl Into<String>,
        message: TransportMessage,
    ) -> JoinHandle<Result<bool, LedgerError>> {
        let exporter = self.detached();
        let log_stream = log_stream.into();
        let resource_key = resource_key.into();
        let permits = Arc::clone(&self.in_flight);
        tokio::spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            exporter
                .export_log(&log_stream, &resource_key, message)
                .await
        })
    }

    fn detached(&self) -> Exporter {
        Exporter {
            sender: Arc::clone(&self.sender),
            ledger: Arc::clone(&self.ledger),
            in_flight: Arc::clone(&self.in_flight),
            max_in_flight: self.max_in_flight,
        }
    }
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("ledger", &self.ledger)
            .field("available_permits", &self.in_flight.available_permits())
            .finish_non_exhaustive()
    }
}
