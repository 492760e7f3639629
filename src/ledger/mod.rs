//! In-memory, append-only record of every payload sent and its outcome.
//!
//! Storage is partitioned by signal kind, then by resource key (and for
//! logs, by log stream first). Each signal kind's storage must be created
//! with [`ResponseLedger::init_signal_storage`] before anything is recorded
//! for it; re-initializing discards what was there.
//!
//! Appends for one key are serialized by the `DashMap` shard lock, so
//! concurrent recorders never tear an entry. Readers get snapshots, which are
//! always a prefix of the eventual sequence for that key.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use thiserror::Error;

use crate::message::{SignalKind, TransportMessage};
use crate::telemetry::record_ledger_append;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Ledger storage for {0} has not been initialized")]
    NotInitialized(SignalKind),

    #[error("Log payloads must be recorded with a log stream")]
    LogStreamRequired,

    #[error("Only log payloads can be recorded under a log stream, got {0}")]
    UnexpectedSignal(SignalKind),
}

/// One transmission and whether the collector accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub payload: TransportMessage,
    pub success: bool,
    pub recorded_at: DateTime<Utc>,
}

/// Partition key inside one signal kind's storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct LedgerKey {
    log_stream: Option<String>,
    resource: String,
}

type SignalStore = DashMap<LedgerKey, Vec<LedgerEntry>>;

/// Entry counts for one signal kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Default)]
pub struct ResponseLedger {
    metrics: RwLock<Option<Arc<SignalStore>>>,
    logs: RwLock<Option<Arc<SignalStore>>>,
    traces: RwLock<Option<Arc<SignalStore>>>,
}

impl ResponseLedger {
    /// Ledger with no signal storage initialized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with storage for every signal kind ready.
    pub fn with_all_signals() -> Self {
        let ledger = Self::new();
        for kind in SignalKind::ALL {
            ledger.init_signal_storage(kind);
        }
        ledger
    }

    fn slot(&self, kind: SignalKind) -> &RwLock<Option<Arc<SignalStore>>> {
        match kind {
            SignalKind::Metrics => &self.metrics,
            SignalKind::Logs => &self.logs,
            SignalKind::Traces => &self.traces,
        }
    }

    fn store(&self, kind: SignalKind) -> Option<Arc<SignalStore>> {
        self.slot(kind).read().clone()
    }

    /// Create empty storage for `kind`, replacing any existing entries.
    pub fn init_signal_storage(&self, kind: SignalKind) {
        *self.slot(kind).write() = Some(Arc::new(DashMap::new()));
        tracing::debug!(signal = %kind, "Ledger storage initialized");
    }

    pub fn is_initialized(&self, kind: SignalKind) -> bool {
        self.slot(kind).read().is_some()
    }

    /// Record a metrics or traces payload under `resource_key`.
    pub fn record(
        &self,
        resource_key: &str,
        payload: TransportMessage,
        success: bool,
    ) -> Result<(), LedgerError> {
        if payload.kind() == SignalKind::Logs {
            tracing::warn!(resource = resource_key, "Log payload recorded without a log stream");
            return Err(LedgerError::LogStreamRequired);
        }
        let key = LedgerKey {
            log_stream: None,
            resource: resource_key.to_string(),
        };
        self.append(key, payload, success)
    }

    /// Record a logs payload under `(log_stream, resource_key)`.
    pub fn record_log(
        &self,
        log_stream: &str,
        resource_key: &str,
        payload: TransportMessage,
        success: bool,
    ) -> Result<(), LedgerError> {
        if payload.kind() != SignalKind::Logs {
            tracing::warn!(
                log_stream,
                resource = resource_key,
                signal = %payload.kind(),
                "Non-log payload recorded under a log stream"
            );
            return Err(LedgerError::UnexpectedSignal(payload.kind()));
        }
        let key = LedgerKey {
            log_stream: Some(log_stream.to_string()),
            resource: resource_key.to_string(),
        };
        self.append(key, payload, success)
    }

    fn append(
        &self,
        key: LedgerKey,
        payload: TransportMessage,
        success: bool,
    ) -> Result<(), LedgerError> {
        let kind = payload.kind();
        let Some(store) = self.store(kind) else {
            tracing::error!(signal = %kind, "Ledger storage not initialized; outcome dropped");
            return Err(LedgerError::NotInitialized(kind));
        };

        store.entry(key).or_default().push(LedgerEntry {
            payload,
            success,
            recorded_at: Utc::now(),
        });
        record_ledger_append(kind, success);
        Ok(())
    }

    fn snapshot(&self, kind: SignalKind, key: &LedgerKey) -> Vec<LedgerEntry> {
        let Some(store) = self.store(kind) else {
            return Vec::new();
        };
        let entries = store
            .get(key)
            .map(|entries| entries.value().clone())
            .unwrap_or_default();
        entries
    }

    /// Entries for a metrics or traces resource, in recording order.
    pub fn entries(&self, kind: SignalKind, resource_key: &str) -> Vec<LedgerEntry> {
        let key = LedgerKey {
            log_stream: None,
            resource: resource_key.to_string(),
        };
        self.snapshot(kind, &key)
    }

    /// Entries for a log stream and resource, in recording order.
    pub fn log_entries(&self, log_stream: &str, resource_key: &str) -> Vec<LedgerEntry> {
        let key = LedgerKey {
            log_stream: Some(log_stream.to_string()),
            resource: resource_key.to_string(),
        };
        self.snapshot(SignalKind::Logs, &key)
    }

    /// Distinct resource keys with at least one entry, sorted.
    pub fn resource_keys(&self, kind: SignalKind) -> Vec<String> {
        let Some(store) = self.store(kind) else {
            return Vec::new();
        };
        let keys: BTreeSet<String> = store.iter().map(|e| e.key().resource.clone()).collect();
        keys.into_iter().collect()
    }

    /// Distinct log stream names with at least one entry, sorted.
    pub fn log_streams(&self) -> Vec<String> {
        let Some(store) = self.store(SignalKind::Logs) else {
            return Vec::new();
        };
        let streams: BTreeSet<String> = store
            .iter()
            .filter_map(|e| e.key().log_stream.clone())
            .collect();
        streams.into_iter().collect()
    }

    pub fn summary(&self, kind: SignalKind) -> LedgerSummary {
        let Some(store) = self.store(kind) else {
            return LedgerSummary::default();
        };
        let summary = store.iter().fold(LedgerSummary::default(), |mut acc, entry| {
            for record in entry.value() {
                acc.total += 1;
                if record.success {
                    acc.succeeded += 1;
                } else {
                    acc.failed += 1;
                }
            }
            acc
        });
        summary
    }
}

impl std::fmt::Debug for ResponseLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ResponseLedger");
        for kind in SignalKind::ALL {
            s.field(kind.as_str(), &self.summary(kind));
        }
        s.finish()
    }
}
