//! Exporter facade tests: post-then-record and bounded background exports.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use gg_export::config::ExportConfig;
use gg_export::dispatch::{DispatcherConfig, PayloadDispatcher, PayloadSender};
use gg_export::ledger::{LedgerError, ResponseLedger};
use gg_export::message::{SignalKind, TransportMessage};
use gg_export::Exporter;

use common::{rejected, CountingAuth, MockTransport};

fn exporter_over(transport: Arc<MockTransport>, ledger: ResponseLedger) -> Exporter {
    let dispatcher = PayloadDispatcher::new(
        DispatcherConfig::new("https://collector.example.com"),
        Some(Arc::new(CountingAuth::default())),
        transport,
    );
    Exporter::new(Arc::new(dispatcher), Arc::new(ledger), 4)
}

#[tokio::test]
async fn export_records_outcome() {
    let transport = Arc::new(MockTransport::scripted(vec![
        common::accepted(""),
        rejected(503),
    ]));
    let exporter = exporter_over(Arc::clone(&transport), ResponseLedger::with_all_signals());

    assert_eq!(
        exporter.export("host", TransportMessage::metrics(vec![1])).await,
        Ok(true)
    );
    assert_eq!(
        exporter.export("host", TransportMessage::metrics(vec![2])).await,
        Ok(false)
    );

    let entries = exporter.ledger().entries(SignalKind::Metrics, "host");
    let outcomes: Vec<bool> = entries.iter().map(|e| e.success).collect();
    assert_eq!(outcomes, vec![true, false]);
}

#[tokio::test]
async fn export_log_records_under_stream() {
    let transport = Arc::new(MockTransport::accepting());
    let exporter = exporter_over(Arc::clone(&transport), ResponseLedger::with_all_signals());

    let result = exporter
        .export_log("syslog", "host", TransportMessage::logs(vec![1]))
        .await;
    assert_eq!(result, Ok(true));
    assert_eq!(exporter.ledger().log_entries("syslog", "host").len(), 1);
}

#[tokio::test]
async fn mismatched_calls_send_nothing() {
    let transport = Arc::new(MockTransport::accepting());
    let exporter = exporter_over(Arc::clone(&transport), ResponseLedger::with_all_signals());

    assert_eq!(
        exporter.export("host", TransportMessage::logs(vec![1])).await,
        Err(LedgerError::LogStreamRequired)
    );
    assert_eq!(
        exporter
            .export_log("syslog", "host", TransportMessage::traces(vec![1]))
            .await,
        Err(LedgerError::UnexpectedSignal(SignalKind::Traces))
    );
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn uninitialized_storage_sends_nothing() {
    let transport = Arc::new(MockTransport::accepting());
    let exporter = exporter_over(Arc::clone(&transport), ResponseLedger::new());

    assert_eq!(
        exporter.export("host", TransportMessage::traces(vec![1])).await,
        Err(LedgerError::NotInitialized(SignalKind::Traces))
    );
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn from_config_with_blank_base_url_records_failures() {
    let exporter = Exporter::from_config(&ExportConfig::default()).unwrap();
    assert!(exporter.ledger().is_initialized(SignalKind::Logs));

    let result = exporter
        .export("host", TransportMessage::metrics(vec![1]))
        .await;
    assert_eq!(result, Ok(false));
    assert_eq!(exporter.ledger().summary(SignalKind::Metrics).failed, 1);
}

/// Sender that tracks how many posts overlap.
#[derive(Default)]
struct OverlapSender {
    current: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl PayloadSender for OverlapSender {
    async fn post_payload(&self, _message: &TransportMessage) -> bool {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        true
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spawned_exports_respect_in_flight_bound() {
    let sender = Arc::new(OverlapSender::default());
    let ledger = Arc::new(ResponseLedger::with_all_signals());
    let exporter = Exporter::new(sender.clone(), Arc::clone(&ledger), 2);

    let mut handles = Vec::new();
    for i in 0..10u8 {
        handles.push(exporter.spawn_export("host", TransportMessage::traces(vec![i])));
    }
    handles.push(exporter.spawn_export_log(
        "syslog",
        "host",
        TransportMessage::logs(vec![0]),
    ));
    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok(true));
    }

    assert!(sender.peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(ledger.entries(SignalKind::Traces, "host").len(), 10);
    assert_eq!(ledger.log_entries("syslog", "host").len(), 1);
    assert_eq!(exporter.available_permits(), 2);
}

#[tokio::test]
async fn batch_results_follow_input_order() {
    let sender = Arc::new(OverlapSender::default());
    let exporter = Exporter::new(sender.clone(), Arc::new(ResponseLedger::with_all_signals()), 3);

    let batch: Vec<(String, TransportMessage)> = (0..9u8)
        .map(|i| (format!("host-{}", i % 3), TransportMessage::metrics(vec![i])))
        .collect();
    let results = exporter.export_concurrently(batch).await;

    assert_eq!(results.len(), 9);
    assert!(results.iter().all(|r| *r == Ok(true)));
    assert!(sender.peak.load(Ordering::SeqCst) <= 3);
    for host in ["host-0", "host-1", "host-2"] {
        let bodies: Vec<u8> = exporter
            .ledger()
            .entries(SignalKind::Metrics, host)
            .iter()
            .map(|e| e.payload.as_bytes()[0])
            .collect();
        assert_eq!(bodies.len(), 3);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spawned_and_concurrent_exports_share_in_flight_bound() {
    let sender = Arc::new(OverlapSender::default());
    let ledger = Arc::new(ResponseLedger::with_all_signals());
    let exporter = Exporter::new(sender.clone(), Arc::clone(&ledger), 2);

    let handles: Vec<_> = (0..4u8)
        .map(|i| exporter.spawn_export("spawned", TransportMessage::traces(vec![i])))
        .collect();
    let batch: Vec<(String, TransportMessage)> = (0..4u8)
        .map(|i| ("batched".to_string(), TransportMessage::metrics(vec![i])))
        .collect();
    let results = exporter.export_concurrently(batch).await;
    for handle in handles {
        assert_eq!(handle.await.unwrap(), Ok(true));
    }

    assert!(results.iter().all(|r| *r == Ok(true)));
    assert!(sender.peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(ledger.entries(SignalKind::Traces, "spawned").len(), 4);
    assert_eq!(ledger.entries(SignalKind::Metrics, "batched").len(), 4);
    assert_eq!(exporter.available_permits(), 2);
}
