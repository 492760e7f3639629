//! Export metrics through the `metrics` facade.
//!
//! Nothing is recorded unless the host process installs a recorder.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

use crate::message::SignalKind;

const EXPORT_REQUESTS: &str = "gg_export_requests_total";
const EXPORT_LATENCY: &str = "gg_export_request_duration_seconds";
const EXPORT_SKIPPED: &str = "gg_export_precondition_failures_total";
const TOKEN_REFRESHES: &str = "gg_export_token_refreshes_total";
const LEDGER_APPENDS: &str = "gg_export_ledger_appends_total";

/// Register metric descriptions. Safe to call more than once.
pub fn init_metrics() {
    describe_counter!(EXPORT_REQUESTS, Unit::Count, "Export POSTs by signal and outcome");
    describe_histogram!(EXPORT_LATENCY, Unit::Seconds, "Export POST round-trip time");
    describe_counter!(
        EXPORT_SKIPPED,
        Unit::Count,
        "Exports refused before any network activity"
    );
    describe_counter!(TOKEN_REFRESHES, Unit::Count, "Access token fetches by outcome");
    describe_counter!(LEDGER_APPENDS, Unit::Count, "Ledger entries by signal and outcome");
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

pub fn record_export(signal: SignalKind, success: bool, latency: Duration) {
    counter!(EXPORT_REQUESTS, "signal" => signal.as_str(), "outcome" => outcome(success))
        .increment(1);
    histogram!(EXPORT_LATENCY, "signal" => signal.as_str()).record(latency.as_secs_f64());
}

pub fn record_precondition_failure(signal: SignalKind, reason: &'static str) {
    counter!(EXPORT_SKIPPED, "signal" => signal.as_str(), "reason" => reason).increment(1);
}

pub fn record_token_refresh(success: bool) {
    counter!(TOKEN_REFRESHES, "outcome" => outcome(success)).increment(1);
}

pub fn record_ledger_append(signal: SignalKind, success: bool) {
    counter!(LEDGER_APPENDS, "signal" => signal.as_str(), "outcome" => outcome(success))
        .increment(1);
}
