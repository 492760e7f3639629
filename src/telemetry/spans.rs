//! Span helpers for export and token requests.

use tracing::{info_span, Span};

use crate::message::SignalKind;

/// Extension trait for recording outcomes into a span.
pub trait SpanExt {
    /// Record `status` and, on error, `error.message`.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;

    /// Record a boolean transport outcome as `status`.
    fn record_outcome(&self, success: bool);
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }

    fn record_outcome(&self, success: bool) {
        self.record("status", if success { "ok" } else { "error" });
    }
}

/// Factory for export request spans.
pub struct ExportSpan;

impl ExportSpan {
    /// Span for one `post_payload` call.
    ///
    /// `status`, `http.status`, `latency_ms` and `payload_bytes` are filled
    /// in by the dispatcher once the request completes.
    pub fn new(request_id: &str, signal: SignalKind) -> Span {
        info_span!(
            "export_request",
            request_id = %request_id,
            signal = signal.as_str(),
            status = tracing::field::Empty,
            http.status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
            payload_bytes = tracing::field::Empty,
        )
    }
}
