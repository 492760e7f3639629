//! Telemetry for GG-EXPORT itself.
//!
//! Structured logging, request spans, auth audit events and metrics about
//! the export pipeline (not the telemetry being exported).

pub mod auth_log;
mod logging;
mod metrics;
mod spans;

pub use auth_log::{log_auth_event, AuthEvent, AuthSeverity};
pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{
    init_metrics, record_export, record_ledger_append, record_precondition_failure,
    record_token_refresh,
};
pub use spans::{ExportSpan, SpanExt};
