//! Routing of telemetry payloads to the collector.

mod dispatcher;
mod paths;

pub use dispatcher::{DispatcherConfig, PayloadDispatcher, PROTOBUF_CONTENT_TYPE};
pub use paths::{join_url, PathPreset, SignalPaths, UnknownPathPreset};

use async_trait::async_trait;

use crate::message::TransportMessage;

/// Capability to deliver one payload, reporting whether it was accepted.
#[async_trait]
pub trait PayloadSender: Send + Sync {
    async fn post_payload(&self, message: &TransportMessage) -> bool;
}
