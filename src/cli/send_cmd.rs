// Copyright 2024-2026 GG-EXPORT Contributors
// SPDX-License-Identifier: Apache-2.0

//! `send` subcommand: post one pre-encoded payload file to the collector.

use std::path::PathBuf;

use crate::config::ExportConfig;
use crate::message::{SignalKind, TransportMessage};
use crate::Exporter;

use super::{flag_value, DEFAULT_RESOURCE, EXIT_CONFIG, EXIT_FAILURE, EXIT_OK};

/// Parsed `send` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendArgs {
    pub kind: SignalKind,
    pub file: PathBuf,
    pub resource: String,
    /// Only meaningful for logs; defaults to the resource key.
    pub log_stream: Option<String>,
}

/// Parse `send <kind> <file> [--resource K] [--log-stream S]`.
///
/// `args` starts after the `send` token.
pub fn parse_send_args(args: &[String]) -> Result<SendArgs, String> {
    let kind = args
        .first()
        .ok_or("missing signal kind (metrics, logs or traces)")?
        .parse::<SignalKind>()
        .map_err(|e| e.to_string())?;
    let file = args
        .get(1)
        .filter(|a| !a.starts_with("--"))
        .ok_or("missing payload file")?;
    let log_stream = flag_value(args, "--log-stream").map(str::to_string);
    if log_stream.is_some() && kind != SignalKind::Logs {
        return Err(format!("--log-stream only applies to logs, not {}", kind));
    }
    Ok(SendArgs {
        kind,
        file: PathBuf::from(file),
        resource: flag_value(args, "--resource")
            .unwrap_or(DEFAULT_RESOURCE)
            .to_string(),
        log_stream,
    })
}

/// Run `send`. Prints the ledger summary for the signal as JSON on success.
pub async fn run_send(config: &ExportConfig, args: &SendArgs) -> i32 {
    let body = match tokio::fs::read(&args.file).await {
        Ok(body) => body,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.file.display(), e);
            return EXIT_CONFIG;
        }
    };
    let exporter = match Exporter::from_config(config) {
        Ok(exporter) => exporter,
        Err(e) => {
            eprintln!("Failed to build exporter: {}", e);
            return EXIT_CONFIG;
        }
    };

    let message = TransportMessage::new(args.kind, body);
    let bytes = message.len();
    let result = match args.kind {
        SignalKind::Logs => {
            let stream = args.log_stream.as_deref().unwrap_or(&args.resource);
            exporter.export_log(stream, &args.resource, message).await
        }
        _ => exporter.export(&args.resource, message).await,
    };

    match result {
        Ok(true) => {
            println!(
                "{}",
                serde_json::json!({
                    "signal": args.kind.as_str(),
                    "resource": args.resource,
                    "bytes": bytes,
                    "accepted": true,
                })
            );
            EXIT_OK
        }
        Ok(false) => {
            eprintln!("Collector did not accept the {} payload", args.kind);
            EXIT_FAILURE
        }
        Err(e) => {
            eprintln!("Export failed: {}", e);
            EXIT_FAILURE
        }
    }
}
