// Copyright 2024-2026 GG-EXPORT Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults, validate.
//!
//! These commands never touch the network.

use crate::config::{EffectiveConfig, ExportConfig};

use super::{EXIT_FAILURE, EXIT_OK};

/// Print effective config to stdout, as JSON when `json` is set.
pub fn run_show(config: &ExportConfig, json: bool) -> i32 {
    let cfg = config.effective_config();
    if json {
        match serde_json::to_string_pretty(&cfg) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to serialize config: {}", e);
                return EXIT_FAILURE;
            }
        }
    } else {
        print!("{}", render_config(&cfg));
    }
    EXIT_OK
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() -> i32 {
    print!("{}", render_config(&ExportConfig::default().effective_config()));
    EXIT_OK
}

/// Report misconfigurations on stderr.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate(config: &ExportConfig) -> i32 {
    let warnings = config.validate();
    for warning in &warnings {
        eprintln!("WARNING: {}", warning);
    }
    if warnings.is_empty() {
        println!("Configuration is valid.");
        EXIT_OK
    } else {
        EXIT_FAILURE
    }
}

fn render_config(cfg: &EffectiveConfig) -> String {
    let lines = [
        ("GG_EXPORT_BASE_URL", cfg.base_url.clone()),
        ("GG_EXPORT_PATH_PRESET", cfg.path_preset.clone()),
        ("metrics_url", cfg.metrics_url.clone()),
        ("logs_url", cfg.logs_url.clone()),
        ("traces_url", cfg.traces_url.clone()),
        ("GG_EXPORT_TOKEN_URL", cfg.token_url.clone()),
        ("GG_EXPORT_CLIENT_ID", cfg.client_id.clone()),
        ("GG_EXPORT_CLIENT_SECRET", cfg.client_secret.clone()),
        ("GG_EXPORT_SCOPE", cfg.scope.clone().unwrap_or_default()),
        ("GG_EXPORT_REQUEST_TIMEOUT", cfg.request_timeout_secs.to_string()),
        ("GG_EXPORT_CONNECT_TIMEOUT", cfg.connect_timeout_secs.to_string()),
        ("GG_EXPORT_MAX_IN_FLIGHT", cfg.max_in_flight.to_string()),
        ("GG_EXPORT_LOG_FORMAT", cfg.log_format.clone()),
        ("GG_EXPORT_LOG_LEVEL", cfg.log_level.clone()),
    ];
    lines
        .iter()
        .map(|(key, value)| format!("{}={}\n", key, value))
        .collect()
}
