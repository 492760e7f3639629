// Copyright 2024-2026 GG-EXPORT Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI module for `gg-export-cli` commands.
//!
//! ## Usage
//!
//! ```bash
//! gg-export-cli send metrics batch.pb --resource host-1
//! gg-export-cli send logs batch.pb --log-stream syslog --resource host-1
//! gg-export-cli token
//! gg-export-cli config show
//! ```
//!
//! Every command accepts `--config FILE` to read a TOML file instead of the
//! `GG_EXPORT_*` environment.

pub mod config_cmd;
pub mod send_cmd;
pub mod token_cmd;

pub use send_cmd::{parse_send_args, run_send, SendArgs};
pub use token_cmd::run_token;

use crate::config::{self, ConfigError, ExportConfig};

/// Command succeeded.
pub const EXIT_OK: i32 = 0;
/// Command ran but the export or token request failed.
pub const EXIT_FAILURE: i32 = 1;
/// Bad arguments or unusable configuration.
pub const EXIT_CONFIG: i32 = 2;

/// Resource key used when `--resource` is not given.
pub const DEFAULT_RESOURCE: &str = "default";

/// Value following `flag`, if present.
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Load from `--config FILE` when given, otherwise from the environment.
pub fn load_config(args: &[String]) -> Result<ExportConfig, ConfigError> {
    match flag_value(args, "--config") {
        Some(path) => ExportConfig::load_file(path),
        None => Ok(config::load()),
    }
}
