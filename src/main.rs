//! `gg-export-cli` entry point.
//!
//! ## CLI Subcommands
//!
//! - `gg-export-cli send <kind> <file>` - Post one payload file to the collector
//! - `gg-export-cli token` - Fetch an access token and show its expiry
//! - `gg-export-cli config show|defaults|validate` - Inspect configuration

use std::process::ExitCode;

use gg_export::cli::{self, config_cmd, EXIT_CONFIG, EXIT_FAILURE};
use gg_export::config::ExportConfig;
use gg_export::telemetry::{init_logging, init_metrics};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");
    let rest = args.get(2..).unwrap_or_default();

    let code = match command {
        "send" => match load(&args) {
            Ok(config) => match cli::parse_send_args(rest) {
                Ok(send_args) => cli::run_send(&config, &send_args).await,
                Err(e) => {
                    eprintln!("send: {}", e);
                    print_command_help("send");
                    EXIT_CONFIG
                }
            },
            Err(code) => code,
        },
        "token" => match load(&args) {
            Ok(config) => cli::run_token(&config, cli::has_flag(rest, "--reveal")).await,
            Err(code) => code,
        },
        "config" => {
            let subcommand = rest.first().map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "defaults" => config_cmd::run_defaults(),
                "show" | "validate" => match cli::load_config(&args) {
                    Ok(config) if subcommand == "show" => {
                        config_cmd::run_show(&config, cli::has_flag(rest, "--json"))
                    }
                    Ok(config) => config_cmd::run_validate(&config),
                    Err(e) => {
                        eprintln!("{}", e);
                        EXIT_CONFIG
                    }
                },
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    EXIT_CONFIG
                }
            }
        }
        "help" | "--help" | "-h" => {
            match rest.first() {
                Some(subcommand) => print_command_help(subcommand),
                None => print_usage(),
            }
            0
        }
        "version" | "--version" | "-V" => {
            println!("gg-export {}", env!("CARGO_PKG_VERSION"));
            0
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            EXIT_FAILURE
        }
    };
    ExitCode::from(code as u8)
}

/// Load config and install logging and metrics descriptions.
fn load(args: &[String]) -> Result<ExportConfig, i32> {
    let config = cli::load_config(args).map_err(|e| {
        eprintln!("{}", e);
        EXIT_CONFIG
    })?;
    if let Err(e) = init_logging(&config.log_config()) {
        eprintln!("Logging disabled: {}", e);
    }
    init_metrics();
    Ok(config)
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "gg-export - OTLP telemetry export transport v{}

USAGE:
    gg-export-cli <COMMAND> [OPTIONS]

COMMANDS:
    send         Post a pre-encoded payload file to the collector
    token        Fetch an OAuth access token and show its expiry
    config       Inspect configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

OPTIONS:
    --config FILE  Read settings from a TOML file instead of the environment

ENVIRONMENT:
    GG_EXPORT_BASE_URL       Collector base URL
    GG_EXPORT_PATH_PRESET    otlp (default) or otlp-prefixed
    GG_EXPORT_TOKEN_URL      OAuth token endpoint (unset = no auth)
    GG_EXPORT_CLIENT_ID      OAuth client id
    GG_EXPORT_CLIENT_SECRET  OAuth client secret
    GG_EXPORT_LOG_LEVEL      Log filter (default: info)

EXIT CODES:
    0  Success
    1  Export or token request failed
    2  Configuration error
",
        version
    );
}

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "send" => {
            eprintln!(
                "gg-export-cli send - Post one payload

USAGE:
    gg-export-cli send <metrics|logs|traces> <FILE> [OPTIONS]

OPTIONS:
    --resource KEY     Ledger resource key (default: default)
    --log-stream NAME  Log stream for logs payloads (default: resource key)
    --config FILE      Load configuration from file

DESCRIPTION:
    Reads FILE as an already-encoded protobuf payload and posts it to the
    collector path for the given signal. Prints a JSON summary on success.

EXIT CODES:
    0  Collector accepted the payload
    1  Payload refused or request failed
    2  Bad arguments or configuration

EXAMPLES:
    gg-export-cli send metrics batch.pb --resource host-1
    gg-export-cli send logs batch.pb --log-stream syslog
"
            );
        }
        "token" => {
            eprintln!(
                "gg-export-cli token - Fetch an access token

USAGE:
    gg-export-cli token [--reveal] [--config FILE]

DESCRIPTION:
    Runs the client-credentials grant against GG_EXPORT_TOKEN_URL and
    prints the expiry. The token is redacted unless --reveal is given.
"
            );
        }
        "config" => {
            eprintln!(
                "gg-export-cli config - Inspect configuration

USAGE:
    gg-export-cli config show [--json]
    gg-export-cli config defaults
    gg-export-cli config validate

DESCRIPTION:
    show      Effective values, with resolved collector URLs
    defaults  Built-in defaults, ignoring the environment
    validate  Warn about blank URLs, missing credentials and plain http
"
            );
        }
        _ => print_usage(),
    }
}
