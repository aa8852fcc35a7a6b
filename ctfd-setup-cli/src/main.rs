//! ctfd-setup — declarative CTFd provisioning.
//!
//! # Usage
//!
//! ```text
//! ctfd-setup setup --url <URL> [--api-key <KEY>] [--file <F>] [--directory <D>] [overrides]
//! ctfd-setup validate [--file <F>] [--directory <D>] [overrides]
//! ctfd-setup probe --url <URL>
//! ```
//!
//! Overrides: `--appearance.name`, `--appearance.description`, `--admin.name`,
//! `--admin.email`, `--admin.password`, `--mode`. Every flag can also come
//! from its environment variable.

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{probe::ProbeArgs, setup::SetupArgs, validate::ValidateArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "ctfd-setup",
    version,
    about = "Provision and reconcile a CTFd instance from a YAML document",
    long_about = None,
)]
struct Cli {
    /// Log level: error, warn, info, debug (verbose is an alias of debug).
    #[arg(long, global = true, env = "CTFD_SETUP_LOG_LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bootstrap or update the instance to match the configuration.
    Setup(SetupArgs),

    /// Load and validate the configuration without contacting any instance.
    Validate(ValidateArgs),

    /// Report whether the instance is bare or already provisioned.
    Probe(ProbeArgs),
}

// ---------------------------------------------------------------------------
// Log level argument
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" | "verbose" => Ok(Self::Debug),
            other => Err(format!(
                "unknown log level '{other}'; expected: error, warn, info, debug, verbose"
            )),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `RUST_LOG` wins over `--log-level` when set. Logs go to stderr so the
/// summary on stdout stays clean.
fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level, cli.log_json);
    match cli.command {
        Commands::Setup(args) => args.run(),
        Commands::Validate(args) => args.run(),
        Commands::Probe(args) => args.run(),
    }
}
