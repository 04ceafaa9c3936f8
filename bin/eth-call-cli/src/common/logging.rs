//! Logging configuration for the eth-call CLI tool.
//!
//! Provides CLI arguments for configuring tracing/logging output with support for:
//! - Verbosity levels via `-v/-vv/-vvv` flags
//! - Custom log filters via `RUST_LOG` environment variable
//! - Log file output via `--log.file` flag

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use super::{CliError, Result};

/// Logging configuration arguments.
#[derive(Debug, Clone, Default, Parser)]
pub struct LogArgs {
    /// Increase logging verbosity (-v = error, -vv = warn, -vvv = info, -vvvv = debug, -vvvvv =
    /// trace)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log file path. If specified, logs are written to this file instead of stderr.
    #[arg(long = "log.file", visible_aliases = ["log-file"], global = true)]
    pub log_file: Option<PathBuf>,

    /// Disable colorful console logging. Only applies when logging to stderr (no --log.file).
    #[arg(long = "log.no-color", visible_aliases = ["log-no-color"], global = true)]
    pub log_no_color: bool,
}

impl LogArgs {
    /// The filter selected by `RUST_LOG` or, if unset, by the verbosity flags.
    pub fn filter(&self) -> EnvFilter {
        if std::env::var("RUST_LOG").is_ok() {
            return EnvFilter::from_default_env();
        }
        let level = match self.verbose {
            0 => return EnvFilter::new("off"),
            1 => Level::ERROR,
            2 => Level::WARN,
            3 => Level::INFO,
            4 => Level::DEBUG,
            _ => Level::TRACE,
        };
        EnvFilter::new(format!("eth_call={level},eth_call_cli={level}"))
    }

    /// Initialize the tracing subscriber based on the logging configuration.
    ///
    /// Log target is only shown for DEBUG level and above. Logs go to stderr so that stdout
    /// carries nothing but responses.
    pub fn init(&self) -> Result<()> {
        let show_target = self.verbose >= 4;
        let builder = fmt().with_env_filter(self.filter()).with_target(show_target);

        let result = if let Some(ref log_file) = self.log_file {
            let file = std::fs::File::create(log_file)?;
            builder.with_writer(file).with_ansi(false).try_init()
        } else {
            builder.with_writer(std::io::stderr).with_ansi(!self.log_no_color).try_init()
        };
        result.map_err(|err| CliError::Logging(err.to_string()))
    }
}
