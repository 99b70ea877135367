// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! BC Hydro CLI - electricity usage from the customer portal.
//!
//! # Examples
//!
//! ```bash
//! # Store credentials once
//! bchydro config set-credentials user@example.com
//!
//! # Show current usage
//! bchydro
//!
//! # JSON output
//! bchydro --format json --pretty
//!
//! # Poll every 5 minutes
//! bchydro watch
//!
//! # Verify the login works
//! bchydro check
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use bchydro_portal::{AuthError, FetchError, RefreshError};
use bchydro_store::Config;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{check, config, usage, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// BC Hydro CLI - electricity usage from the customer portal.
#[derive(Parser)]
#[command(name = "bchydro")]
#[command(about = "BC Hydro usage polling CLI")]
#[command(long_about = r#"
Logs into the BC Hydro customer portal and reports electricity usage
for the current billing period.

Credentials come from BCHYDRO_USERNAME / BCHYDRO_PASSWORD or the
config file (see `bchydro config path`).

Examples:
  bchydro                        # Current usage
  bchydro --format json          # JSON output
  bchydro watch                  # Poll on the configured interval
  bchydro check                  # Validate credentials
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'usage' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Config file to use instead of the default location.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Config file path in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch current usage (default if no command specified).
    #[command(visible_alias = "u")]
    Usage(usage::UsageArgs),

    /// Poll on an interval and redraw.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Validate credentials by logging in.
    Check,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// Login rejected or session unusable.
    AuthFailed = 2,
    /// Parse error.
    ParseError = 3,
    /// Timeout.
    Timeout = 4,
}

impl ExitCode {
    /// Exit code for a failed cycle.
    pub fn for_refresh_error(err: &RefreshError) -> Self {
        match err {
            RefreshError::Auth(AuthError::Timeout) | RefreshError::Fetch(FetchError::Timeout) => {
                ExitCode::Timeout
            }
            RefreshError::Auth(e) if !e.is_transient() => ExitCode::AuthFailed,
            RefreshError::Fetch(FetchError::ReauthRequired) => ExitCode::AuthFailed,
            RefreshError::Parse(_) => ExitCode::ParseError,
            RefreshError::Auth(_) | RefreshError::Fetch(_) => ExitCode::Error,
        }
    }

    /// Ends the process with this code.
    pub fn exit(self) -> ! {
        std::process::exit(self as i32)
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("bchydro=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bchydro=warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Some(Commands::Usage(args)) => usage::run(args, &cli).await,
        Some(Commands::Watch(args)) => watch::run(args, &cli).await,
        Some(Commands::Check) => check::run(&cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        None => usage::run(&usage::UsageArgs::default(), &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        ExitCode::Error.exit();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bchydro_portal::ParseError;

    #[test]
    fn test_cli_parses_globals_after_subcommand() {
        let cli = Cli::parse_from(["bchydro", "usage", "--format", "json", "--pretty"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.pretty);
        assert!(matches!(cli.command, Some(Commands::Usage(_))));
    }

    #[test]
    fn test_cli_config_override() {
        let cli = Cli::parse_from(["bchydro", "--config", "/tmp/bch.json", "check"]);
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/bch.json"));
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn test_exit_codes() {
        let cases = [
            (RefreshError::Auth(AuthError::TokenNotFound), ExitCode::AuthFailed),
            (RefreshError::Fetch(FetchError::ReauthRequired), ExitCode::AuthFailed),
            (RefreshError::Auth(AuthError::Timeout), ExitCode::Timeout),
            (RefreshError::Fetch(FetchError::Timeout), ExitCode::Timeout),
            (RefreshError::Auth(AuthError::Network("reset".into())), ExitCode::Error),
            (RefreshError::Fetch(FetchError::UnexpectedStatus(500)), ExitCode::Error),
            (RefreshError::Parse(ParseError::Malformed("eof".into())), ExitCode::ParseError),
        ];
        for (err, code) in cases {
            assert_eq!(ExitCode::for_refresh_error(&err), code, "{err}");
        }
    }
}
