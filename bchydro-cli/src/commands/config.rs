//! Config command - manage configuration.

use std::path::Path;

use anyhow::{Context, Result};
use bchydro_store::{default_config_dir, Config, PASSWORD_ENV};
use clap::{Args, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use super::load_config;
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Store portal credentials in the config file.
    SetCredentials {
        /// Login email.
        username: String,
        /// Password. Read from BCHYDRO_PASSWORD or stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },

    /// Set the polling interval.
    Interval {
        /// Seconds between update cycles.
        seconds: u64,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::SetCredentials { username, password } => {
            set_credentials(username, password.as_deref(), cli).await
        }
        ConfigAction::Interval { seconds } => set_interval(*seconds, cli).await,
        ConfigAction::Reset => reset_config(cli).await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let config = redacted(load_config(cli).await?);

    match cli.format {
        OutputFormat::Text => {
            let unset = || "(not set)".to_string();
            println!("BC Hydro Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Username:         {}", config.account.username.clone().unwrap_or_else(unset));
            println!("Password:         {}", config.account.password.clone().unwrap_or_else(unset));
            println!("Portal:           {}", config.portal.base_url);
            println!("Refresh interval: {}s", config.polling.refresh_interval);
            println!("Request timeout:  {}s", config.polling.timeout);
            println!("Max redirects:    {}", config.polling.max_redirects);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&config)?);
        }
    }

    Ok(())
}

/// Masks the stored password for display.
fn redacted(mut config: Config) -> Config {
    config.account.password = config.account.password.map(|_| "***".to_string());
    config
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let config_path = cli.config_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:  {}", config_dir.display());
            println!("Config file: {}", config_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "config_file": config_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_credentials(username: &str, password: Option<&str>, cli: &Cli) -> Result<()> {
    let password = match password {
        Some(password) => password.to_string(),
        None => match std::env::var(PASSWORD_ENV) {
            Ok(password) if !password.is_empty() => password,
            _ => read_password_line().await?,
        },
    };
    if username.trim().is_empty() || password.is_empty() {
        anyhow::bail!("Username and password must not be empty");
    }

    let path = cli.config_path();
    let mut config = load_config(cli).await?;
    config.set_credentials(username.trim(), password);
    save(&config, &path).await?;

    info!(username = %username.trim(), "Credentials stored");
    println!("Credentials saved to {}", path.display());

    Ok(())
}

async fn read_password_line() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("reading password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn set_interval(seconds: u64, cli: &Cli) -> Result<()> {
    let path = cli.config_path();
    let mut config = load_config(cli).await?;
    config.polling.refresh_interval = seconds;
    save(&config, &path).await?;

    info!(seconds, "Refresh interval updated");
    println!("Refresh interval set to: {seconds}s");

    Ok(())
}

async fn reset_config(cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    if path.exists() {
        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "Config reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}

async fn save(config: &Config, path: &Path) -> Result<()> {
    config
        .save_to(path)
        .await
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_masks_password() {
        let mut config = Config::default();
        config.set_credentials("user@example.com", "hunter2");

        let shown = redacted(config);
        assert_eq!(shown.account.username.as_deref(), Some("user@example.com"));
        assert_eq!(shown.account.password.as_deref(), Some("***"));
    }

    #[test]
    fn test_redacted_leaves_missing_password() {
        let shown = redacted(Config::default());
        assert!(shown.account.password.is_none());
    }
}
