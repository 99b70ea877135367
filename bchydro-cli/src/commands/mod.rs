//! CLI command implementations.

pub mod check;
pub mod config;
pub mod usage;
pub mod watch;

use anyhow::{Context, Result};
use bchydro_portal::UpdateCycle;
use bchydro_store::Config;
use tracing::debug;

use crate::Cli;

/// Loads the config file named on the command line, or the default one.
pub async fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config_path();
    debug!(path = %path.display(), "Loading config");
    Config::load_from(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

/// Builds an update cycle from the config.
pub fn build_cycle(config: &Config) -> Result<UpdateCycle> {
    let credentials = config.credentials()?;
    let settings = config.portal_settings()?;
    Ok(UpdateCycle::new(credentials, settings)?)
}
