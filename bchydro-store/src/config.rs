//! Configuration management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bchydro_portal::{settings::PORTAL_BASE_URL, Credentials, PortalSettings};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_config_path, load_json, save_json};

/// Environment variable that overrides the configured username.
pub const USERNAME_ENV: &str = "BCHYDRO_USERNAME";

/// Environment variable that overrides the configured password.
pub const PASSWORD_ENV: &str = "BCHYDRO_PASSWORD";

/// Application configuration. One file describes one portal account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Portal account.
    #[serde(default)]
    pub account: AccountConfig,
    /// Polling behavior.
    #[serde(default)]
    pub polling: PollingConfig,
    /// Portal location.
    #[serde(default)]
    pub portal: PortalConfig,
}

/// Portal login.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Login email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Login password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Polling behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Seconds between update cycles.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Redirect hop limit during login.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
}

/// Portal location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Origin all endpoints are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_refresh_interval() -> u64 {
    300
}

fn default_timeout() -> u64 {
    10
}

fn default_max_redirects() -> u32 {
    10
}

fn default_base_url() -> String {
    PORTAL_BASE_URL.to_string()
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            timeout: default_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub async fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path()).await
    }

    /// Loads configuration from a specific path, or defaults if absent.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        let Some(config) = load_json::<Config>(path).await? else {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        };

        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        self.validate()?;
        save_json(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.polling.refresh_interval == 0 {
            return Err(StoreError::Config("refresh_interval must be at least 1 second".into()));
        }
        if self.polling.timeout == 0 {
            return Err(StoreError::Config("timeout must be at least 1 second".into()));
        }
        url::Url::parse(&self.portal.base_url)
            .map_err(|e| StoreError::Config(format!("base_url {}: {e}", self.portal.base_url)))?;
        Ok(())
    }

    /// Time between update cycles.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.polling.refresh_interval)
    }

    /// Credentials from the environment, falling back to the file.
    pub fn credentials(&self) -> Result<Credentials, StoreError> {
        self.credentials_with(|key| std::env::var(key).ok())
    }

    /// Credentials resolved through `lookup` for the environment overrides.
    pub fn credentials_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Credentials, StoreError> {
        let pick = |key: &'static str, stored: &Option<String>| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .or_else(|| stored.clone().filter(|v| !v.is_empty()))
                .ok_or(StoreError::MissingCredentials(key))
        };

        let username = pick(USERNAME_ENV, &self.account.username)?;
        let password = pick(PASSWORD_ENV, &self.account.password)?;
        Ok(Credentials::new(username, password))
    }

    /// Stores credentials in the file-backed part of the config.
    pub fn set_credentials(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.account.username = Some(username.into());
        self.account.password = Some(password.into());
    }

    /// Portal settings described by this config.
    pub fn portal_settings(&self) -> Result<PortalSettings, StoreError> {
        let settings = PortalSettings::new(&self.portal.base_url)
            .map_err(|e| StoreError::Config(format!("base_url {}: {e}", self.portal.base_url)))?;
        Ok(settings
            .with_timeout(Duration::from_secs(self.polling.timeout))
            .with_max_redirects(self.polling.max_redirects))
    }
}
