// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `BCHydro` Store
//!
//! Configuration and persistence for the BC Hydro poller.
//!
//! - **Config**: account, polling and portal settings stored as JSON
//! - **Persistence**: owner-only file I/O helpers
//!
//! ## Usage
//!
//! ```ignore
//! use bchydro_store::Config;
//! use bchydro_portal::UpdateCycle;
//!
//! let config = Config::load().await?;
//! let cycle = UpdateCycle::new(config.credentials()?, config.portal_settings()?)?;
//! ```

pub mod config;
pub mod error;
pub mod persistence;

pub use config::{AccountConfig, Config, PollingConfig, PortalConfig, PASSWORD_ENV, USERNAME_ENV};
pub use error::StoreError;
pub use persistence::{default_config_dir, default_config_path, load_json, save_json};
