// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `BCHydro` Portal
//!
//! Client for the BC Hydro customer portal: login, usage fetch and
//! normalization, driven by a single-flight update cycle.
//!
//! ## Architecture
//!
//! ```text
//! UpdateCycle ─┬─▶ LoginSequencer ──▶ SessionState
//!              ├─▶ UsageFetcher   ──▶ RawUsage
//!              └─▶ parse_usage_report ──▶ UsageReport
//! ```
//!
//! ## Modules
//!
//! - [`cycle`] - Update cycle controller and published state
//! - [`login`] - Form login, manual redirects, token and account lookup
//! - [`usage`] - Usage request for the current billing period
//! - [`parser`] - XML to [`bchydro_core::UsageReport`]
//! - [`markup`] - Body cleanup and the session token scan
//! - [`session`] - Credentials and session state
//! - [`settings`] - Endpoints and connection settings
//! - [`error`] - Error types and their dispositions
//!
//! ## Example
//!
//! ```ignore
//! use bchydro_portal::{Credentials, PortalSettings, UpdateCycle};
//!
//! let cycle = UpdateCycle::new(
//!     Credentials::new("user@example.com", "secret"),
//!     PortalSettings::production()?,
//! )?;
//! let report = cycle.refresh().await?;
//! println!("{:?}", report.latest_usage());
//! ```

pub mod cycle;
pub mod error;
pub mod login;
pub mod markup;
pub mod parser;
pub mod session;
pub mod settings;
pub mod usage;

pub use cycle::{CycleState, ReportState, UpdateCycle};
pub use error::{AuthError, Disposition, FetchError, ParseError, RefreshError};
pub use login::LoginSequencer;
pub use markup::{extract_session_token, TOKEN_FORMAT_VERSION};
pub use parser::parse_usage_report;
pub use session::{AccountIds, Credentials, SessionState};
pub use settings::PortalSettings;
pub use usage::{RawUsage, UsageFetcher};
