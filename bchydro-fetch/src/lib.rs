// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `BCHydro` Fetch
//!
//! HTTP transport for the portal client.
//!
//! The portal has no public API: it is a session-cookie web application
//! that answers with redirect chains, HTML and XML. This crate provides the
//! pieces needed to talk to it one hop at a time:
//!
//! - [`host::http::HttpClient`] - reqwest wrapper with a fixed user agent,
//!   a per-request timeout, a domain allowlist and automatic redirects
//!   turned off
//! - [`host::http::Page`] - a fully read response, including the redirect
//!   target resolved against the request URL
//! - [`cookies::CookieJar`] - explicit, ordered cookie store that the
//!   caller merges responses into and reads request headers from
//!
//! ## Example
//!
//! ```ignore
//! use bchydro_fetch::{CookieJar, HttpClient};
//!
//! let client = HttpClient::new("my-agent", Duration::from_secs(10))?;
//! let mut jar = CookieJar::new();
//!
//! let page = client.get(&url, &jar).await?;
//! jar.store_response(&page.url, &page.headers);
//! ```

pub mod cookies;
pub mod error;
pub mod host;

// Re-export key types at crate root
pub use cookies::{CookieJar, StoredCookie};
pub use error::HttpError;
pub use host::http::{HttpClient, Page};
