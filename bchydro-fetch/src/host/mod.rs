//! Host APIs.
//!
//! - [`http`] - HTTP client with tracing, manual redirects and domain allowlist

pub mod http;
