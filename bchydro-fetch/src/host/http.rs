//! HTTP client with tracing, manual redirects and domain allowlist.
//!
//! This module provides a wrapped HTTP client that adds:
//! - Request/response tracing
//! - Domain allowlist, checked on every hop
//! - Explicit cookie header from a caller-owned [`CookieJar`]
//! - Redirects surfaced to the caller instead of followed

use std::time::Duration;

use reqwest::{
    header::{self, HeaderMap},
    redirect, Client, RequestBuilder, StatusCode,
};
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use crate::cookies::CookieJar;
use crate::error::HttpError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Page
// ============================================================================

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct Page {
    /// URL the request was sent to.
    pub url: Url,
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl Page {
    /// Returns true for statuses that carry a `Location` to follow.
    pub fn is_redirect(&self) -> bool {
        matches!(self.status.as_u16(), 301 | 302 | 303 | 307 | 308)
    }

    /// Resolves the `Location` header against the request URL.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::MissingLocation`] if there is no readable
    /// header, or [`HttpError::InvalidUrl`] if it cannot be resolved.
    pub fn location(&self) -> Result<Url, HttpError> {
        let raw = self
            .headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .ok_or(HttpError::MissingLocation)?;

        self.url
            .join(raw.trim())
            .map_err(|e| HttpError::InvalidUrl(format!("{raw}: {e}")))
    }

    /// Body decoded as UTF-8, invalid sequences replaced.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing and domain allowlist.
///
/// Automatic redirect following is disabled: every 3xx comes back to the
/// caller as a [`Page`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClient {
    /// Creates a client with a fixed user agent and per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be built, which
    /// only happens with a broken TLS configuration.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            inner,
            allowed_domains: None,
        })
    }

    /// Restricts requests to the given domains and their subdomains.
    #[must_use]
    pub fn with_allowed_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &Url) -> Result<(), HttpError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(()); // No restrictions
        };

        let host = url
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl(format!("No host in URL: {url}")))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(HttpError::DomainNotAllowed(host.to_string()))
        }
    }

    /// Performs a GET request carrying the jar's cookies.
    #[instrument(skip(self, jar), fields(url = %url))]
    pub async fn get(&self, url: &Url, jar: &CookieJar) -> Result<Page, HttpError> {
        self.is_domain_allowed(url)?;
        debug!("GET request");

        self.send(url, self.inner.get(url.clone()), jar).await
    }

    /// Performs a POST request with form data and extra headers.
    #[instrument(skip(self, form, headers, jar), fields(url = %url))]
    pub async fn post_form<T: Serialize + ?Sized>(
        &self,
        url: &Url,
        form: &T,
        headers: HeaderMap,
        jar: &CookieJar,
    ) -> Result<Page, HttpError> {
        self.is_domain_allowed(url)?;
        debug!("POST request with form data");

        let request = self.inner.post(url.clone()).headers(headers).form(form);
        self.send(url, request, jar).await
    }

    async fn send(
        &self,
        url: &Url,
        request: RequestBuilder,
        jar: &CookieJar,
    ) -> Result<Page, HttpError> {
        let request = match jar.header_for(url) {
            Some(cookies) => request.header(header::COOKIE, cookies),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        debug!(status = %status, bytes = body.len(), "Response received");

        Ok(Page {
            url: url.clone(),
            status,
            headers,
            body,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
