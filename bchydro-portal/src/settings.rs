//! Portal endpoints and connection settings.

use std::time::Duration;

use bchydro_fetch::{HttpClient, HttpError};
use url::Url;

/// Production portal origin.
pub const PORTAL_BASE_URL: &str = "https://app.bchydro.com";

/// Login form target, relative to the origin.
pub const LOGIN_PATH: &str = "/sso/UI/Login";

/// Account metadata endpoint, relative to the origin.
pub const ACCOUNT_PATH: &str = "/evportlet/web/global-data.html";

/// Usage data endpoint, relative to the origin.
pub const USAGE_PATH: &str = "/evportlet/web/consumption-data.html";

/// Page the SSO service lands on after a successful login.
pub const DEFAULT_GOTO_URL: &str = "https://app.bchydro.com:443/BCHCustomerPortal/web/login.html";

/// User agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "https://github.com/emcniece/hass-bchydro#disclaimer";

/// Redirect hops allowed during login.
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Parent domain every production endpoint lives under.
const PORTAL_DOMAIN: &str = "bchydro.com";

/// Where and how the portal is reached.
#[derive(Debug, Clone)]
pub struct PortalSettings {
    /// Login form target.
    pub login_url: Url,
    /// Account metadata endpoint.
    pub account_url: Url,
    /// Usage data endpoint.
    pub usage_url: Url,
    /// `gotoUrl` form field sent with the login.
    pub goto_url: String,
    /// User agent header.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Redirect hop limit for the login chain.
    pub max_redirects: u32,
}

impl PortalSettings {
    /// Settings for a portal rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let base = Url::parse(base_url)?;
        Ok(Self {
            login_url: base.join(LOGIN_PATH)?,
            account_url: base.join(ACCOUNT_PATH)?,
            usage_url: base.join(USAGE_PATH)?,
            goto_url: DEFAULT_GOTO_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        })
    }

    /// Settings for the production portal.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the origin is a constant.
    pub fn production() -> Result<Self, url::ParseError> {
        Self::new(PORTAL_BASE_URL)
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the redirect hop limit.
    #[must_use]
    pub fn with_max_redirects(mut self, max_redirects: u32) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Hosts the client may talk to: the configured endpoints plus the
    /// production parent domain that SSO redirects bounce through.
    pub fn allowed_domains(&self) -> Vec<String> {
        let mut domains = vec![PORTAL_DOMAIN.to_string()];
        for url in [&self.login_url, &self.account_url, &self.usage_url] {
            if let Some(host) = url.host_str() {
                if !domains.iter().any(|d| d == host) {
                    domains.push(host.to_string());
                }
            }
        }
        domains
    }

    /// Builds the HTTP client these settings describe.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be built.
    pub fn build_client(&self) -> Result<HttpClient, HttpError> {
        Ok(HttpClient::new(&self.user_agent, self.timeout)?
            .with_allowed_domains(self.allowed_domains()))
    }
}
