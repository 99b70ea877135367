//! Login sequence.
//!
//! 1. POST the credentials form to the SSO endpoint.
//! 2. Follow each redirect by hand, merging `Set-Cookie` from every hop.
//! 3. Scan the landing page for the `bchydroparam` token.
//! 4. GET the account metadata with the collected cookies.
//!
//! Only when all four steps succeed is a [`SessionState`] returned.

use bchydro_fetch::{CookieJar, HttpClient, Page};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::AuthError;
use crate::markup::{clean_text, extract_session_token};
use crate::session::{AccountIds, Credentials, SessionState};
use crate::settings::PortalSettings;

/// SSO realm the portal logs into.
pub const LOGIN_REALM: &str = "bch-ps";

/// Drives a login against the portal.
#[derive(Debug)]
pub struct LoginSequencer<'a> {
    http: &'a HttpClient,
    settings: &'a PortalSettings,
}

impl<'a> LoginSequencer<'a> {
    /// Creates a sequencer over a shared client.
    pub fn new(http: &'a HttpClient, settings: &'a PortalSettings) -> Self {
        Self { http, settings }
    }

    /// Runs the full login and returns a ready session.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] naming the step that failed. No partial
    /// session is ever produced.
    #[instrument(skip(self, credentials), fields(user = %credentials.username()))]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<SessionState, AuthError> {
        let mut jar = CookieJar::new();

        let form = [
            ("realm", LOGIN_REALM),
            ("email", credentials.username()),
            ("password", credentials.password()),
            ("gotoUrl", self.settings.goto_url.as_str()),
        ];
        debug!("Submitting login form");
        let page = self
            .http
            .post_form(&self.settings.login_url, &form, HeaderMap::new(), &jar)
            .await?;
        jar.store_response(&page.url, &page.headers);

        let landing = self.follow_redirects(page, &mut jar).await?;
        let token = extract_session_token(&clean_text(&landing.body)).ok_or_else(|| {
            warn!(url = %landing.url, "Landing page has no session token");
            AuthError::TokenNotFound
        })?;
        debug!(token_len = token.len(), "Session token found");

        let account = self.fetch_account(&mut jar).await?;
        info!(
            subscriber_id = %account.subscriber_id,
            cookies = jar.len(),
            "Portal login complete"
        );

        Ok(SessionState::new(jar, token, account))
    }

    /// Follows redirects until a non-redirect response, up to the hop limit.
    async fn follow_redirects(&self, mut page: Page, jar: &mut CookieJar) -> Result<Page, AuthError> {
        let limit = self.settings.max_redirects;
        let mut hops = 0;

        while page.is_redirect() {
            if hops >= limit {
                warn!(limit, "Login redirect chain did not settle");
                return Err(AuthError::TooManyRedirects { limit });
            }
            hops += 1;

            let next = page.location()?;
            debug!(hop = hops, url = %next, "Following login redirect");
            page = self.http.get(&next, jar).await?;
            jar.store_response(&page.url, &page.headers);
        }

        if page.status.as_u16() != 200 {
            return Err(AuthError::UnexpectedStatus(page.status.as_u16()));
        }
        Ok(page)
    }

    /// Fetches the subscriber id and account number.
    async fn fetch_account(&self, jar: &mut CookieJar) -> Result<AccountIds, AuthError> {
        let page = self.http.get(&self.settings.account_url, jar).await?;
        jar.store_response(&page.url, &page.headers);

        if page.status.as_u16() != 200 {
            return Err(AuthError::UnexpectedStatus(page.status.as_u16()));
        }
        parse_account_info(&clean_text(&page.body))
    }
}

// ============================================================================
// Account Metadata
// ============================================================================

#[derive(Debug, Deserialize)]
struct AccountInfoResponse {
    #[serde(rename = "evpSlid", default)]
    slid: Option<Value>,
    #[serde(rename = "evpAccount", default)]
    account: Option<Value>,
}

/// Extracts account identifiers from the metadata body.
///
/// The body is JSON, sometimes wrapped in other text, so the outermost
/// object is cut out before decoding. Identifiers may arrive as strings or
/// numbers; string values are kept verbatim.
fn parse_account_info(body: &str) -> Result<AccountIds, AuthError> {
    let object = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => {
            return Err(AuthError::AccountInfoMissing(
                "account metadata is not JSON".to_string(),
            ));
        }
    };

    let response: AccountInfoResponse = serde_json::from_str(object)
        .map_err(|e| AuthError::AccountInfoMissing(format!("account metadata: {e}")))?;

    let subscriber_id = identifier(response.slid)
        .ok_or_else(|| AuthError::AccountInfoMissing("evpSlid".to_string()))?;
    let account_number = identifier(response.account)
        .ok_or_else(|| AuthError::AccountInfoMissing("evpAccount".to_string()))?;

    Ok(AccountIds {
        subscriber_id,
        account_number,
    })
}

fn identifier(value: Option<Value>) -> Option<String> {
    let id = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}
