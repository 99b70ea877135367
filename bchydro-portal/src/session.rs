//! Credentials and the authenticated session.

use std::fmt;

use bchydro_fetch::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Credentials
// ============================================================================

/// Portal login credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from a username (email) and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The login email.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Returns true if either part is blank.
    pub fn is_incomplete(&self) -> bool {
        self.username.trim().is_empty() || self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

// ============================================================================
// Account
// ============================================================================

/// Identifiers the usage endpoint is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIds {
    /// Service location id (`evpSlid`). Doubles as the device identity.
    pub subscriber_id: String,
    /// Account number (`evpAccount`), leading zeros kept.
    pub account_number: String,
}

// ============================================================================
// Session State
// ============================================================================

/// Everything a usage fetch needs, produced only by a completed login.
///
/// There is no partially built session: either all of the cookies, the
/// token and the account ids are present, or no `SessionState` exists.
#[derive(Debug, Clone)]
pub struct SessionState {
    cookies: CookieJar,
    token: String,
    account: AccountIds,
    authenticated_at: DateTime<Utc>,
}

impl SessionState {
    /// Assembles a session from the results of a login.
    pub fn new(cookies: CookieJar, token: impl Into<String>, account: AccountIds) -> Self {
        Self {
            cookies,
            token: token.into(),
            account,
            authenticated_at: Utc::now(),
        }
    }

    /// Cookies to send with portal requests.
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// The `bchydroparam` token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Account identifiers.
    pub fn account(&self) -> &AccountIds {
        &self.account
    }

    /// Shortcut for the service location id.
    pub fn subscriber_id(&self) -> &str {
        &self.account.subscriber_id
    }

    /// When the login completed.
    pub fn authenticated_at(&self) -> DateTime<Utc> {
        self.authenticated_at
    }
}
