//! Explicit cookie store.
//!
//! The portal login hands out its session cookies across several redirect
//! hops. reqwest's built-in store is opaque, so the jar is kept here where
//! the login flow can merge each hop into it, snapshot it and throw it away
//! as a unit.

use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, SET_COOKIE};
use tracing::{debug, warn};
use url::Url;

// ============================================================================
// Stored Cookie
// ============================================================================

/// A cookie held by the jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain the cookie belongs to.
    pub domain: String,
    /// Whether the cookie is only sent to `domain` itself.
    pub host_only: bool,
    /// Path the cookie is valid for.
    pub path: String,
    /// Expiration time.
    pub expires: Option<DateTime<Utc>>,
    /// Whether the cookie requires HTTPS.
    pub secure: bool,
}

impl StoredCookie {
    /// Returns true if the cookie is expired.
    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|exp| exp <= Utc::now())
    }

    /// Returns true if this cookie is sent to the given host.
    pub fn matches_domain(&self, host: &str) -> bool {
        if self.host_only {
            return host.eq_ignore_ascii_case(&self.domain);
        }
        host.eq_ignore_ascii_case(&self.domain)
            || host
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", self.domain.to_ascii_lowercase()))
    }

    /// Returns true if this cookie is sent for the given request path.
    pub fn matches_path(&self, path: &str) -> bool {
        if path == self.path {
            return true;
        }
        path.starts_with(&self.path)
            && (self.path.ends_with('/') || path[self.path.len()..].starts_with('/'))
    }

    /// Returns true if this cookie should be sent with a request to `url`.
    pub fn matches(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        !self.is_expired()
            && (!self.secure || url.scheme() == "https")
            && self.matches_domain(host)
            && self.matches_path(url.path())
    }

    fn same_slot(&self, other: &StoredCookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}

/// Directory part of a request path, used when `Set-Cookie` has no `Path`.
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

// ============================================================================
// Cookie Jar
// ============================================================================

/// Ordered set of cookies keyed by name, domain and path.
///
/// Insertion order is kept so the `Cookie` header is stable across runs.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<StoredCookie>,
}

impl CookieJar {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cookies held, expired ones included.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns true if the jar holds no cookies.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Looks up a live cookie by name.
    pub fn get(&self, name: &str) -> Option<&StoredCookie> {
        self.cookies.iter().find(|c| c.name == name && !c.is_expired())
    }

    /// Merges one `Set-Cookie` header value received from `url`.
    ///
    /// Returns false if the header could not be parsed or was rejected.
    pub fn store(&mut self, url: &Url, set_cookie: &str) -> bool {
        let parsed = match cookie::Cookie::parse(set_cookie.to_string()) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Ignoring unparsable Set-Cookie header");
                return false;
            }
        };

        let Some(host) = url.host_str() else {
            return false;
        };

        let (domain, host_only) = match parsed.domain().map(|d| d.trim_start_matches('.')) {
            Some(d) if !d.is_empty() => (d.to_ascii_lowercase(), false),
            _ => (host.to_ascii_lowercase(), true),
        };

        // A host may only set cookies for itself or a parent domain
        let candidate_host = host.to_ascii_lowercase();
        if !host_only && candidate_host != domain && !candidate_host.ends_with(&format!(".{domain}")) {
            warn!(cookie = parsed.name(), domain = %domain, host = %host, "Rejecting foreign-domain cookie");
            return false;
        }

        let now = Utc::now();
        let expires = match parsed.max_age() {
            Some(max_age) => Some(expiry_after(now, max_age.whole_seconds())),
            None => parsed
                .expires_datetime()
                .and_then(|t| DateTime::from_timestamp(t.unix_timestamp(), 0)),
        };

        let stored = StoredCookie {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain,
            host_only,
            path: parsed
                .path()
                .filter(|p| p.starts_with('/'))
                .map_or_else(|| default_path(url), str::to_string),
            expires,
            secure: parsed.secure().unwrap_or(false),
        };

        if let Some(existing) = self.cookies.iter_mut().find(|c| c.same_slot(&stored)) {
            *existing = stored;
        } else {
            self.cookies.push(stored);
        }

        // Servers delete cookies by sending them already expired
        self.cookies.retain(|c| !c.is_expired());
        true
    }

    /// Merges every `Set-Cookie` header of a response received from `url`.
    ///
    /// Returns how many cookies were stored.
    pub fn store_response(&mut self, url: &Url, headers: &HeaderMap) -> usize {
        let stored = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter(|v| self.store(url, v))
            .count();
        if stored > 0 {
            debug!(stored, total = self.len(), "Merged response cookies");
        }
        stored
    }

    /// Builds the `Cookie` header for a request to `url`.
    ///
    /// Returns `None` when no cookie applies.
    pub fn header_for(&self, url: &Url) -> Option<String> {
        let header = self
            .cookies
            .iter()
            .filter(|c| c.matches(url))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        (!header.is_empty()).then_some(header)
    }
}

/// Expiry `seconds` after `now`, clamped to the representable range.
fn expiry_after(now: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    Duration::try_seconds(seconds)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(if seconds < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_host_only_cookie() {
        let mut jar = CookieJar::new();
        assert!(jar.store(&url("https://app.bchydro.com/sso/UI/Login"), "iPlanetDirectoryPro=abc; Path=/"));

        assert_eq!(
            jar.header_for(&url("https://app.bchydro.com/evportlet/web/global-data.html")),
            Some("iPlanetDirectoryPro=abc".to_string())
        );
        assert_eq!(jar.header_for(&url("https://www.bchydro.com/")), None);
    }

    #[test]
    fn test_domain_cookie_reaches_subdomains() {
        let mut jar = CookieJar::new();
        jar.store(&url("https://app.bchydro.com/"), "amlbcookie=01; Domain=.bchydro.com; Path=/");

        assert!(jar.header_for(&url("https://www.bchydro.com/x")).is_some());
        assert!(jar.header_for(&url("https://evilbchydro.com/")).is_none());
    }

    #[test]
    fn test_foreign_domain_rejected() {
        let mut jar = CookieJar::new();
        assert!(!jar.store(&url("https://app.bchydro.com/"), "a=b; Domain=example.com"));
        assert!(jar.is_empty());
    }

    #[test]
    fn test_replace_keeps_order() {
        let mut jar = CookieJar::new();
        let u = url("https://app.bchydro.com/");
        jar.store(&u, "first=1; Path=/");
        jar.store(&u, "second=2; Path=/");
        jar.store(&u, "first=updated; Path=/");

        assert_eq!(jar.len(), 2);
        assert_eq!(jar.header_for(&u), Some("first=updated; second=2".to_string()));
    }

    #[test]
    fn test_expired_cookie_removed() {
        let mut jar = CookieJar::new();
        let u = url("https://app.bchydro.com/");
        jar.store(&u, "session=abc; Path=/");
        jar.store(&u, "session=; Path=/; Max-Age=0");

        assert!(jar.is_empty());
        assert_eq!(jar.header_for(&u), None);
    }

    #[test]
    fn test_path_matching() {
        let mut jar = CookieJar::new();
        jar.store(&url("https://app.bchydro.com/"), "scoped=1; Path=/evportlet");

        assert!(jar.header_for(&url("https://app.bchydro.com/evportlet/web/x.html")).is_some());
        assert!(jar.header_for(&url("https://app.bchydro.com/evportlet")).is_some());
        assert!(jar.header_for(&url("https://app.bchydro.com/evportletfoo")).is_none());
        assert!(jar.header_for(&url("https://app.bchydro.com/sso")).is_none());
    }

    #[test]
    fn test_default_path_from_request() {
        let mut jar = CookieJar::new();
        jar.store(&url("https://app.bchydro.com/sso/UI/Login"), "sso=1");

        let cookie = jar.get("sso").unwrap();
        assert_eq!(cookie.path, "/sso/UI");
    }

    #[test]
    fn test_secure_cookie_not_sent_over_http() {
        let mut jar = CookieJar::new();
        jar.store(&url("https://app.bchydro.com/"), "s=1; Path=/; Secure");

        assert!(jar.header_for(&url("https://app.bchydro.com/")).is_some());
        assert!(jar.header_for(&url("http://app.bchydro.com/")).is_none());
    }

    #[test]
    fn test_huge_max_age_clamped() {
        let mut jar = CookieJar::new();
        let u = url("https://app.bchydro.com/");
        assert!(jar.store(&u, "forever=1; Path=/; Max-Age=99999999999999999999"));
        assert!(jar.store(&u, "gone=1; Path=/; Max-Age=-99999999999999999999"));

        let cookie = jar.get("forever").unwrap();
        assert!(cookie.expires.unwrap() > Utc::now() + Duration::days(365 * 1000));
        assert!(jar.get("gone").is_none());
        assert_eq!(jar.header_for(&u), Some("forever=1".to_string()));
    }

    #[test]
    fn test_expiry_after_bounds() {
        let now = Utc::now();
        assert_eq!(expiry_after(now, 60), now + Duration::seconds(60));
        assert_eq!(expiry_after(now, i64::MAX), DateTime::<Utc>::MAX_UTC);
        assert_eq!(expiry_after(now, i64::MIN), DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_garbage_header_ignored() {
        let mut jar = CookieJar::new();
        assert!(!jar.store(&url("https://app.bchydro.com/"), "no-equals-sign"));
        assert!(jar.is_empty());
    }
}
