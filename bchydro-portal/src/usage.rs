//! Usage request.

use bchydro_core::Interval;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, instrument, warn};

use bchydro_fetch::HttpClient;

use crate::error::FetchError;
use crate::session::SessionState;
use crate::settings::PortalSettings;

/// Header that carries the session token.
pub const TOKEN_HEADER: &str = "bchydroparam";

/// Raw usage payload and the range it was requested for.
#[derive(Debug, Clone)]
pub struct RawUsage {
    /// Response body as received.
    pub body: Vec<u8>,
    /// Requested range.
    pub interval: Interval,
}

/// Requests usage for the current billing period.
#[derive(Debug)]
pub struct UsageFetcher<'a> {
    http: &'a HttpClient,
    settings: &'a PortalSettings,
}

impl<'a> UsageFetcher<'a> {
    /// Creates a fetcher over a shared client.
    pub fn new(http: &'a HttpClient, settings: &'a PortalSettings) -> Self {
        Self { http, settings }
    }

    /// Fetches the usage XML for `day` using an established session.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ReauthRequired`] on 401 or 403, and other
    /// [`FetchError`] variants for network trouble or unexpected statuses.
    #[instrument(skip(self, session), fields(subscriber_id = %session.subscriber_id()))]
    pub async fn fetch_raw(&self, session: &SessionState, day: NaiveDate) -> Result<RawUsage, FetchError> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(session.token()).map_err(|_| {
            warn!("Session token is not a valid header value");
            FetchError::ReauthRequired
        })?;
        headers.insert(HeaderName::from_static(TOKEN_HEADER), token);

        let form = usage_form(session, day);
        let page = self
            .http
            .post_form(&self.settings.usage_url, &form, headers, session.cookies())
            .await?;

        match page.status.as_u16() {
            200 => {
                debug!(bytes = page.body.len(), "Usage payload received");
                Ok(RawUsage {
                    body: page.body,
                    interval: Interval::day(day),
                })
            }
            401 | 403 => {
                warn!(status = page.status.as_u16(), "Usage request rejected");
                Err(FetchError::ReauthRequired)
            }
            status => Err(FetchError::UnexpectedStatus(status)),
        }
    }
}

/// Timestamp format the usage endpoint expects for range bounds.
pub fn format_range_bound(day: NaiveDate) -> String {
    day.format("%Y-%m-%dT00:00:00-00:00:00").to_string()
}

/// Form fields of a daily current-bill usage request.
pub fn usage_form(session: &SessionState, day: NaiveDate) -> Vec<(&'static str, String)> {
    let bound = format_range_bound(day);
    let account = session.account();
    vec![
        ("Slid", account.subscriber_id.clone()),
        ("Account", account.account_number.clone()),
        ("ChartType", "column".to_string()),
        ("Granularity", "daily".to_string()),
        ("Overlays", "none".to_string()),
        ("StartDateTime", bound.clone()),
        ("EndDateTime", bound),
        ("DateRange", "currentBill".to_string()),
        ("RateGroup", "RES1".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AccountIds;
    use bchydro_fetch::CookieJar;

    #[test]
    fn test_range_bound_format() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_range_bound(day), "2024-03-07T00:00:00-00:00:00");
    }

    #[test]
    fn test_usage_form_fields() {
        let session = SessionState::new(
            CookieJar::new(),
            "T",
            AccountIds {
                subscriber_id: "123".into(),
                account_number: "000456".into(),
            },
        );
        let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let form = usage_form(&session, day);

        let get = |k: &str| form.iter().find(|(key, _)| *key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("Slid"), Some("123"));
        assert_eq!(get("Account"), Some("000456"));
        assert_eq!(get("Granularity"), Some("daily"));
        assert_eq!(get("DateRange"), Some("currentBill"));
        assert_eq!(get("RateGroup"), Some("RES1"));
        assert_eq!(get("StartDateTime"), get("EndDateTime"));
        assert_eq!(form.len(), 9);
    }
}
