//! Mock portal shared by the integration tests.

#![allow(dead_code)]

use std::time::Duration;

use bchydro_portal::{Credentials, PortalSettings};
use mockito::{Mock, ServerGuard};

pub const LOGIN_PATH: &str = "/sso/UI/Login";
pub const LANDING_PATH: &str = "/BCHCustomerPortal/web/login.html";
pub const ACCOUNT_PATH: &str = "/evportlet/web/global-data.html";
pub const USAGE_PATH: &str = "/evportlet/web/consumption-data.html";

pub const LANDING_HTML: &str =
    r#"<html><body><div id="bchydroparam">TOKEN123</div></body></html>"#;

pub const ACCOUNT_JSON: &str = r#"{"evpSlid":"S1","evpAccount":"0001234"}"#;

pub const USAGE_XML: &str = concat!(
    r#"<Series><Point quality="ACTUAL" value="12.3" cost="4.56"/></Series>"#,
    r#"<Rates bpStart="2024-01-01" bpEnd="2024-01-31" cons2date="100kWh" cost2date="45$" estCons="300kWh" estCost="90$"/>"#,
);

pub fn settings(server: &ServerGuard) -> PortalSettings {
    PortalSettings::new(&server.url())
        .unwrap()
        .with_timeout(Duration::from_secs(5))
}

pub fn credentials() -> Credentials {
    Credentials::new("user@example.com", "pw")
}

/// Mocks of one complete login.
pub struct LoginMocks {
    pub submit: Mock,
    pub landing: Mock,
    pub account: Mock,
}

impl LoginMocks {
    pub async fn assert(&self) {
        self.submit.assert_async().await;
        self.landing.assert_async().await;
        self.account.assert_async().await;
    }
}

/// Mounts a login that redirects once, sets a cookie on each hop and
/// answers with the standard token and account ids.
pub async fn mock_login(server: &mut ServerGuard, times: usize) -> LoginMocks {
    let submit = server
        .mock("POST", LOGIN_PATH)
        .with_status(302)
        .with_header("location", LANDING_PATH)
        .with_header("set-cookie", "sso=1; Path=/")
        .expect(times)
        .create_async()
        .await;

    let landing = server
        .mock("GET", LANDING_PATH)
        .match_header("cookie", "sso=1")
        .with_status(200)
        .with_header("set-cookie", "lb=2; Path=/")
        .with_body(LANDING_HTML)
        .expect(times)
        .create_async()
        .await;

    let account = server
        .mock("GET", ACCOUNT_PATH)
        .match_header("cookie", "sso=1; lb=2")
        .with_status(200)
        .with_body(ACCOUNT_JSON)
        .expect(times)
        .create_async()
        .await;

    LoginMocks {
        submit,
        landing,
        account,
    }
}

/// Mounts one usage response.
pub async fn mock_usage(server: &mut ServerGuard, status: usize, body: &str) -> Mock {
    server
        .mock("POST", USAGE_PATH)
        .match_header("bchydroparam", "TOKEN123")
        .with_status(status)
        .with_body(body)
        .expect(1)
        .create_async()
        .await
}
