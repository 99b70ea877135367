//! Login sequence against a mock portal.

mod common;

use bchydro_portal::{AuthError, LoginSequencer};
use common::*;
use mockito::{Matcher, Server};

#[tokio::test]
async fn test_login_collects_cookies_token_and_account() {
    let mut server = Server::new_async().await;
    let mocks = mock_login(&mut server, 1).await;

    let settings = settings(&server);
    let http = settings.build_client().unwrap();
    let session = LoginSequencer::new(&http, &settings)
        .authenticate(&credentials())
        .await
        .unwrap();

    assert_eq!(session.token(), "TOKEN123");
    assert_eq!(session.subscriber_id(), "S1");
    assert_eq!(session.account().account_number, "0001234");
    assert_eq!(session.cookies().len(), 2);
    mocks.assert().await;
}

#[tokio::test]
async fn test_login_form_fields() {
    let mut server = Server::new_async().await;
    let submit = server
        .mock("POST", LOGIN_PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("realm".into(), "bch-ps".into()),
            Matcher::UrlEncoded("email".into(), "user@example.com".into()),
            Matcher::UrlEncoded("password".into(), "pw".into()),
            Matcher::UrlEncoded(
                "gotoUrl".into(),
                "https://app.bchydro.com:443/BCHCustomerPortal/web/login.html".into(),
            ),
        ]))
        .with_status(200)
        .with_body(LANDING_HTML)
        .create_async()
        .await;
    let _account = server
        .mock("GET", ACCOUNT_PATH)
        .with_status(200)
        .with_body(ACCOUNT_JSON)
        .create_async()
        .await;

    let settings = settings(&server);
    let http = settings.build_client().unwrap();
    let session = LoginSequencer::new(&http, &settings)
        .authenticate(&credentials())
        .await
        .unwrap();

    // A login that lands without redirecting is fine too
    assert_eq!(session.token(), "TOKEN123");
    submit.assert_async().await;
}

#[tokio::test]
async fn test_redirect_loop_is_bounded() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", LOGIN_PATH)
        .with_status(302)
        .with_header("location", "/loop")
        .create_async()
        .await;
    let hop = server
        .mock("GET", "/loop")
        .with_status(302)
        .with_header("location", "/loop")
        .expect(10)
        .create_async()
        .await;
    let account = server
        .mock("GET", ACCOUNT_PATH)
        .expect(0)
        .create_async()
        .await;

    let settings = settings(&server);
    let http = settings.build_client().unwrap();
    let err = LoginSequencer::new(&http, &settings)
        .authenticate(&credentials())
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::TooManyRedirects { limit: 10 });
    hop.assert_async().await;
    account.assert_async().await;
}

#[tokio::test]
async fn test_custom_redirect_limit() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", LOGIN_PATH)
        .with_status(303)
        .with_header("location", "/loop")
        .create_async()
        .await;
    let hop = server
        .mock("GET", "/loop")
        .with_status(307)
        .with_header("location", "/loop")
        .expect(3)
        .create_async()
        .await;

    let settings = settings(&server).with_max_redirects(3);
    let http = settings.build_client().unwrap();
    let err = LoginSequencer::new(&http, &settings)
        .authenticate(&credentials())
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::TooManyRedirects { limit: 3 });
    hop.assert_async().await;
}

#[tokio::test]
async fn test_missing_token_stops_before_account_lookup() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", LOGIN_PATH)
        .with_status(200)
        .with_body("<html><form>Invalid email or password</form></html>")
        .create_async()
        .await;
    let account = server
        .mock("GET", ACCOUNT_PATH)
        .expect(0)
        .create_async()
        .await;

    let settings = settings(&server);
    let http = settings.build_client().unwrap();
    let err = LoginSequencer::new(&http, &settings)
        .authenticate(&credentials())
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::TokenNotFound);
    account.assert_async().await;
}

#[tokio::test]
async fn test_unexpected_status() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", LOGIN_PATH)
        .with_status(500)
        .create_async()
        .await;

    let settings = settings(&server);
    let http = settings.build_client().unwrap();
    let err = LoginSequencer::new(&http, &settings)
        .authenticate(&credentials())
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::UnexpectedStatus(500));
}

#[tokio::test]
async fn test_account_ids_missing() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", LOGIN_PATH)
        .with_status(200)
        .with_body(LANDING_HTML)
        .create_async()
        .await;
    let _account = server
        .mock("GET", ACCOUNT_PATH)
        .with_status(200)
        .with_body(r#"{"evpAccount":"456"}"#)
        .create_async()
        .await;

    let settings = settings(&server);
    let http = settings.build_client().unwrap();
    let err = LoginSequencer::new(&http, &settings)
        .authenticate(&credentials())
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::AccountInfoMissing("evpSlid".into()));
}

#[tokio::test]
async fn test_redirect_off_portal_rejected() {
    let mut server = Server::new_async().await;
    let _submit = server
        .mock("POST", LOGIN_PATH)
        .with_status(302)
        .with_header("location", "https://phish.example.net/login")
        .create_async()
        .await;

    let settings = settings(&server);
    let http = settings.build_client().unwrap();
    let err = LoginSequencer::new(&http, &settings)
        .authenticate(&credentials())
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidRedirect(_)));
    assert!(!err.is_transient());
}
