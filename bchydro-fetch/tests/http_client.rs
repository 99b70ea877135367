//! HTTP client behavior against a local mock server.

use std::time::Duration;

use bchydro_fetch::{CookieJar, HttpClient, HttpError};
use mockito::{Matcher, Server};
use reqwest::header::HeaderMap;
use url::Url;

fn client() -> HttpClient {
    HttpClient::new("test-agent/1.0", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let mut server = Server::new_async().await;
    let target = server
        .mock("GET", "/next")
        .expect(0)
        .create_async()
        .await;
    let hop = server
        .mock("GET", "/start")
        .with_status(302)
        .with_header("location", "/next")
        .with_header("set-cookie", "hop=1; Path=/")
        .create_async()
        .await;

    let url = Url::parse(&format!("{}/start", server.url())).unwrap();
    let page = client().get(&url, &CookieJar::new()).await.unwrap();

    assert!(page.is_redirect());
    assert_eq!(page.location().unwrap().path(), "/next");
    hop.assert_async().await;
    target.assert_async().await;
}

#[tokio::test]
async fn test_cookies_and_user_agent_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/data")
        .match_header("user-agent", "test-agent/1.0")
        .match_header("cookie", "a=1; b=2")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let url = Url::parse(&format!("{}/data", server.url())).unwrap();
    let mut jar = CookieJar::new();
    jar.store(&url, "a=1; Path=/");
    jar.store(&url, "b=2; Path=/");

    let page = client().get(&url, &jar).await.unwrap();
    assert_eq!(page.status.as_u16(), 200);
    assert_eq!(page.text_lossy(), "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_response_cookies_merged_by_caller() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/login")
        .with_status(200)
        .with_header("set-cookie", "session=xyz; Path=/")
        .with_header("set-cookie", "lb=7; Path=/")
        .create_async()
        .await;

    let url = Url::parse(&format!("{}/login", server.url())).unwrap();
    let mut jar = CookieJar::new();
    let page = client().get(&url, &jar).await.unwrap();

    // The client never touches the jar on its own
    assert!(jar.is_empty());
    assert_eq!(jar.store_response(&page.url, &page.headers), 2);
    assert_eq!(jar.header_for(&url), Some("session=xyz; lb=7".to_string()));
}

#[tokio::test]
async fn test_post_form_with_headers() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/submit")
        .match_header("x-token", "abc")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("email".into(), "user@example.com".into()),
            Matcher::UrlEncoded("realm".into(), "bch-ps".into()),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let url = Url::parse(&format!("{}/submit", server.url())).unwrap();
    let mut headers = HeaderMap::new();
    headers.insert("x-token", "abc".parse().unwrap());
    let form = [("email", "user@example.com"), ("realm", "bch-ps")];

    let page = client()
        .post_form(&url, &form, headers, &CookieJar::new())
        .await
        .unwrap();
    assert_eq!(page.status.as_u16(), 200);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_disallowed_domain_never_requested() {
    let client = client().with_allowed_domains(vec!["bchydro.com".to_string()]);
    let url = Url::parse("http://127.0.0.1:9/anything").unwrap();

    let result = client.get(&url, &CookieJar::new()).await;
    assert!(matches!(result, Err(HttpError::DomainNotAllowed(_))));
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    // Port 9 (discard) is not listening on loopback in test environments
    let url = Url::parse("http://127.0.0.1:9/").unwrap();
    let err = client().get(&url, &CookieJar::new()).await.unwrap_err();
    assert!(err.is_transient());
}
