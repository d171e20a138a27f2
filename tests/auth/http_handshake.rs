use httpmock::Method::GET;
use url::Url;
use yfinance_session::{Authenticator, HttpAuthenticator, YfClient, YfError};

use crate::common;

fn handshake(server: &httpmock::MockServer) -> HttpAuthenticator {
    HttpAuthenticator::new(
        reqwest::Client::new(),
        Url::parse(&server.url("/consent")).unwrap(),
        Url::parse(&server.url("/v1/test/getcrumb")).unwrap(),
    )
}

#[tokio::test]
async fn cookie_then_crumb_yields_credentials() {
    let server = common::setup_server();
    let consent = server.mock(|when, then| {
        when.method(GET).path("/consent");
        then.status(200)
            .header("set-cookie", "A3=d=AQABBA; Domain=.yahoo.com; Path=/; Max-Age=31557600")
            .body("ok");
    });
    let crumb = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/test/getcrumb")
            .header("cookie", "A3=d=AQABBA");
        then.status(200).body("AbC.dEf\n");
    });

    let creds = handshake(&server).authenticate(true).await.unwrap();
    consent.assert();
    crumb.assert();

    assert_eq!(creds.crumb, "AbC.dEf");
    assert_eq!(creds.cookies.len(), 1);
    let c = &creds.cookies[0];
    assert_eq!((c.name.as_str(), c.value.as_str()), ("A3", "d=AQABBA"));
    assert_eq!(c.path, "/");
    assert!(c.expires_at.is_some());
}

#[tokio::test]
async fn missing_cookie_stops_before_the_crumb_request() {
    let server = common::setup_server();
    let _consent = server.mock(|when, then| {
        when.method(GET).path("/consent");
        then.status(200).body("no cookies here");
    });
    let crumb = server.mock(|when, then| {
        when.method(GET).path("/v1/test/getcrumb");
        then.status(200).body("AbC.dEf");
    });

    let err = handshake(&server).authenticate(true).await.unwrap_err();
    assert!(
        matches!(err, YfError::Auth(ref m) if m.starts_with("No cookie received")),
        "got {err:?}"
    );
    assert_eq!(crumb.hits(), 0);
}

#[tokio::test]
async fn json_crumb_body_is_rejected() {
    let server = common::setup_server();
    let _consent = server.mock(|when, then| {
        when.method(GET).path("/consent");
        then.status(200).header("set-cookie", "A3=d=AQABBA; Path=/");
    });
    let _crumb = server.mock(|when, then| {
        when.method(GET).path("/v1/test/getcrumb");
        then.status(200).body("{}");
    });

    let err = handshake(&server).authenticate(false).await.unwrap_err();
    assert!(
        matches!(err, YfError::Auth(ref m) if m.starts_with("Received invalid crumb")),
        "got {err:?}"
    );
}

#[tokio::test]
async fn crumb_endpoint_rejection_is_an_auth_error() {
    let server = common::setup_server();
    let _consent = server.mock(|when, then| {
        when.method(GET).path("/consent");
        then.status(200).header("set-cookie", "A3=d=AQABBA; Path=/");
    });
    let _crumb = server.mock(|when, then| {
        when.method(GET).path("/v1/test/getcrumb");
        then.status(429).body("Too Many Requests");
    });

    let err = handshake(&server).authenticate(true).await.unwrap_err();
    assert!(matches!(err, YfError::Auth(ref m) if m.contains("429")), "got {err:?}");
}

#[tokio::test]
async fn default_client_authenticates_over_http_and_fetches() {
    let server = common::setup_server();
    let consent = server.mock(|when, then| {
        when.method(GET).path("/consent");
        then.status(200)
            .header("set-cookie", "A3=d=AQABBA; Path=/; Max-Age=3600");
    });
    let crumb = server.mock(|when, then| {
        when.method(GET).path("/v1/test/getcrumb");
        then.status(200).body("crumb-value");
    });
    let chart = server.mock(|when, then| {
        when.method(GET)
            .path("/v8/finance/chart/AAPL")
            .query_param("crumb", "crumb-value")
            .header("cookie", "A3=d=AQABBA");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::fixture("history_chart", "AAPL", "json"));
    });

    let client = YfClient::builder()
        .base_chart(common::chart_base(&server))
        .cookie_url(Url::parse(&server.url("/consent")).unwrap())
        .crumb_url(Url::parse(&server.url("/v1/test/getcrumb")).unwrap())
        .use_cache(false)
        .build()
        .unwrap();

    let bars = yfinance_session::HistoryBuilder::new(&client, "AAPL")
        .fetch()
        .await
        .unwrap();
    consent.assert();
    crumb.assert();
    chart.assert();
    assert_eq!(bars.len(), 5);
}
