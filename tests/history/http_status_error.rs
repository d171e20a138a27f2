use httpmock::Method::GET;

use crate::common::{self, StubAuthenticator};

#[tokio::test]
async fn history_returns_status_error_on_non_2xx_without_retrying() {
    let server = common::setup_server();

    let mock = server.mock(|when, then| {
        when.method(GET).path("/v8/finance/chart/FAIL");
        then.status(500).body("oops");
    });

    let auth = StubAuthenticator::ok("crumb-value");
    let client = yfinance_session::YfClient::builder()
        .base_chart(common::chart_base(&server))
        .authenticator(auth.clone())
        .build()
        .unwrap();

    let err = yfinance_session::HistoryBuilder::new(&client, "FAIL")
        .fetch()
        .await
        .unwrap_err();
    mock.assert_hits(1);
    assert_eq!(auth.calls(), 1);

    match err {
        yfinance_session::YfError::Status { status, url } => {
            assert_eq!(status, 500);
            assert!(url.contains("/v8/finance/chart/FAIL"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}
