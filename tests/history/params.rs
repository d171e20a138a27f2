use chrono::{NaiveDate, TimeZone, Utc};
use yfinance_session::{
    Backoff, FetchRequest, HistoryBuilder, Interval, RetryConfig, YfClient, YfError,
};

#[test]
fn every_interval_token_round_trips() {
    let tokens = [
        "1m", "2m", "5m", "15m", "30m", "60m", "1h", "90m", "1d", "5d", "1wk", "1mo", "3mo",
    ];
    assert_eq!(tokens.len(), Interval::ALL.len());
    for t in tokens {
        let i: Interval = t.parse().unwrap();
        assert_eq!(i.to_string(), t);
    }
}

#[test]
fn unknown_interval_is_rejected() {
    match "4h".parse::<Interval>().unwrap_err() {
        YfError::InvalidInterval(s) => assert_eq!(s, "4h"),
        other => panic!("expected InvalidInterval, got {other:?}"),
    }
}

#[test]
fn request_needs_start_before_end() {
    let d = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();
    assert!(matches!(
        FetchRequest::for_dates("AAPL", d, d, Interval::D1, 3),
        Err(YfError::InvalidDates)
    ));
    assert!(matches!(
        FetchRequest::for_dates("AAPL", d.succ_opt().unwrap(), d, Interval::D1, 3),
        Err(YfError::InvalidDates)
    ));
    assert!(matches!(
        FetchRequest::for_dates(" ", d, d.succ_opt().unwrap(), Interval::D1, 3),
        Err(YfError::Data(_))
    ));
}

#[test]
fn request_bounds_are_unix_seconds_at_midnight_utc() {
    let req = FetchRequest::for_dates(
        "AAPL",
        NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 30).unwrap(),
        Interval::D1,
        3,
    )
    .unwrap();
    assert_eq!(req.period(), (1_734_652_800, 1_735_516_800));
    assert_eq!(req.symbol(), "AAPL");
    assert_eq!(req.max_retries(), 3);
}

#[test]
fn builder_takes_retry_budget_from_client_unless_overridden() {
    let client = YfClient::builder()
        .retry_config(RetryConfig {
            max_retries: 5,
            backoff: Backoff::Fixed(std::time::Duration::from_millis(1)),
        })
        .build()
        .unwrap();
    let start = Utc.with_ymd_and_hms(2024, 12, 20, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap();

    let b = HistoryBuilder::new(&client, "MSFT").between(start, end);
    assert_eq!(b.request().unwrap().max_retries(), 5);
    assert_eq!(b.clone().max_retries(1).request().unwrap().max_retries(), 1);

    let reversed = HistoryBuilder::new(&client, "MSFT").between(end, start);
    assert!(matches!(reversed.request(), Err(YfError::InvalidDates)));
}
