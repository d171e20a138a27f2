use chrono::NaiveDate;
use rust_decimal::Decimal;
use yfinance_session::YfError;
use yfinance_session::history::decode_chart;

use crate::common;

fn dec(units: i64, scale: u32) -> Option<Decimal> {
    Some(Decimal::new(units, scale))
}

#[test]
fn null_close_leaves_the_rest_of_the_row_and_other_rows_intact() {
    let body = r#"{
      "chart":{"result":[{"timestamp":[1704067200,1704153600,1704240000,1704326400],
        "indicators":{
          "quote":[{
            "open":[100.0,101.0,102.0,103.0],
            "high":[101.0,102.0,103.0,104.0],
            "low":[99.0,100.0,101.0,102.0],
            "close":[100.5,101.5,null,103.5],
            "volume":[1000,1100,1200,null]
          }],
          "adjclose":[{"adjclose":[100.25,101.25,null,103.25]}]
        }}],"error":null}
    }"#;

    let bars = decode_chart(body, "AAPL").unwrap();
    assert_eq!(bars.len(), 4, "null fields must not drop rows");

    assert_eq!(bars[2].close, None);
    assert_eq!(bars[2].adj_close, None);
    assert_eq!(bars[2].volume, Some(1200));
    assert_eq!(bars[2].open, dec(102, 0));

    assert_eq!(bars[1].close, dec(1015, 1));
    assert_eq!(bars[3].close, dec(1035, 1));
    assert_eq!(bars[3].volume, None);
    assert_eq!(bars[0].adj_close, dec(10025, 2));
}

#[test]
fn dates_come_back_strictly_increasing() {
    // out of order, with 1704153600 repeated; the later row wins
    let body = r#"{
      "chart":{"result":[{"timestamp":[1704153600,1704067200,1704153600],
        "indicators":{"quote":[{
          "open":[2.0,1.0,3.0],"high":[2.0,1.0,3.0],"low":[2.0,1.0,3.0],
          "close":[2.0,1.0,3.0],"volume":[2,1,3]
        }]}}],"error":null}
    }"#;

    let bars = decode_chart(body, "X").unwrap();
    assert_eq!(bars.len(), 2);
    assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(bars[0].close, dec(1, 0));
    assert_eq!(bars[1].close, dec(3, 0));
}

#[test]
fn fixture_decodes_to_naive_timestamps() {
    let bars = decode_chart(&common::fixture("history_chart", "AAPL", "json"), "AAPL").unwrap();
    assert_eq!(bars.len(), 5);
    assert_eq!(
        bars[0].date,
        NaiveDate::from_ymd_opt(2024, 12, 20)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    );
    assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    assert!(bars.iter().all(|b| b.open.is_some()
        && b.high.is_some()
        && b.low.is_some()
        && b.close.is_some()
        && b.adj_close.is_some()
        && b.volume.is_some()));
}

#[test]
fn error_payload_is_a_provider_error() {
    let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
    match decode_chart(body, "NOPE").unwrap_err() {
        YfError::DataProvider(msg) => {
            assert!(msg.contains("symbol may be delisted"), "unexpected: {msg}")
        }
        other => panic!("expected DataProvider, got {other:?}"),
    }
}

#[test]
fn empty_results_are_no_data() {
    for body in [
        r#"{"chart":{"result":[],"error":null}}"#,
        r#"{"chart":{"result":null,"error":null}}"#,
        r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#,
    ] {
        match decode_chart(body, "EMPTY").unwrap_err() {
            YfError::NoData { symbol } => assert_eq!(symbol, "EMPTY"),
            other => panic!("expected NoData for {body}, got {other:?}"),
        }
    }
}

#[test]
fn garbage_body_is_a_data_error() {
    assert!(matches!(
        decode_chart("<html>oops</html>", "X").unwrap_err(),
        YfError::Data(_)
    ));
    assert!(matches!(
        decode_chart(r#"{"finance":{}}"#, "X").unwrap_err(),
        YfError::Data(_)
    ));
}

#[test]
fn intraday_payload_without_adjclose_decodes() {
    let body = r#"{
      "chart":{"result":[{"timestamp":[1704205800,1704206700],
        "indicators":{"quote":[{
          "open":[185.25,185.5],"high":[186.0,185.75],"low":[185.0,185.25],
          "close":[185.5,185.75],"volume":[5000,null]
        }]}}],"error":null}
    }"#;
    let bars = decode_chart(body, "AAPL").unwrap();
    assert_eq!(bars.len(), 2);
    assert!(bars.iter().all(|b| b.adj_close.is_none()));
    assert_eq!(bars[1].volume, None);
}
