use chrono::NaiveDate;
use yfinance_session::{
    FetchRequest, HarnessAuthenticator, Interval, YfClient, session::discover_cache_path,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Usage: fetch_history [SYMBOL] [START] [END] [INTERVAL]
    let mut args = std::env::args().skip(1);
    let symbol = args.next().unwrap_or_else(|| "AAPL".to_string());
    let start: NaiveDate = args.next().as_deref().unwrap_or("2024-12-20").parse()?;
    let end: NaiveDate = args.next().as_deref().unwrap_or("2024-12-30").parse()?;
    let interval: Interval = args.next().as_deref().unwrap_or("1d").parse()?;

    // 1. Resolve the session cache next to the enclosing project, once.
    let cache = discover_cache_path(&std::env::current_dir()?);
    println!("session cache: {}", cache.display());

    // 2. Use a browser harness when one is configured, the plain handshake otherwise.
    let mut builder = YfClient::builder().cache_path(cache);
    if let Ok(program) = std::env::var("YF_BROWSER_HARNESS") {
        builder = builder.authenticator(HarnessAuthenticator::new(program));
    }
    let client = builder.build()?;

    // 3. One fetch sequence.
    let req = FetchRequest::for_dates(&symbol, start, end, interval, 3)?;
    let bars = client.fetch_history(&req).await?;

    println!("--- {symbol} {interval} {start} .. {end}: {} bars ---", bars.len());
    for b in &bars {
        let fmt = |v: Option<rust_decimal::Decimal>| v.map_or_else(|| "-".to_string(), |d| d.round_dp(2).to_string());
        println!(
            "{}  O {:>8}  H {:>8}  L {:>8}  C {:>8}  V {}",
            b.date,
            fmt(b.open),
            fmt(b.high),
            fmt(b.low),
            fmt(b.close),
            b.volume.map_or_else(|| "-".to_string(), |v| v.to_string())
        );
    }
    Ok(())
}
