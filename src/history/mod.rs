//! Historical OHLCV bars from the chart endpoint.

mod decode;
pub mod engine;
pub(crate) mod fetch;
mod wire;

pub use decode::decode_chart;
pub use engine::{Event, FetchMachine, FetchState, Step};

use chrono::{DateTime, Duration, Utc};

use crate::core::{FetchRequest, Interval, PriceBar, YfClient, YfError};

/// A builder for fetching historical price data for a single symbol.
#[derive(Debug, Clone)]
pub struct HistoryBuilder {
    client: YfClient,
    symbol: String,
    period: Option<(DateTime<Utc>, DateTime<Utc>)>,
    interval: Interval,
    max_retries: Option<u32>,
}

impl HistoryBuilder {
    /// Creates a new `HistoryBuilder` for a given symbol.
    ///
    /// Defaults: daily bars over the six months ending now, and the client's retry budget.
    pub fn new(client: &YfClient, symbol: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            symbol: symbol.into(),
            period: None,
            interval: Interval::D1,
            max_retries: None,
        }
    }

    /// Sets an absolute time period for the request using start and end timestamps.
    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.period = Some((start, end));
        self
    }

    /// Sets the time interval for each bar.
    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Overrides how many rate-limited responses this fetch will retry.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Validates the parameters into an immutable [`FetchRequest`].
    ///
    /// # Errors
    ///
    /// Returns [`YfError::InvalidDates`] if the period is empty or reversed.
    pub fn request(&self) -> Result<FetchRequest, YfError> {
        let (start, end) = self.period.unwrap_or_else(|| {
            let end = Utc::now();
            (end - Duration::days(182), end)
        });
        FetchRequest::new(
            self.symbol.clone(),
            start,
            end,
            self.interval,
            self.max_retries
                .unwrap_or(self.client.retry_config().max_retries),
        )
    }

    /// Executes the request and returns the bars.
    ///
    /// # Errors
    ///
    /// See [`YfClient::fetch_history`].
    pub async fn fetch(self) -> Result<Vec<PriceBar>, YfError> {
        let req = self.request()?;
        self.client.fetch_history(&req).await
    }
}
