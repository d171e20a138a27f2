use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::core::YfError;

/// The bar size requested from the chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    /// 1 minute.
    I1m,
    /// 2 minutes.
    I2m,
    /// 5 minutes.
    I5m,
    /// 15 minutes.
    I15m,
    /// 30 minutes. Documented upstream as unreliable; prefer [`Interval::I15m`].
    I30m,
    /// 60 minutes.
    I60m,
    /// 90 minutes.
    I90m,
    /// 1 hour (`1h`), the same bar size as [`Interval::I60m`] under another token.
    I1h,
    /// 1 day.
    D1,
    /// 5 days.
    D5,
    /// 1 week.
    W1,
    /// 1 month.
    M1,
    /// 3 months.
    M3,
}

impl Interval {
    /// Every interval the endpoint accepts, in ascending bar size.
    pub const ALL: [Interval; 13] = [
        Interval::I1m,
        Interval::I2m,
        Interval::I5m,
        Interval::I15m,
        Interval::I30m,
        Interval::I60m,
        Interval::I1h,
        Interval::I90m,
        Interval::D1,
        Interval::D5,
        Interval::W1,
        Interval::M1,
        Interval::M3,
    ];

    /// The query-string token for this interval.
    pub fn as_str(self) -> &'static str {
        match self {
            Interval::I1m => "1m",
            Interval::I2m => "2m",
            Interval::I5m => "5m",
            Interval::I15m => "15m",
            Interval::I30m => "30m",
            Interval::I60m => "60m",
            Interval::I90m => "90m",
            Interval::I1h => "1h",
            Interval::D1 => "1d",
            Interval::D5 => "5d",
            Interval::W1 => "1wk",
            Interval::M1 => "1mo",
            Interval::M3 => "3mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = YfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| YfError::InvalidInterval(s.to_string()))
    }
}

/// One OHLCV observation.
///
/// Every price field is optional: `None` means the provider had no value for this
/// row (no trade, halted, not yet published), which is different from a price of zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    /// Bar timestamp as reported by the feed, without a timezone.
    pub date: NaiveDateTime,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub adj_close: Option<Decimal>,
    pub volume: Option<u64>,
}

/// Parameters of one logical history fetch.
///
/// Built once and never mutated while the fetch retries, so every attempt in a
/// sequence asks for exactly the same data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    symbol: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Interval,
    max_retries: u32,
}

impl FetchRequest {
    /// Validates and builds a request.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::InvalidDates`] unless `start < end`, and [`YfError::Data`] for an
    /// empty symbol.
    pub fn new(
        symbol: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
        max_retries: u32,
    ) -> Result<Self, YfError> {
        let symbol = symbol.into().trim().to_string();
        if symbol.is_empty() {
            return Err(YfError::Data("empty ticker symbol".into()));
        }
        if start >= end {
            return Err(YfError::InvalidDates);
        }
        Ok(Self {
            symbol,
            start,
            end,
            interval,
            max_retries,
        })
    }

    /// Same as [`FetchRequest::new`], with both bounds at midnight UTC.
    ///
    /// # Errors
    ///
    /// See [`FetchRequest::new`].
    pub fn for_dates(
        symbol: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        interval: Interval,
        max_retries: u32,
    ) -> Result<Self, YfError> {
        Self::new(
            symbol,
            start.and_time(chrono::NaiveTime::MIN).and_utc(),
            end.and_time(chrono::NaiveTime::MIN).and_utc(),
            interval,
            max_retries,
        )
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// `(period1, period2)` as Unix seconds.
    pub fn period(&self) -> (i64, i64) {
        (self.start.timestamp(), self.end.timestamp())
    }
}
