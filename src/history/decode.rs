use chrono::DateTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::core::{PriceBar, YfError};
use crate::history::wire::{ChartEnvelope, QuoteBlock};

/// Decodes a chart response body into bars ordered by strictly increasing date.
///
/// A `null` in any column only blanks that field of that row; the other fields of
/// the row and all other rows are unaffected. If the feed repeats a timestamp, the
/// later row wins.
///
/// # Errors
///
/// - [`YfError::DataProvider`] when the payload carries a non-null `error`.
/// - [`YfError::NoData`] when the result set or its timestamp array is empty.
/// - [`YfError::Data`] when the body is not a chart payload.
pub fn decode_chart(body: &str, symbol: &str) -> Result<Vec<PriceBar>, YfError> {
    let parsed: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| YfError::Data(format!("json parse error: {e}")))?;

    let chart = parsed
        .chart
        .ok_or_else(|| YfError::Data("missing chart".into()))?;

    if let Some(err) = chart.error {
        return Err(YfError::DataProvider(err.message()));
    }

    let no_data = || YfError::NoData {
        symbol: symbol.to_string(),
    };

    let r0 = chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(no_data)?;

    let ts = r0.timestamp.unwrap_or_default();
    if ts.is_empty() {
        return Err(no_data());
    }

    let indicators = r0
        .indicators
        .ok_or_else(|| YfError::Data("missing indicators".into()))?;
    let quote: QuoteBlock = indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| YfError::Data("missing quote".into()))?;
    let adjclose = indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let mut bars = Vec::with_capacity(ts.len());
    for (i, &t) in ts.iter().enumerate() {
        let date = DateTime::from_timestamp(t, 0)
            .ok_or_else(|| YfError::Data(format!("timestamp out of range at index {i}: {t}")))?
            .naive_utc();
        bars.push(PriceBar {
            date,
            open: price_at(&quote.open, i),
            high: price_at(&quote.high, i),
            low: price_at(&quote.low, i),
            close: price_at(&quote.close, i),
            adj_close: price_at(&adjclose, i),
            volume: quote.volume.get(i).copied().flatten(),
        });
    }

    bars.sort_by_key(|b| b.date);
    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    Ok(out)
}

/// Non-finite values map to `None` along with JSON nulls.
fn price_at(column: &[Option<f64>], i: usize) -> Option<Decimal> {
    column.get(i).copied().flatten().and_then(Decimal::from_f64)
}
