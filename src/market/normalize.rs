use crate::error::FeedError;
use crate::market::types::{NormalizedRecord, RawQuoteRecord};

/// Rounds to 2 decimal places with `f64::round` semantics (half away from
/// zero). Ties at the third decimal are not expected to matter for currency
/// display.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Applies the adjusted-close ratio to a raw batch and returns the surviving
/// records sorted ascending by date.
///
/// Per-record failures are silent: a record missing any OHLC field, or whose
/// close is zero (no ratio derivable), is dropped and the rest of the batch
/// proceeds. A record without an adjusted close is treated as already
/// adjusted (ratio 1) — some providers only emit the raw close. Duplicate
/// dates pass through untouched. Only a fully empty result is an error,
/// `NoValidData`, distinct from the provider returning nothing at all.
pub fn normalize_history(
    symbol: &str,
    raw: Vec<RawQuoteRecord>,
) -> Result<Vec<NormalizedRecord>, FeedError> {
    let mut records: Vec<NormalizedRecord> = raw.into_iter().filter_map(adjust_record).collect();
    if records.is_empty() {
        return Err(FeedError::NoValidData(symbol.to_string()));
    }
    // ISO dates sort lexicographically in chronological order.
    records.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(records)
}

fn adjust_record(raw: RawQuoteRecord) -> Option<NormalizedRecord> {
    let open = finite(raw.open)?;
    let high = finite(raw.high)?;
    let low = finite(raw.low)?;
    let close = finite(raw.close)?;
    if close == 0.0 {
        return None;
    }

    let adjusted_close = finite(raw.adj_close).unwrap_or(close);
    let ratio = adjusted_close / close;
    let value = round2(adjusted_close);

    Some(NormalizedRecord {
        date: raw.date.format("%Y-%m-%d").to_string(),
        open: round2(open * ratio),
        high: round2(high * ratio),
        low: round2(low * ratio),
        close: value,
        value,
    })
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|inner| inner.is_finite())
}
