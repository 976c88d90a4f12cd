use crate::error::FeedError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading-day observation as the provider reported it, before any
/// split/dividend adjustment. Field holes are preserved; the normalizer
/// decides what to do with them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawQuoteRecord {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<u64>,
}

/// Adjustment-applied daily record, rounded to 2 decimal places. `value`
/// always equals `close`; charting consumers read `value`, tabular ones
/// read the OHLC fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedRecord {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub value: f64,
}

/// Latest-quote wire payload. Numeric fields the provider omits are zero,
/// never absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub previous_close: f64,
    pub open: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub volume: u64,
}

/// Push-channel projection of a quote snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastQuote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl From<&QuoteSnapshot> for BroadcastQuote {
    fn from(snapshot: &QuoteSnapshot) -> Self {
        Self {
            symbol: snapshot.symbol.clone(),
            price: snapshot.price,
            change: snapshot.change,
            change_percent: snapshot.change_percent,
        }
    }
}

/// Summary statistics over one normalized series. Derived on demand and
/// never cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodMetrics {
    pub change: f64,
    pub percent_change: f64,
    pub high: f64,
    pub low: f64,
    pub average: f64,
}

/// Normalizes a caller-supplied ticker: trim, uppercase, charset check.
/// Tickers may carry `.` (share classes), `-` and `^` (indices) on top of
/// ASCII alphanumerics.
pub fn normalize_symbol(raw: &str) -> Result<String, FeedError> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err(FeedError::MissingSymbol);
    }
    if !symbol
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '^'))
    {
        return Err(FeedError::InvalidSymbol(symbol));
    }
    Ok(symbol)
}
