use crate::error::FeedError;
use crate::market::types::{QuoteSnapshot, RawQuoteRecord};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

/// HTTP client for the market-data provider. One provider call per
/// invocation, no retries here; callers decide whether a failure is worth
/// retrying.
pub struct ProviderClient {
    http: Client,
    base_url: String,
}

impl ProviderClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn chart_endpoint(&self, symbol: &str, period1: i64, period2: i64) -> String {
        format!(
            "{}/v8/finance/chart/{symbol}?period1={period1}&period2={period2}&interval=1d&includeAdjustedClose=true",
            self.base_url
        )
    }

    fn quote_endpoint(&self, symbol: &str) -> String {
        format!("{}/v7/finance/quote?symbols={symbol}", self.base_url)
    }

    /// Daily OHLC series for an inclusive calendar range, provider order.
    pub async fn fetch_history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawQuoteRecord>, FeedError> {
        let endpoint = self.chart_endpoint(symbol, start.timestamp(), end.timestamp());
        let response = self.http.get(endpoint).send().await?.error_for_status()?;
        let payload = response.json::<ChartResponseWire>().await?;

        let data = payload
            .chart
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| FeedError::NoData(symbol.to_string()))?;

        let records = chart_rows(data);
        if records.is_empty() {
            return Err(FeedError::NoData(symbol.to_string()));
        }
        Ok(records)
    }

    /// Latest quote for one symbol.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<QuoteSnapshot, FeedError> {
        let endpoint = self.quote_endpoint(symbol);
        let response = self.http.get(endpoint).send().await?.error_for_status()?;
        let payload = response.json::<QuoteResponseWire>().await?;

        let quote = payload
            .quote_response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| FeedError::NoData(symbol.to_string()))?;
        Ok(quote.into_snapshot(symbol))
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponseWire {
    chart: ChartWire,
}

#[derive(Debug, Deserialize)]
struct ChartWire {
    result: Option<Vec<ChartResultWire>>,
}

#[derive(Debug, Deserialize)]
struct ChartResultWire {
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: IndicatorsWire,
}

#[derive(Debug, Default, Deserialize)]
struct IndicatorsWire {
    #[serde(default)]
    quote: Vec<QuoteColumnsWire>,
    #[serde(default)]
    adjclose: Vec<AdjCloseColumnsWire>,
}

// The provider reports the series column-wise; individual cells may be null
// on halted trading days.
#[derive(Debug, Default, Deserialize)]
struct QuoteColumnsWire {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjCloseColumnsWire {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn chart_rows(data: ChartResultWire) -> Vec<RawQuoteRecord> {
    let columns = data.indicators.quote.into_iter().next().unwrap_or_default();
    let adjusted = data
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|block| block.adjclose)
        .unwrap_or_default();

    let mut records = Vec::with_capacity(data.timestamp.len());
    for (index, unix_secs) in data.timestamp.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(*unix_secs, 0).map(|moment| moment.date_naive())
        else {
            continue;
        };
        records.push(RawQuoteRecord {
            date,
            open: column_cell(&columns.open, index),
            high: column_cell(&columns.high, index),
            low: column_cell(&columns.low, index),
            close: column_cell(&columns.close, index),
            adj_close: column_cell(&adjusted, index),
            volume: column_cell(&columns.volume, index),
        });
    }
    records
}

fn column_cell<T: Copy>(column: &[Option<T>], index: usize) -> Option<T> {
    column.get(index).copied().flatten()
}

#[derive(Debug, Deserialize)]
struct QuoteResponseWire {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteListWire,
}

#[derive(Debug, Deserialize)]
struct QuoteListWire {
    #[serde(default)]
    result: Vec<QuoteWire>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteWire {
    symbol: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_previous_close: Option<f64>,
    regular_market_open: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<u64>,
}

impl QuoteWire {
    /// Numeric holes become zero and the display name falls back long name
    /// -> short name -> symbol, so the snapshot is always fully populated.
    fn into_snapshot(self, fallback_symbol: &str) -> QuoteSnapshot {
        let symbol = self
            .symbol
            .unwrap_or_else(|| fallback_symbol.to_string());
        let name = self
            .long_name
            .or(self.short_name)
            .unwrap_or_else(|| symbol.clone());

        QuoteSnapshot {
            symbol,
            name,
            price: self.regular_market_price.unwrap_or(0.0),
            change: self.regular_market_change.unwrap_or(0.0),
            change_percent: self.regular_market_change_percent.unwrap_or(0.0),
            previous_close: self.regular_market_previous_close.unwrap_or(0.0),
            open: self.regular_market_open.unwrap_or(0.0),
            day_high: self.regular_market_day_high.unwrap_or(0.0),
            day_low: self.regular_market_day_low.unwrap_or(0.0),
            volume: self.regular_market_volume.unwrap_or(0),
        }
    }
}
