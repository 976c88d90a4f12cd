use crate::error::FeedError;
use crate::market::types::{NormalizedRecord, PeriodMetrics};

/// Computes period statistics over a chronologically ordered series.
///
/// The caller supplies the order; nothing is re-sorted here. Change and
/// percentage change compare the window's first and last usable closes
/// rather than an out-of-band previous close. High and low are taken over
/// whichever records carry a usable value for that field, independently of
/// the close-based subset. Returns `Ok(None)` when no record has a usable
/// close; a zero first close is `NoBaseline` so infinities never reach the
/// output.
pub fn compute_metrics(series: &[NormalizedRecord]) -> Result<Option<PeriodMetrics>, FeedError> {
    let closes: Vec<f64> = series
        .iter()
        .map(|record| record.close)
        .filter(|close| close.is_finite())
        .collect();
    let (Some(&first_close), Some(&last_close)) = (closes.first(), closes.last()) else {
        return Ok(None);
    };
    if first_close == 0.0 {
        return Err(FeedError::NoBaseline);
    }

    let change = last_close - first_close;
    let percent_change = change / first_close * 100.0;

    let high = series
        .iter()
        .map(|record| record.high)
        .filter(|value| value.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    let low = series
        .iter()
        .map(|record| record.low)
        .filter(|value| value.is_finite())
        .fold(f64::INFINITY, f64::min);
    let average = closes.iter().sum::<f64>() / closes.len() as f64;

    Ok(Some(PeriodMetrics {
        change,
        percent_change,
        high,
        low,
        average,
    }))
}
