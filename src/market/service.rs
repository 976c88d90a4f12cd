use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::market::cache::{
    broadcast_key, history_key, quote_key, CachedPayload, TtlCache, BROADCAST_TTL, HISTORY_TTL,
    QUOTE_TTL,
};
use crate::market::metrics::compute_metrics;
use crate::market::normalize::normalize_history;
use crate::market::provider::ProviderClient;
use crate::market::types::{
    normalize_symbol, BroadcastQuote, NormalizedRecord, PeriodMetrics, QuoteSnapshot,
};
use chrono::{Duration as TimeDelta, Utc};
use log::{debug, warn};

/// Request-path entry point: one fetch-normalize-cache sequence per call, no
/// internal fan-out. Shared between request handlers and the broadcast loop,
/// which keeps its own cache kind so the two paths never collide.
pub struct MarketService {
    provider: ProviderClient,
    cache: TtlCache,
    history_window_days: i64,
}

impl MarketService {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            provider: ProviderClient::new(config.provider_base_url.clone()),
            cache: TtlCache::new(),
            history_window_days: config.history_window_days,
        }
    }

    /// Adjusted daily series for the trailing window, oldest record first.
    pub async fn history(&self, symbol: &str) -> Result<Vec<NormalizedRecord>, FeedError> {
        let symbol = normalize_symbol(symbol)?;
        if let Some(CachedPayload::History(series)) = self.cache.get(&history_key(&symbol)) {
            debug!("history cache hit for {symbol}");
            return Ok(series);
        }

        let end = Utc::now();
        let start = end - TimeDelta::days(self.history_window_days);
        let raw = self.provider.fetch_history(&symbol, start, end).await?;
        let series = normalize_history(&symbol, raw)?;
        self.cache.set(
            &history_key(&symbol),
            CachedPayload::History(series.clone()),
            HISTORY_TTL,
        );
        Ok(series)
    }

    /// Latest quote snapshot, zero-defaulted.
    pub async fn quote(&self, symbol: &str) -> Result<QuoteSnapshot, FeedError> {
        let symbol = normalize_symbol(symbol)?;
        if let Some(CachedPayload::Quote(snapshot)) = self.cache.get(&quote_key(&symbol)) {
            debug!("quote cache hit for {symbol}");
            return Ok(snapshot);
        }

        let snapshot = self.provider.fetch_quote(&symbol).await?;
        self.cache.set(
            &quote_key(&symbol),
            CachedPayload::Quote(snapshot.clone()),
            QUOTE_TTL,
        );
        Ok(snapshot)
    }

    /// Period statistics over the trailing-window series. `Ok(None)` when
    /// the series has no usable closes.
    pub async fn history_metrics(&self, symbol: &str) -> Result<Option<PeriodMetrics>, FeedError> {
        let series = self.history(symbol).await?;
        compute_metrics(&series)
    }

    /// Latest quote for the push channel, under its own cache kind so
    /// overlapping subscriber cycles share one provider call per TTL window.
    pub async fn broadcast_quote(&self, symbol: &str) -> Result<BroadcastQuote, FeedError> {
        let symbol = normalize_symbol(symbol)?;
        if let Some(CachedPayload::Quote(snapshot)) = self.cache.get(&broadcast_key(&symbol)) {
            return Ok(BroadcastQuote::from(&snapshot));
        }

        let snapshot = self.provider.fetch_quote(&symbol).await?;
        self.cache.set(
            &broadcast_key(&symbol),
            CachedPayload::Quote(snapshot.clone()),
            BROADCAST_TTL,
        );
        Ok(BroadcastQuote::from(&snapshot))
    }

    /// One snapshot per universe symbol, fetched sequentially to respect the
    /// shared provider rate limit. Per-symbol failures are logged and
    /// skipped.
    pub async fn universe(&self, symbols: &[String]) -> Vec<QuoteSnapshot> {
        let mut snapshots = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.quote(symbol).await {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(error) => warn!("universe quote for {symbol} failed: {error}"),
            }
        }
        snapshots
    }
}
