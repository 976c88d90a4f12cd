use crate::error::FeedError;
use crate::market::types::normalize_symbol;
use std::time::Duration;

pub const DEFAULT_SYMBOLS: [&str; 5] = ["AAPL", "GOOGL", "MSFT", "AMZN", "META"];
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_HISTORY_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:9300";
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const MIN_POLL_INTERVAL_SECS: u64 = 30;
pub const MAX_POLL_INTERVAL_SECS: u64 = 3_600;
pub const MIN_HISTORY_WINDOW_DAYS: i64 = 1;
pub const MAX_HISTORY_WINDOW_DAYS: i64 = 365;

/// Raw, partially-specified settings as read from the environment. Every
/// field is optional; `normalize` fills in defaults and validates ranges.
#[derive(Debug, Clone, Default)]
pub struct FeedConfigArgs {
    pub symbols: Option<Vec<String>>,
    pub poll_interval_secs: Option<u64>,
    pub history_window_days: Option<i64>,
    pub bind_addr: Option<String>,
    pub provider_base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub symbols: Vec<String>,
    pub poll_interval: Duration,
    pub history_window_days: i64,
    pub bind_addr: String,
    pub provider_base_url: String,
}

impl FeedConfigArgs {
    pub fn from_env() -> Self {
        Self {
            symbols: env_var("STOCKFEED_SYMBOLS")
                .map(|raw| raw.split(',').map(str::to_string).collect()),
            poll_interval_secs: env_var("STOCKFEED_POLL_INTERVAL_SECS")
                .and_then(|raw| raw.parse().ok()),
            history_window_days: env_var("STOCKFEED_HISTORY_WINDOW_DAYS")
                .and_then(|raw| raw.parse().ok()),
            bind_addr: env_var("STOCKFEED_BIND_ADDR"),
            provider_base_url: env_var("STOCKFEED_PROVIDER_URL"),
        }
    }

    pub fn normalize(self) -> Result<FeedConfig, FeedError> {
        let symbols = match self.symbols {
            Some(raw_symbols) => {
                let mut symbols = Vec::with_capacity(raw_symbols.len());
                for raw in raw_symbols {
                    let symbol = normalize_symbol(&raw).map_err(|_| {
                        FeedError::InvalidConfig(format!("invalid symbol '{raw}' in universe"))
                    })?;
                    symbols.push(symbol);
                }
                symbols
            }
            None => DEFAULT_SYMBOLS.iter().map(|symbol| symbol.to_string()).collect(),
        };
        if symbols.is_empty() {
            return Err(FeedError::InvalidConfig(
                "symbol universe must not be empty".to_string(),
            ));
        }

        let poll_interval_secs = self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        if !(MIN_POLL_INTERVAL_SECS..=MAX_POLL_INTERVAL_SECS).contains(&poll_interval_secs) {
            return Err(FeedError::InvalidConfig(format!(
                "pollIntervalSecs must be between {MIN_POLL_INTERVAL_SECS} and {MAX_POLL_INTERVAL_SECS}"
            )));
        }

        let history_window_days = self
            .history_window_days
            .unwrap_or(DEFAULT_HISTORY_WINDOW_DAYS);
        if !(MIN_HISTORY_WINDOW_DAYS..=MAX_HISTORY_WINDOW_DAYS).contains(&history_window_days) {
            return Err(FeedError::InvalidConfig(format!(
                "historyWindowDays must be between {MIN_HISTORY_WINDOW_DAYS} and {MAX_HISTORY_WINDOW_DAYS}"
            )));
        }

        let bind_addr = self
            .bind_addr
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let provider_base_url = self
            .provider_base_url
            .unwrap_or_else(|| DEFAULT_PROVIDER_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if provider_base_url.is_empty() {
            return Err(FeedError::InvalidConfig(
                "provider base URL must not be empty".to_string(),
            ));
        }

        Ok(FeedConfig {
            symbols,
            poll_interval: Duration::from_secs(poll_interval_secs),
            history_window_days,
            bind_addr,
            provider_base_url,
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
