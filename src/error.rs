use serde::ser::{SerializeStruct, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("symbol is required")]
    MissingSymbol,
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),
    #[error("provider request failed: {0}")]
    ProviderUnavailable(#[from] reqwest::Error),
    #[error("no data available for {0}")]
    NoData(String),
    #[error("no valid data for {0} after normalization")]
    NoValidData(String),
    #[error("cannot compute percentage change from a zero baseline")]
    NoBaseline,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("websocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("json encode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeedError {
    /// Stable classification string carried on every wire error payload.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingSymbol => "missing_symbol",
            Self::InvalidSymbol(_) => "invalid_symbol",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::NoData(_) => "no_data",
            Self::NoValidData(_) => "no_valid_data",
            Self::NoBaseline => "no_baseline",
            Self::InvalidConfig(_) => "invalid_config",
            Self::WebSocket(_) => "websocket",
            Self::Json(_) => "json",
            Self::Io(_) => "io",
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for FeedError {
    fn from(value: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(value))
    }
}

impl serde::Serialize for FeedError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut payload = serializer.serialize_struct("FeedError", 2)?;
        payload.serialize_field("code", self.code())?;
        payload.serialize_field("message", &self.to_string())?;
        payload.end()
    }
}
