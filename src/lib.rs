pub mod config;
pub mod error;
pub mod market;

pub use config::{FeedConfig, FeedConfigArgs};
pub use error::FeedError;
pub use market::service::MarketService;
