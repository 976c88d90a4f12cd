pub mod broadcast;
pub mod cache;
pub mod metrics;
pub mod normalize;
pub mod provider;
pub mod service;
pub mod types;
