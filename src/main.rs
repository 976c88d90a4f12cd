use log::info;
use std::sync::Arc;
use stockfeed::market::broadcast;
use stockfeed::{FeedConfigArgs, FeedError, MarketService};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), FeedError> {
    init_logger();

    let config = Arc::new(FeedConfigArgs::from_env().normalize()?);
    info!(
        "starting feed for [{}], polling every {:?}",
        config.symbols.join(", "),
        config.poll_interval
    );

    let service = Arc::new(MarketService::new(&config));
    let listener = TcpListener::bind(&config.bind_addr).await?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            signal_token.cancel();
        }
    });

    broadcast::run(listener, service, Arc::clone(&config), shutdown).await
}

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
