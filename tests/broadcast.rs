mod common;

use common::{quote_body, spawn_provider, test_config};
use futures_util::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use stockfeed::market::broadcast;
use stockfeed::MarketService;
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;
use tokio_util::sync::CancellationToken;

const READ_TIMEOUT: Duration = Duration::from_secs(10);

async fn start_server(base_url: &str, symbols: &[&str]) -> (String, CancellationToken) {
    let config = Arc::new(test_config(base_url, symbols));
    let service = Arc::new(MarketService::new(&config));
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("broadcast server should bind");
    let addr = listener.local_addr().expect("broadcast server local addr");
    let shutdown = CancellationToken::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = broadcast::run(listener, service, config, server_shutdown).await;
    });
    (format!("ws://{addr}"), shutdown)
}

async fn read_frames(url: &str, count: usize) -> Vec<Value> {
    let (mut websocket, _) = tokio::time::timeout(READ_TIMEOUT, connect_async(url))
        .await
        .expect("connect should not hang")
        .expect("websocket handshake");

    let mut frames = Vec::with_capacity(count);
    while frames.len() < count {
        let message = tokio::time::timeout(READ_TIMEOUT, websocket.next())
            .await
            .expect("push should arrive before the timeout")
            .expect("stream should stay open")
            .expect("frame should be readable");
        if message.is_text() {
            let text = message.into_text().expect("text frame");
            frames.push(serde_json::from_str(&text).expect("frame should be JSON"));
        }
    }
    let _ = websocket.close(None).await;
    frames
}

#[tokio::test]
async fn first_cycle_pushes_healthy_symbols_in_universe_order() {
    // Five symbols, one of which fails at the provider; the other four must
    // still arrive, in configuration order.
    let (base_url, _hits) = spawn_provider(vec![
        (
            "/v7/finance/quote?symbols=AAPL".to_string(),
            200,
            quote_body("AAPL", "Apple Inc.", 212.5, 1.0, 0.47),
        ),
        (
            "/v7/finance/quote?symbols=GOOGL".to_string(),
            200,
            quote_body("GOOGL", "Alphabet Inc.", 195.2, -0.8, -0.41),
        ),
        (
            "/v7/finance/quote?symbols=MSFT".to_string(),
            500,
            "{}".to_string(),
        ),
        (
            "/v7/finance/quote?symbols=AMZN".to_string(),
            200,
            quote_body("AMZN", "Amazon.com, Inc.", 180.0, 0.3, 0.17),
        ),
        (
            "/v7/finance/quote?symbols=META".to_string(),
            200,
            quote_body("META", "Meta Platforms, Inc.", 505.4, 2.1, 0.42),
        ),
    ])
    .await;
    let (url, shutdown) =
        start_server(&base_url, &["AAPL", "GOOGL", "MSFT", "AMZN", "META"]).await;

    let frames = read_frames(&url, 4).await;

    let symbols: Vec<&str> = frames
        .iter()
        .map(|frame| frame["symbol"].as_str().expect("symbol field"))
        .collect();
    assert_eq!(symbols, vec!["AAPL", "GOOGL", "AMZN", "META"]);
    assert_eq!(frames[0]["price"], 212.5);
    assert_eq!(frames[0]["change"], 1.0);
    assert_eq!(frames[0]["changePercent"], 0.47);

    shutdown.cancel();
}

#[tokio::test]
async fn subscribers_are_independent() {
    let (base_url, _hits) = spawn_provider(vec![(
        "/v7/finance/quote?symbols=AAPL".to_string(),
        200,
        quote_body("AAPL", "Apple Inc.", 212.5, 1.0, 0.47),
    )])
    .await;
    let (url, shutdown) = start_server(&base_url, &["AAPL"]).await;

    // The first subscriber connects, receives its immediate cycle and
    // disconnects; a later subscriber must be served as if nothing happened.
    let first = read_frames(&url, 1).await;
    assert_eq!(first[0]["symbol"], "AAPL");

    let second = read_frames(&url, 1).await;
    assert_eq!(second[0]["symbol"], "AAPL");

    shutdown.cancel();
}
