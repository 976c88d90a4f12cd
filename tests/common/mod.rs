#![allow(dead_code)]

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stockfeed::FeedConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A canned-response HTTP server standing in for the market-data provider.
/// Routes are `(path_prefix, status, body)` triples matched in order against
/// the request target (path + query); unmatched requests get a 404. The
/// returned counter tracks how many requests actually reached the provider,
/// so tests can assert cache behavior.
pub async fn spawn_provider(routes: Vec<(String, u16, String)>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("mock provider should bind");
    let base_url = format!(
        "http://{}",
        listener.local_addr().expect("mock provider local addr")
    );
    let hits = Arc::new(AtomicUsize::new(0));
    let routes = Arc::new(routes);
    let task_hits = Arc::clone(&hits);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&task_hits);
            tokio::spawn(async move {
                let mut buffer = vec![0_u8; 16 * 1024];
                let mut read_total = 0;
                loop {
                    let Ok(count) = stream.read(&mut buffer[read_total..]).await else {
                        return;
                    };
                    if count == 0 {
                        return;
                    }
                    read_total += count;
                    if buffer[..read_total].windows(4).any(|win| win == b"\r\n\r\n") {
                        break;
                    }
                    if read_total == buffer.len() {
                        return;
                    }
                }

                let request = String::from_utf8_lossy(&buffer[..read_total]);
                let target = request
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                hits.fetch_add(1, Ordering::SeqCst);

                let (status, body) = routes
                    .iter()
                    .find(|(prefix, _, _)| target.starts_with(prefix.as_str()))
                    .map(|(_, status, body)| (*status, body.clone()))
                    .unwrap_or((404, "{}".to_string()));
                let reason = match status {
                    200 => "OK",
                    404 => "Not Found",
                    _ => "Internal Server Error",
                };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (base_url, hits)
}

/// Chart payload from `(unix_secs, open, high, low, close, adj_close)` rows.
pub fn chart_body(rows: &[(i64, f64, f64, f64, f64, f64)]) -> String {
    let timestamps: Vec<i64> = rows.iter().map(|row| row.0).collect();
    let opens: Vec<f64> = rows.iter().map(|row| row.1).collect();
    let highs: Vec<f64> = rows.iter().map(|row| row.2).collect();
    let lows: Vec<f64> = rows.iter().map(|row| row.3).collect();
    let closes: Vec<f64> = rows.iter().map(|row| row.4).collect();
    let adjusted: Vec<f64> = rows.iter().map(|row| row.5).collect();
    let volumes: Vec<u64> = rows.iter().map(|_| 1_000).collect();

    json!({
        "chart": {
            "result": [{
                "timestamp": timestamps,
                "indicators": {
                    "quote": [{
                        "open": opens,
                        "high": highs,
                        "low": lows,
                        "close": closes,
                        "volume": volumes
                    }],
                    "adjclose": [{"adjclose": adjusted}]
                }
            }],
            "error": null
        }
    })
    .to_string()
}

/// Chart payload with a result entry but zero quotes.
pub fn empty_chart_body() -> String {
    json!({
        "chart": {
            "result": [{
                "timestamp": [],
                "indicators": {"quote": [{}]}
            }],
            "error": null
        }
    })
    .to_string()
}

pub fn quote_body(symbol: &str, name: &str, price: f64, change: f64, change_percent: f64) -> String {
    json!({
        "quoteResponse": {
            "result": [{
                "symbol": symbol,
                "longName": name,
                "regularMarketPrice": price,
                "regularMarketChange": change,
                "regularMarketChangePercent": change_percent,
                "regularMarketPreviousClose": price - change,
                "regularMarketOpen": price,
                "regularMarketDayHigh": price,
                "regularMarketDayLow": price,
                "regularMarketVolume": 1_000
            }],
            "error": null
        }
    })
    .to_string()
}

pub fn test_config(base_url: &str, symbols: &[&str]) -> FeedConfig {
    FeedConfig {
        symbols: symbols.iter().map(|symbol| symbol.to_string()).collect(),
        poll_interval: Duration::from_secs(300),
        history_window_days: 30,
        bind_addr: "127.0.0.1:0".to_string(),
        provider_base_url: base_url.to_string(),
    }
}
