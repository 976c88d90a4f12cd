use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::market::service::MarketService;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};
use tokio_util::sync::CancellationToken;

type SubscriberSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Lifecycle of one subscriber connection. `Closed` is terminal; a dropped
/// subscriber reconnects from scratch rather than being retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubscriberState {
    Connecting,
    Active,
    Closed,
}

/// Accept loop. Every subscriber gets its own polling task and timer;
/// subscribers are fully independent of each other. The parent token tears
/// all of them down on shutdown.
pub async fn run(
    listener: TcpListener,
    service: Arc<MarketService>,
    config: Arc<FeedConfig>,
    shutdown: CancellationToken,
) -> Result<(), FeedError> {
    info!("broadcast server listening on {}", listener.local_addr()?);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                let subscriber_service = Arc::clone(&service);
                let subscriber_config = Arc::clone(&config);
                let subscriber_cancel = shutdown.child_token();
                tokio::spawn(async move {
                    handle_subscriber(
                        stream,
                        peer,
                        subscriber_service,
                        subscriber_config,
                        subscriber_cancel,
                    )
                    .await;
                });
            }
        }
    }

    Ok(())
}

async fn handle_subscriber(
    stream: TcpStream,
    peer: SocketAddr,
    service: Arc<MarketService>,
    config: Arc<FeedConfig>,
    cancel: CancellationToken,
) {
    let mut state = SubscriberState::Connecting;
    debug!("subscriber {peer}: {state:?}");

    let websocket = match accept_async(stream).await {
        Ok(websocket) => websocket,
        Err(error) => {
            warn!("handshake with {peer} failed: {error}");
            return;
        }
    };
    state = SubscriberState::Active;
    info!("subscriber {peer} connected");

    let (mut sink, mut reader) = websocket.split();

    // Drain inbound frames so a client close (or a broken transport) cancels
    // the polling loop even between ticks.
    let reader_cancel = cancel.clone();
    let reader_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = reader_cancel.cancelled() => break,
                frame = reader.next() => match frame {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
        reader_cancel.cancel();
    });

    // The first tick fires immediately, so the subscriber has data without
    // waiting out a full interval.
    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while state == SubscriberState::Active {
        tokio::select! {
            _ = cancel.cancelled() => {
                state = SubscriberState::Closed;
            }
            _ = ticker.tick() => {
                match push_cycle(&service, &config.symbols, &mut sink).await {
                    Ok(pushed) => {
                        debug!("pushed {pushed} quotes to {peer}");
                    }
                    Err(error) => {
                        // The peer is gone; pushing further would be a no-op.
                        warn!("subscriber {peer} dropped mid-cycle: {error}");
                        state = SubscriberState::Closed;
                    }
                }
            }
        }
    }

    cancel.cancel();
    let _ = reader_task.await;
    info!("subscriber {peer} disconnected");
}

/// One pass over the symbol universe: fetch, project, push. Symbols are
/// processed sequentially in universe order to bound simultaneous outbound
/// provider calls; a per-symbol failure skips that symbol only. Returns the
/// number of frames delivered, or the push error when the connection itself
/// failed.
async fn push_cycle(
    service: &MarketService,
    symbols: &[String],
    sink: &mut SubscriberSink,
) -> Result<usize, FeedError> {
    let mut pushed = 0_usize;
    for symbol in symbols {
        let quote = match service.broadcast_quote(symbol).await {
            Ok(quote) => quote,
            Err(error) => {
                warn!("quote fetch for {symbol} failed, skipping this cycle: {error}");
                continue;
            }
        };
        let frame = match serde_json::to_string(&quote) {
            Ok(frame) => frame,
            Err(error) => {
                warn!("could not encode quote for {symbol}: {error}");
                continue;
            }
        };
        sink.send(Message::Text(frame)).await?;
        pushed += 1;
    }
    Ok(pushed)
}
