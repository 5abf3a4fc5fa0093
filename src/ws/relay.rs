//! Relay mode: forwards one exchange to an upstream analysis server.
//!
//! The client request is validated locally, re-sent upstream over a fresh
//! WebSocket, and every upstream text frame is piped back unchanged. The
//! client stream is watched at the same time so a client disconnect tears
//! the upstream socket down.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, Stream, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as UpstreamMessage;
use tracing::Instrument;

use super::connection::{EventSink, await_peer_close, finish, read_request};
use super::messages::ServerEvent;
use crate::error::ExchangeError;

/// Notice sent when the upstream closes without a terminal event.
pub const UPSTREAM_CLOSED: &str = "upstream socket closed";

/// Per-connection relay settings.
#[derive(Debug, Clone)]
pub struct RelayContext {
    /// WebSocket URL of the upstream analysis server.
    pub upstream_url: Arc<str>,
    /// Bound on the wait for the client's request frame.
    pub request_timeout: Option<Duration>,
}

/// Relays one exchange from `socket` to the upstream and closes both ends.
pub async fn run_relay(socket: WebSocket, ctx: RelayContext) {
    let conn_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("relay", %conn_id, upstream = %ctx.upstream_url);

    async move {
        tracing::info!("client connected");
        let (mut ws_tx, mut ws_rx) = socket.split();
        let outcome = relay_exchange(&mut ws_tx, &mut ws_rx, &ctx).await;
        finish(&mut ws_tx, outcome).await;
        await_peer_close(&mut ws_rx).await;
        tracing::info!("client disconnected");
    }
    .instrument(span)
    .await;
}

async fn relay_exchange<S, R>(
    client_tx: &mut S,
    client_rx: &mut R,
    ctx: &RelayContext,
) -> Result<(), ExchangeError>
where
    S: EventSink + futures_util::Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let request = read_request(client_rx, ctx.request_timeout).await?;

    let (upstream, _response) = connect_async(&*ctx.upstream_url)
        .await
        .map_err(|e| ExchangeError::Upstream(e.to_string()))?;
    let (mut up_tx, mut up_rx) = upstream.split();
    tracing::debug!("upstream connected");

    up_tx
        .send(UpstreamMessage::text(request.to_json()))
        .await
        .map_err(|e| ExchangeError::Upstream(e.to_string()))?;

    let mut terminal_seen = false;
    let outcome = loop {
        tokio::select! {
            frame = client_rx.next() => match frame {
                Some(Ok(Message::Close(_)) | Err(_)) | None => {
                    break Err(ExchangeError::Disconnected);
                }
                Some(Ok(_)) => {}
            },
            frame = up_rx.next() => match frame {
                Some(Ok(UpstreamMessage::Text(text))) => {
                    match serde_json::from_str::<ServerEvent>(text.as_str()) {
                        Ok(event) => {
                            tracing::debug!(kind = event.type_str(), "upstream event");
                            terminal_seen |= event.is_terminal();
                        }
                        Err(_) => tracing::debug!("upstream frame is not an event"),
                    }
                    if client_tx.send(Message::text(text.as_str().to_string())).await.is_err() {
                        break Err(ExchangeError::Disconnected);
                    }
                }
                Some(Ok(UpstreamMessage::Close(_))) | None => {
                    if !terminal_seen {
                        tracing::warn!("upstream closed before a terminal event");
                        if client_tx.send_event(&ServerEvent::info(UPSTREAM_CLOSED)).await.is_err() {
                            break Err(ExchangeError::Disconnected);
                        }
                    }
                    break Ok(());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) if terminal_seen => {
                    tracing::debug!(error = %e, "upstream error after terminal event");
                    break Ok(());
                }
                Some(Err(e)) => break Err(ExchangeError::Upstream(e.to_string())),
            },
        }
    };

    let _ = up_tx.close().await;
    outcome
}
