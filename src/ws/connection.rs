//! Single-exchange driver for one WebSocket connection.
//!
//! Reads one request, streams the progress plan, sends the final result and
//! closes. Every failure is scoped to this connection: validation and
//! transform failures become one error event, a vanished peer ends the
//! exchange silently.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, Stream, StreamExt};
use tracing::Instrument;

use super::messages::{AnalyzeRequest, ServerEvent, parse_request};
use crate::domain::{ProgressPlan, Transform};
use crate::error::ExchangeError;

/// How long to wait for the peer's close frame after closing.
pub const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Outbound half of a connection as seen by the exchange.
pub trait EventSink {
    /// Sends one event.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::Disconnected`] when the peer is gone.
    fn send_event(
        &mut self,
        event: &ServerEvent,
    ) -> impl Future<Output = Result<(), ExchangeError>> + Send;

    /// Closes the connection from the server side. Failures are ignored.
    fn close(&mut self, reason: &'static str) -> impl Future<Output = ()> + Send;
}

impl EventSink for SplitSink<WebSocket, Message> {
    async fn send_event(&mut self, event: &ServerEvent) -> Result<(), ExchangeError> {
        self.send(Message::text(event.to_json()))
            .await
            .map_err(|_| ExchangeError::Disconnected)
    }

    async fn close(&mut self, reason: &'static str) {
        let frame = CloseFrame {
            code: close_code::NORMAL,
            reason: reason.into(),
        };
        let _ = self.send(Message::Close(Some(frame))).await;
    }
}

/// Per-connection settings, cloned out of the application state on upgrade.
#[derive(Debug, Clone)]
pub struct ExchangeContext {
    /// Steps and interval of the progress loop.
    pub plan: ProgressPlan,
    /// Produces the final result.
    pub transform: Arc<dyn Transform>,
    /// Bound on the wait for the request frame.
    pub request_timeout: Option<Duration>,
}

/// Runs one exchange over `socket` and closes it.
pub async fn run_connection(socket: WebSocket, ctx: ExchangeContext) {
    let conn_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("ws", %conn_id);

    async move {
        tracing::info!("connection accepted");
        let (mut ws_tx, mut ws_rx) = socket.split();
        let outcome = run_exchange(&mut ws_tx, &mut ws_rx, &ctx).await;
        finish(&mut ws_tx, outcome).await;
        await_peer_close(&mut ws_rx).await;
        tracing::info!("connection closed");
    }
    .instrument(span)
    .await;
}

/// Drives the exchange up to and including the final event.
///
/// While waiting between steps the inbound stream is watched so that a
/// client close is noticed before the next send.
///
/// # Errors
///
/// Returns the [`ExchangeError`] that ended the exchange early.
pub async fn run_exchange<S, R>(
    sink: &mut S,
    inbound: &mut R,
    ctx: &ExchangeContext,
) -> Result<(), ExchangeError>
where
    S: EventSink,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let request = read_request(inbound, ctx.request_timeout).await?;
    tracing::debug!(len = request.text.len(), "request received");

    let plan = ctx.plan;
    for step in plan.steps() {
        pause(inbound, plan.interval()).await?;
        sink.send_event(&ServerEvent::Progress {
            step,
            total: plan.total(),
            message: plan.message(step),
        })
        .await?;
        tracing::info!(step, total = plan.total(), "progress sent");
    }

    let result = ctx.transform.apply(&request.text)?;
    sink.send_event(&ServerEvent::Final { result }).await?;
    tracing::info!("final result sent");
    Ok(())
}

/// Reports the outcome to the peer (when there still is one) and closes.
///
/// After a disconnect no event is sent; the close call only completes the
/// closing handshake if the peer started one.
pub async fn finish<S: EventSink>(sink: &mut S, outcome: Result<(), ExchangeError>) {
    match outcome {
        Ok(()) => sink.close("exchange complete").await,
        Err(ExchangeError::Disconnected) => {
            tracing::info!("client disconnected");
            sink.close("client disconnected").await;
        }
        Err(err) => {
            tracing::warn!(kind = err.kind(), error = %err, "exchange failed");
            if let Some(event) = err.to_event()
                && sink.send_event(&event).await.is_ok()
            {
                sink.close("exchange failed").await;
            }
        }
    }
}

/// Drains the inbound stream until the peer acknowledges the close, for at
/// most [`CLOSE_GRACE`].
pub(super) async fn await_peer_close<R>(inbound: &mut R)
where
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let drained = tokio::time::timeout(CLOSE_GRACE, async {
        while let Some(Ok(frame)) = inbound.next().await {
            if matches!(frame, Message::Close(_)) {
                break;
            }
        }
    })
    .await;
    if drained.is_err() {
        tracing::debug!("peer did not acknowledge close");
    }
}

/// Waits for the request frame, bounded by `timeout` when set.
pub(super) async fn read_request<R>(
    inbound: &mut R,
    timeout: Option<Duration>,
) -> Result<AnalyzeRequest, ExchangeError>
where
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, next_request(inbound))
            .await
            .map_err(|_| ExchangeError::Timeout)?,
        None => next_request(inbound).await,
    }
}

async fn next_request<R>(inbound: &mut R) -> Result<AnalyzeRequest, ExchangeError>
where
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        match inbound.next().await {
            Some(Ok(Message::Text(text))) => return parse_request(text.as_str()),
            Some(Ok(Message::Binary(_))) => {
                return Err(ExchangeError::Validation(
                    "expected a text frame, got binary".to_string(),
                ));
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            Some(Ok(Message::Close(_)) | Err(_)) | None => {
                return Err(ExchangeError::Disconnected);
            }
        }
    }
}

/// Sleeps for `interval`, failing early if the client goes away.
async fn pause<R>(inbound: &mut R, interval: Duration) -> Result<(), ExchangeError>
where
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let sleep = tokio::time::sleep(interval);
    tokio::pin!(sleep);

    loop {
        // Inbound first: a queued close wins over an elapsed interval.
        tokio::select! {
            biased;
            frame = inbound.next() => match frame {
                Some(Ok(Message::Close(_)) | Err(_)) | None => {
                    return Err(ExchangeError::Disconnected);
                }
                // One request per connection; anything else is ignored.
                Some(Ok(_)) => {}
            },
            () = &mut sleep => return Ok(()),
        }
    }
}
