//! Client session: one connection, one request, every reply printed.
//!
//! [`SessionMachine`] is a pure state machine. [`run_session`] feeds it
//! events from two producers, the socket reader task and the operator input
//! thread, through one channel, and carries out the actions it returns. Only
//! the driver loop writes to the socket.

use std::io::{BufRead, Write};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::render::Inbound;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::ws::messages::{AnalyzeRequest, ServerEvent};

/// Prompt shown before reading the operator's text.
pub const PROMPT: &str = "Enter text to analyze: ";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake in progress.
    Connecting,
    /// Open; waiting for the operator's line.
    AwaitingInput,
    /// Request sent; printing replies until close.
    AwaitingMessages,
    /// Done. All further events are ignored.
    Closed,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The WebSocket handshake completed.
    Opened,
    /// The operator entered text to analyze.
    SendRequest(String),
    /// Operator input ended without a line.
    InputClosed,
    /// A text frame arrived.
    MessageReceived(String),
    /// The transport failed.
    Error(String),
    /// The connection closed.
    Closed,
}

/// Side effects requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the prompt and start reading operator input.
    PromptInput,
    /// Send this JSON text frame.
    Send(String),
    /// Print a line to the console.
    Print(String),
    /// Close the socket from the client side.
    CloseSocket,
    /// Stop the session.
    Shutdown,
}

/// Explicit state machine for one client exchange.
#[derive(Debug)]
pub struct SessionMachine {
    state: SessionState,
    final_result: Option<String>,
    received: usize,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMachine {
    /// Creates a machine in [`SessionState::Connecting`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SessionState::Connecting,
            final_result: None,
            received: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Result of the final event, once received.
    #[must_use]
    pub fn final_result(&self) -> Option<&str> {
        self.final_result.as_deref()
    }

    /// Number of text frames received so far.
    #[must_use]
    pub const fn received(&self) -> usize {
        self.received
    }

    /// Applies one event and returns the actions to perform, in order.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Action> {
        use SessionState as S;

        match (self.state, event) {
            (S::Closed, _) => Vec::new(),

            (S::Connecting, SessionEvent::Opened) => {
                self.state = S::AwaitingInput;
                vec![Action::PromptInput]
            }

            (S::AwaitingInput, SessionEvent::SendRequest(text)) => {
                self.state = S::AwaitingMessages;
                vec![Action::Send(AnalyzeRequest::new(text).to_json())]
            }

            (S::AwaitingInput, SessionEvent::InputClosed) => vec![
                Action::Print("No input provided, closing connection".to_string()),
                Action::CloseSocket,
            ],

            (_, SessionEvent::MessageReceived(raw)) => {
                self.received += 1;
                let inbound = Inbound::decode(&raw);
                match &inbound {
                    Inbound::Event(ServerEvent::Final { result }) => {
                        self.final_result = Some(result.clone());
                    }
                    Inbound::Unknown(value) => {
                        tracing::warn!(%value, "unrecognized message from server");
                    }
                    Inbound::Raw(_) => {
                        tracing::debug!("server sent a non-object frame");
                    }
                    Inbound::Event(_) => {}
                }
                vec![Action::Print(inbound.render())]
            }

            (_, SessionEvent::Error(message)) => {
                self.state = S::Closed;
                vec![Action::Print(format!("[Error] {message}")), Action::Shutdown]
            }

            (_, SessionEvent::Closed) => {
                self.state = S::Closed;
                vec![
                    Action::Print("Connection closed".to_string()),
                    Action::Shutdown,
                ]
            }

            // Duplicate opens, a second request, input after close.
            (state, event) => {
                tracing::debug!(?state, ?event, "event ignored");
                Vec::new()
            }
        }
    }
}

/// Outcome of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Result of the final event, if one arrived.
    pub final_result: Option<String>,
    /// Number of text frames received.
    pub received: usize,
}

/// Runs one exchange against `config.ws_url`.
///
/// `input` is read on its own thread so a blocked read never stalls the
/// socket; `out` receives every console line.
///
/// # Errors
///
/// Returns [`ClientError::Connect`] if the handshake fails and
/// [`ClientError::Io`] if writing to `out` fails. Transport failures after
/// the handshake are printed and end the session normally.
pub async fn run_session<I, W>(
    config: &ClientConfig,
    input: I,
    out: &mut W,
) -> Result<SessionSummary, ClientError>
where
    I: BufRead + Send + 'static,
    W: Write,
{
    let (stream, _response) =
        connect_async(config.ws_url.as_str())
            .await
            .map_err(|source| ClientError::Connect {
                url: config.ws_url.clone(),
                source: Box::new(source),
            })?;
    tracing::debug!(url = %config.ws_url, "connected");

    let (mut ws_tx, mut ws_rx) = stream.split();
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let reader_tx = events_tx.clone();
    let reader = tokio::spawn(async move {
        let mut close_seen = false;
        while let Some(frame) = ws_rx.next().await {
            let event = match frame {
                Ok(Message::Text(text)) => SessionEvent::MessageReceived(text.as_str().to_string()),
                Ok(Message::Binary(bytes)) => {
                    SessionEvent::MessageReceived(String::from_utf8_lossy(&bytes).into_owned())
                }
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "close frame received");
                    close_seen = true;
                    continue;
                }
                Ok(_) => continue,
                // The peer may drop the socket right after its close frame.
                Err(e) if close_seen => {
                    tracing::debug!(error = %e, "transport error after close");
                    break;
                }
                Err(e) => {
                    let _ = reader_tx.send(SessionEvent::Error(e.to_string()));
                    return;
                }
            };
            if reader_tx.send(event).is_err() {
                return;
            }
        }
        let _ = reader_tx.send(SessionEvent::Closed);
    });

    let _ = events_tx.send(SessionEvent::Opened);

    let mut machine = SessionMachine::new();
    let mut input = Some(input);

    'session: while let Some(event) = events_rx.recv().await {
        for action in machine.handle(event) {
            match action {
                Action::PromptInput => {
                    write!(out, "{PROMPT}")?;
                    out.flush()?;
                    if let Some(input) = input.take() {
                        spawn_input(input, events_tx.clone())?;
                    }
                }
                Action::Send(json) => {
                    if let Err(e) = ws_tx.send(Message::text(json)).await {
                        let _ = events_tx.send(SessionEvent::Error(e.to_string()));
                    }
                }
                Action::Print(line) => writeln!(out, "{line}")?,
                Action::CloseSocket => {
                    let _ = ws_tx.close().await;
                }
                Action::Shutdown => break 'session,
            }
        }
    }

    reader.abort();
    Ok(SessionSummary {
        final_result: machine.final_result().map(str::to_string),
        received: machine.received(),
    })
}

/// Reads one line from `input` on a dedicated thread and posts it.
fn spawn_input<I>(mut input: I, events: mpsc::UnboundedSender<SessionEvent>) -> std::io::Result<()>
where
    I: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name("operator-input".to_string())
        .spawn(move || {
            let mut line = String::new();
            let event = match input.read_line(&mut line) {
                Ok(0) => SessionEvent::InputClosed,
                Ok(_) => SessionEvent::SendRequest(line.trim_end_matches(['\r', '\n']).to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read operator input");
                    SessionEvent::InputClosed
                }
            };
            let _ = events.send(event);
        })?;
    Ok(())
}
