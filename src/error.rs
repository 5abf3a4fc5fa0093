//! Error types for the server exchange and the console client.
//!
//! [`ExchangeError`] classifies everything that can end a server-side
//! exchange early. Each variant either maps to exactly one error event sent
//! to the peer, or (for disconnects) to nothing at all. [`ClientError`]
//! covers the transport failures that end a client session.

use tokio_tungstenite::tungstenite;

use crate::domain::TransformError;
use crate::ws::messages::ServerEvent;

/// Server-side failure scoped to a single connection.
///
/// # Error Categories
///
/// | Variant        | Sent to peer        | Log level |
/// |----------------|---------------------|-----------|
/// | `Validation`   | error event         | warn      |
/// | `Transform`    | error event         | warn      |
/// | `Timeout`      | error event         | warn      |
/// | `Upstream`     | error event         | error     |
/// | `Disconnected` | nothing             | info      |
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// The request frame was not a JSON object with a string `text` field.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The transform rejected the input.
    #[error("{0}")]
    Transform(#[from] TransformError),

    /// No request arrived within the configured timeout.
    #[error("timed out waiting for request")]
    Timeout,

    /// The relay could not reach or talk to the upstream analysis server.
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    /// The peer closed the socket or a write to it failed.
    #[error("peer disconnected")]
    Disconnected,
}

impl ExchangeError {
    /// Short machine-readable category used in log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Transform(_) => "transform",
            Self::Timeout => "timeout",
            Self::Upstream(_) => "upstream",
            Self::Disconnected => "disconnected",
        }
    }

    /// The error event to send to the peer, or `None` when there is no peer
    /// left to receive it.
    #[must_use]
    pub fn to_event(&self) -> Option<ServerEvent> {
        match self {
            Self::Disconnected => None,
            other => Some(ServerEvent::error(other.to_string())),
        }
    }
}

/// Failure that ends a client session.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The WebSocket handshake with the endpoint failed.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        /// Endpoint URL.
        url: String,
        /// Handshake failure.
        source: Box<tungstenite::Error>,
    },

    /// Writing to the console failed.
    #[error("console io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn disconnect_produces_no_event() {
        assert!(ExchangeError::Disconnected.to_event().is_none());
    }

    #[test]
    fn validation_error_becomes_error_event() {
        let err = ExchangeError::Validation("missing field `text`".to_string());
        let Some(ServerEvent::Error { message }) = err.to_event() else {
            panic!("expected error event");
        };
        assert_eq!(message, "invalid request: missing field `text`");
    }

    #[test]
    fn transform_error_message_is_forwarded_verbatim() {
        let err = ExchangeError::from(TransformError::new("boom"));
        assert_eq!(err.kind(), "transform");
        let Some(ServerEvent::Error { message }) = err.to_event() else {
            panic!("expected error event");
        };
        assert_eq!(message, "boom");
    }
}
