//! Decoding and console rendering of inbound frames.

use serde_json::Value;

use crate::ws::messages::ServerEvent;

/// One inbound text frame after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A well-formed server event.
    Event(ServerEvent),
    /// A JSON object that is not a known event: unknown or missing `type`,
    /// or a known `type` with missing fields.
    Unknown(Value),
    /// Anything that is not a JSON object.
    Raw(String),
}

impl Inbound {
    /// Decodes a text frame. Never fails; malformed input becomes
    /// [`Inbound::Raw`].
    #[must_use]
    pub fn decode(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Object(_)) => match serde_json::from_value(value.clone()) {
                Ok(event) => Self::Event(event),
                Err(_) => Self::Unknown(value),
            },
            Ok(_) | Err(_) => Self::Raw(raw.to_string()),
        }
    }

    /// Console line for this frame.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Event(ServerEvent::Progress {
                step,
                total,
                message,
            }) => format!("[Progress] {message} ({step}/{total})"),
            Self::Event(ServerEvent::Final { result }) => format!("[Final] {result}"),
            Self::Event(ServerEvent::Error { message }) => format!("[Error] {message}"),
            Self::Event(ServerEvent::Info { message }) => format!("[Info] {message}"),
            Self::Unknown(value) => format!("[Unknown] {value}"),
            Self::Raw(text) => format!("[RAW] {text}"),
        }
    }
}
