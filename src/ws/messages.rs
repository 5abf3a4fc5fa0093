//! WebSocket message types: the client request and the server events.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::ExchangeError;

/// The single request a client sends per connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Text to analyze.
    pub text: String,
}

impl AnalyzeRequest {
    /// Creates a request for `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Serializes the request as a JSON text frame payload.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Events the server sends during an exchange, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Step `step` of `total` has completed.
    Progress {
        /// 1-based step number.
        step: u32,
        /// Total number of steps in this exchange.
        total: u32,
        /// Human-readable status line.
        message: String,
    },
    /// Terminal success carrying the transformed text.
    Final {
        /// Transform output.
        result: String,
    },
    /// Terminal failure; replaces the final event.
    Error {
        /// Description of what went wrong.
        message: String,
    },
    /// Relay notice, sent when the upstream closes before a terminal event.
    Info {
        /// Notice text.
        message: String,
    },
}

impl ServerEvent {
    /// Builds an [`ServerEvent::Error`].
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Builds an [`ServerEvent::Info`].
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }

    /// Returns `true` for events after which nothing else is sent.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Final { .. } | Self::Error { .. })
    }

    /// The `type` tag as it appears on the wire.
    #[must_use]
    pub const fn type_str(&self) -> &'static str {
        match self {
            Self::Progress { .. } => "progress",
            Self::Final { .. } => "final",
            Self::Error { .. } => "error",
            Self::Info { .. } => "info",
        }
    }

    /// Serializes the event as a JSON text frame payload.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Validates a request frame.
///
/// The payload must be a JSON object whose `text` key holds a string.
/// Extra keys are ignored.
///
/// # Errors
///
/// Returns [`ExchangeError::Validation`] for malformed JSON, a non-object
/// payload, a missing `text` key, or a `text` value that is not a string.
pub fn parse_request(raw: &str) -> Result<AnalyzeRequest, ExchangeError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ExchangeError::Validation(format!("malformed JSON: {e}")))?;

    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(ExchangeError::Validation(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            )));
        }
    };

    match fields.remove("text") {
        Some(Value::String(text)) => Ok(AnalyzeRequest { text }),
        Some(other) => Err(ExchangeError::Validation(format!(
            "field `text` must be a string, got {}",
            json_type_name(&other)
        ))),
        None => Err(ExchangeError::Validation("missing field `text`".to_string())),
    }
}

/// JSON type name used in validation messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn validation_message(raw: &str) -> String {
        let Err(ExchangeError::Validation(message)) = parse_request(raw) else {
            panic!("expected validation error for {raw}");
        };
        message
    }

    #[test]
    fn accepts_text_field() {
        let Ok(req) = parse_request(r#"{"text": "hello"}"#) else {
            panic!("valid request rejected");
        };
        assert_eq!(req.text, "hello");
    }

    #[test]
    fn ignores_extra_fields() {
        let Ok(req) = parse_request(r#"{"text": "", "lang": "en"}"#) else {
            panic!("valid request rejected");
        };
        assert_eq!(req.text, "");
    }

    #[test]
    fn rejects_missing_text() {
        assert_eq!(validation_message("{}"), "missing field `text`");
    }

    #[test]
    fn rejects_wrong_type() {
        assert_eq!(
            validation_message(r#"{"text": 42}"#),
            "field `text` must be a string, got number"
        );
        assert!(validation_message(r#"{"text": null}"#).contains("null"));
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert!(validation_message(r#"["text"]"#).contains("array"));
        assert!(validation_message(r#""hello""#).contains("string"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(validation_message("{text:").starts_with("malformed JSON"));
    }

    #[test]
    fn progress_event_wire_shape() {
        let event = ServerEvent::Progress {
            step: 2,
            total: 5,
            message: "Analyzing... step 2/5".to_string(),
        };
        let value: Value = serde_json::from_str(&event.to_json()).unwrap_or_default();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "progress",
                "step": 2,
                "total": 5,
                "message": "Analyzing... step 2/5",
            })
        );
    }

    #[test]
    fn final_and_error_are_terminal() {
        assert!(ServerEvent::Final { result: String::new() }.is_terminal());
        assert!(ServerEvent::error("x").is_terminal());
        assert!(!ServerEvent::info("x").is_terminal());
        assert_eq!(ServerEvent::info("x").type_str(), "info");
    }

    #[test]
    fn request_serializes_as_text_object() {
        assert_eq!(AnalyzeRequest::new("hi").to_json(), r#"{"text":"hi"}"#);
    }
}
