//! Pluggable text transformation that produces the final result.
//!
//! The gateway does not care what the analysis actually computes; it only
//! needs something implementing [`Transform`]. [`TransformKind`] lists the
//! built-in transforms selectable from configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Failure raised by a [`Transform`]. The message is forwarded verbatim to
/// the client inside an error event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransformError(pub String);

impl TransformError {
    /// Creates a new error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Converts request text into the final result string.
pub trait Transform: fmt::Debug + Send + Sync {
    /// Applies the transformation.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] when the input cannot be processed.
    fn apply(&self, text: &str) -> Result<String, TransformError>;
}

/// Built-in transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Unicode uppercase.
    Uppercase,
    /// Unicode lowercase.
    Lowercase,
    /// Characters in reverse order.
    Reverse,
}

impl TransformKind {
    /// Returns the configuration name of this transform.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Reverse => "reverse",
        }
    }

    /// Builds a shareable transform instance.
    #[must_use]
    pub fn build(self) -> Arc<dyn Transform> {
        Arc::new(self)
    }
}

impl Transform for TransformKind {
    fn apply(&self, text: &str) -> Result<String, TransformError> {
        Ok(match self {
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Reverse => text.chars().rev().collect(),
        })
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformKind {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uppercase" | "upper" => Ok(Self::Uppercase),
            "lowercase" | "lower" => Ok(Self::Lowercase),
            "reverse" => Ok(Self::Reverse),
            other => Err(TransformError::new(format!("unknown transform: {other}"))),
        }
    }
}
