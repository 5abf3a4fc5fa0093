//! Gateway and client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Both [`ServerConfig`] and
//! [`ClientConfig`] are built once at startup and passed explicitly into
//! the components that need them.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::TransformKind;

/// Default endpoint the client connects to when `ANALYZER_WS_URL` is unset.
pub const DEFAULT_WS_URL: &str = "ws://localhost:3000/ws";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` is set but is not a valid socket address.
    #[error("invalid LISTEN_ADDR {value:?}: {source}")]
    ListenAddr {
        /// The raw value read from the environment.
        value: String,
        /// Parse failure.
        source: std::net::AddrParseError,
    },

    /// `ANALYSIS_TRANSFORM` names a transform that does not exist.
    #[error("unknown ANALYSIS_TRANSFORM {0:?}")]
    UnknownTransform(String),
}

/// Settings for the progress loop of a single exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Number of progress events emitted before the final result.
    pub total_steps: u32,
    /// Delay before each progress event.
    pub step_interval: Duration,
    /// Which transform produces the final result.
    pub transform: TransformKind,
    /// Upper bound on the wait for the request frame. `None` waits forever.
    pub request_timeout: Option<Duration>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            total_steps: 5,
            step_interval: Duration::from_secs(1),
            transform: TransformKind::Uppercase,
            request_timeout: None,
        }
    }
}

/// Top-level server configuration.
///
/// Loaded once at startup via [`ServerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Progress loop settings shared by every connection.
    pub analysis: AnalysisSettings,

    /// When set, `/ws` relays each exchange to this upstream analysis
    /// server instead of running it locally.
    pub upstream_url: Option<String>,

    /// Request timeout applied to the plain HTTP routes.
    pub http_timeout: Duration,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `LISTEN_ADDR` cannot be parsed as a
    /// [`SocketAddr`] or `ANALYSIS_TRANSFORM` is unknown.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let raw_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let listen_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::ListenAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let defaults = AnalysisSettings::default();
        let transform = match std::env::var("ANALYSIS_TRANSFORM") {
            Ok(name) => name
                .parse::<TransformKind>()
                .map_err(|_| ConfigError::UnknownTransform(name))?,
            Err(_) => defaults.transform,
        };

        let analysis = AnalysisSettings {
            total_steps: parse_env("ANALYSIS_TOTAL_STEPS", defaults.total_steps),
            step_interval: Duration::from_millis(parse_env("ANALYSIS_STEP_INTERVAL_MS", 1_000)),
            transform,
            request_timeout: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
        };

        let upstream_url = std::env::var("UPSTREAM_WS_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Ok(Self {
            listen_addr,
            analysis,
            upstream_url,
            http_timeout: Duration::from_secs(parse_env("HTTP_TIMEOUT_SECS", 10)),
        })
    }
}

/// Console client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket URL of the analysis endpoint.
    pub ws_url: String,
}

impl ClientConfig {
    /// Creates a config pointing at `ws_url`.
    #[must_use]
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
        }
    }

    /// Loads the endpoint from `ANALYZER_WS_URL`, defaulting to
    /// [`DEFAULT_WS_URL`].
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let ws_url = std::env::var("ANALYZER_WS_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WS_URL.to_string());
        Self { ws_url }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WS_URL)
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn analysis_defaults_match_reference_exchange() {
        let settings = AnalysisSettings::default();
        assert_eq!(settings.total_steps, 5);
        assert_eq!(settings.step_interval, Duration::from_secs(1));
        assert_eq!(settings.transform, TransformKind::Uppercase);
        assert!(settings.request_timeout.is_none());
    }

    #[test]
    fn parse_env_falls_back_on_missing_key() {
        let value: u32 = parse_env("ANALYSIS_GATEWAY_TEST_UNSET_KEY", 7);
        assert_eq!(value, 7);
    }

    #[test]
    fn client_default_points_at_local_gateway() {
        assert_eq!(ClientConfig::default().ws_url, "ws://localhost:3000/ws");
    }
}
