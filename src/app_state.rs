//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::{AnalysisSettings, ServerConfig};
use crate::domain::Transform;

/// Read-only state available to all handlers via Axum's `State` extractor.
///
/// Connections copy what they need out of it on upgrade; nothing in here
/// is mutated after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Progress loop settings.
    pub analysis: Arc<AnalysisSettings>,
    /// Transform producing the final result.
    pub transform: Arc<dyn Transform>,
    /// Upstream analysis server for relay mode.
    pub upstream_url: Option<Arc<str>>,
}

impl AppState {
    /// Builds the state from a loaded [`ServerConfig`].
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            analysis: Arc::new(config.analysis.clone()),
            transform: config.analysis.transform.build(),
            upstream_url: config.upstream_url.as_deref().map(Arc::from),
        }
    }
}
