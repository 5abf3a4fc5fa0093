//! System endpoints: health check and analysis settings.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::TransformKind;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
    /// RFC 3339 timestamp of the response.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
}

/// Analysis settings applied to every `/ws` exchange.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalysisInfo {
    /// Progress events emitted before the final result.
    pub total_steps: u32,
    /// Delay before each progress event, in milliseconds.
    pub step_interval_ms: u64,
    /// Transform producing the final result.
    pub transform: TransformKind,
    /// Upstream URL when `/ws` runs in relay mode.
    pub relay_upstream: Option<String>,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /config/analysis`: Progress loop settings.
#[utoipa::path(
    get,
    path = "/config/analysis",
    tag = "System",
    summary = "Analysis settings",
    description = "Returns the step count, step interval and transform used by the `/ws` exchange.",
    responses(
        (status = 200, description = "Current analysis settings", body = AnalysisInfo),
    )
)]
pub async fn analysis_config_handler(State(state): State<AppState>) -> impl IntoResponse {
    let info = AnalysisInfo {
        total_steps: state.analysis.total_steps,
        step_interval_ms: u64::try_from(state.analysis.step_interval.as_millis())
            .unwrap_or(u64::MAX),
        transform: state.analysis.transform,
        relay_upstream: state.upstream_url.as_deref().map(str::to_string),
    };
    (StatusCode::OK, Json(info))
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/analysis", get(analysis_config_handler))
}
