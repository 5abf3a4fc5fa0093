//! HTTP layer: health and settings endpoints plus their OpenAPI document.

pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::domain::TransformKind;
use crate::ws::messages::{AnalyzeRequest, ServerEvent};

/// OpenAPI document for the HTTP routes and the `/ws` message schemas.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "analysis-gateway"),
    paths(
        handlers::system::health_handler,
        handlers::system::analysis_config_handler,
    ),
    components(schemas(
        handlers::system::HealthResponse,
        handlers::system::AnalysisInfo,
        TransformKind,
        AnalyzeRequest,
        ServerEvent,
    )),
    tags((name = "System", description = "Health and configuration"))
)]
pub struct ApiDoc;

/// Builds the HTTP router. Every route is bounded by `timeout`.
pub fn build_router(timeout: Duration) -> Router<AppState> {
    handlers::routes().layer(request_timeout(timeout))
}

/// Answers `408 Request Timeout` when a handler runs longer than `timeout`.
fn request_timeout(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}
