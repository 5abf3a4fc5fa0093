//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::{ExchangeContext, run_connection};
use super::relay::{RelayContext, run_relay};
use crate::app_state::AppState;
use crate::domain::ProgressPlan;

/// `GET /ws`: Upgrade HTTP connection to WebSocket.
///
/// Runs the exchange locally, or relays it when an upstream is configured.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let request_timeout = state.analysis.request_timeout;

    match state.upstream_url {
        Some(upstream_url) => {
            let ctx = RelayContext {
                upstream_url,
                request_timeout,
            };
            ws.on_upgrade(move |socket| run_relay(socket, ctx))
        }
        None => {
            let ctx = ExchangeContext {
                plan: ProgressPlan::from(state.analysis.as_ref()),
                transform: Arc::clone(&state.transform),
                request_timeout,
            };
            ws.on_upgrade(move |socket| run_connection(socket, ctx))
        }
    }
}
