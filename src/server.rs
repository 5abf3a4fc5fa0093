//! Router assembly and the listening loop.

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::config::ServerConfig;
use crate::ws::handler::ws_handler;

/// Builds the full application: HTTP routes, `/ws`, tracing and CORS.
pub fn build_app(config: &ServerConfig) -> Router {
    let app = Router::new()
        .merge(api::build_router(config.http_timeout))
        .route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::from_config(config))
}

/// Serves `app` on `listener` until Ctrl+C.
///
/// Connections are independent tasks; a failing exchange never reaches
/// this loop.
///
/// # Errors
///
/// Returns an I/O error if the accept loop fails.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        tracing::info!("received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
