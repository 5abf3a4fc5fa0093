//! analysis-gateway server entry point.
//!
//! Starts the Axum HTTP server with the `/ws` exchange endpoint.

use tracing_subscriber::EnvFilter;

use analysis_gateway::config::ServerConfig;
use analysis_gateway::server::{build_app, serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;
    tracing::info!(
        addr = %config.listen_addr,
        total_steps = config.analysis.total_steps,
        transform = %config.analysis.transform,
        relay = config.upstream_url.as_deref().unwrap_or("off"),
        "starting analysis-gateway"
    );

    let app = build_app(&config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    serve(listener, app).await?;

    Ok(())
}
