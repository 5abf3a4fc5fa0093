//! analysis-client entry point.
//!
//! Connects to the gateway, asks for one line of text, and prints every
//! event the server sends until the connection closes.

use std::io::BufReader;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use analysis_gateway::client::run_session;
use analysis_gateway::config::ClientConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so they never interleave with event output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    println!("Connecting to {}...", config.ws_url);

    let mut stdout = std::io::stdout();
    let summary = run_session(&config, BufReader::new(std::io::stdin()), &mut stdout)
        .await
        .with_context(|| format!("session with {} failed", config.ws_url))?;

    tracing::debug!(
        received = summary.received,
        completed = summary.final_result.is_some(),
        "session finished"
    );
    Ok(())
}
