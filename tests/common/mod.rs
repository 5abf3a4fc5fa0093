//! Shared helpers: spawning gateways on ephemeral ports and collecting
//! the events of one exchange.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use analysis_gateway::config::{AnalysisSettings, ServerConfig};
use analysis_gateway::server::build_app;
use analysis_gateway::ws::messages::ServerEvent;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Server config with a short step interval suitable for tests.
pub fn test_config(total_steps: u32, upstream_url: Option<String>) -> ServerConfig {
    ServerConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        analysis: AnalysisSettings {
            total_steps,
            step_interval: Duration::from_millis(5),
            ..AnalysisSettings::default()
        },
        upstream_url,
        http_timeout: Duration::from_secs(5),
    }
}

/// Serves `app` on an ephemeral local port and returns its address.
pub async fn spawn_router(app: Router) -> SocketAddr {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind test listener");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no local address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Spawns a full gateway built from `config`.
pub async fn spawn_gateway(config: ServerConfig) -> SocketAddr {
    spawn_router(build_app(&config)).await
}

/// `ws://` URL of the exchange endpoint at `addr`.
pub fn ws_url(addr: SocketAddr) -> String {
    format!("ws://{addr}/ws")
}

/// Frames observed by a raw client during one exchange.
#[derive(Debug, Default)]
pub struct Transcript {
    /// Decoded text frames, in arrival order.
    pub events: Vec<ServerEvent>,
    /// Whether the server sent a close frame.
    pub closed_by_server: bool,
}

/// Sends `request` to `url` and records everything until the socket ends.
pub async fn exchange(url: &str, request: &str) -> Transcript {
    let Ok((mut ws, _)) = connect_async(url).await else {
        panic!("failed to connect to {url}");
    };
    let Ok(()) = ws.send(Message::text(request.to_string())).await else {
        panic!("failed to send request");
    };

    let mut transcript = Transcript::default();
    let deadline = tokio::time::sleep(Duration::from_secs(10));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => panic!("exchange did not finish in time"),
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let Ok(event) = serde_json::from_str::<ServerEvent>(text.as_str()) else {
                        panic!("server sent a non-event frame: {text}");
                    };
                    transcript.events.push(event);
                }
                Some(Ok(Message::Close(_))) => transcript.closed_by_server = true,
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            }
        }
    }
    transcript
}

/// Step numbers of the progress events in `events`.
pub fn progress_steps(events: &[ServerEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|event| match event {
            ServerEvent::Progress { step, .. } => Some(*step),
            _ => None,
        })
        .collect()
}
