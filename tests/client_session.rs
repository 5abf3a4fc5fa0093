//! Client session tests against a live gateway and a scripted server.

#![allow(clippy::panic)]

mod common;

use std::io::Cursor;

use analysis_gateway::client::run_session;
use analysis_gateway::client::session::PROMPT;
use analysis_gateway::config::ClientConfig;
use analysis_gateway::error::ClientError;
use axum::Router;
use axum::extract::ws::{Message, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;

use common::{spawn_gateway, spawn_router, test_config, ws_url};

fn console_lines(out: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(out)
        .replace(PROMPT, "")
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn session_prints_progress_final_and_close_notice() {
    let addr = spawn_gateway(test_config(3, None)).await;
    let config = ClientConfig::new(ws_url(addr));

    let mut out = Vec::new();
    let Ok(summary) = run_session(&config, Cursor::new(b"hello\n".to_vec()), &mut out).await
    else {
        panic!("session failed");
    };

    assert_eq!(summary.final_result.as_deref(), Some("HELLO"));
    assert_eq!(summary.received, 4);
    assert_eq!(
        console_lines(&out),
        vec![
            "[Progress] Analyzing... step 1/3 (1/3)",
            "[Progress] Analyzing... step 2/3 (2/3)",
            "[Progress] Analyzing... step 3/3 (3/3)",
            "[Final] HELLO",
            "Connection closed",
        ]
    );
}

#[tokio::test]
async fn empty_line_is_a_valid_request() {
    let addr = spawn_gateway(test_config(3, None)).await;
    let config = ClientConfig::new(ws_url(addr));

    // An empty line is still a valid string request.
    let mut out = Vec::new();
    let Ok(summary) = run_session(&config, Cursor::new(b"\n".to_vec()), &mut out).await else {
        panic!("session failed");
    };
    assert_eq!(summary.final_result.as_deref(), Some(""));
}

#[tokio::test]
async fn input_eof_closes_without_request() {
    let addr = spawn_gateway(test_config(3, None)).await;
    let config = ClientConfig::new(ws_url(addr));

    let mut out = Vec::new();
    let Ok(summary) = run_session(&config, Cursor::new(Vec::new()), &mut out).await else {
        panic!("session failed");
    };
    assert_eq!(summary.received, 0);
    assert!(summary.final_result.is_none());
    let lines = console_lines(&out);
    assert_eq!(lines.last().map(String::as_str), Some("Connection closed"));
}

async fn scripted_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|mut socket| async move {
        // Wait for the request, then misbehave before finishing properly.
        let _ = socket.recv().await;
        let _ = socket.send(Message::text("this is not json")).await;
        let _ = socket
            .send(Message::text(r#"{"type":"heartbeat","seq":1}"#))
            .await;
        let _ = socket
            .send(Message::text(r#"{"type":"final","result":"done"}"#))
            .await;
        let _ = socket.send(Message::Close(None)).await;
    })
}

#[tokio::test]
async fn malformed_frame_is_printed_raw_and_session_continues() {
    let addr = spawn_router(Router::new().route("/ws", get(scripted_handler))).await;
    let config = ClientConfig::new(ws_url(addr));

    let mut out = Vec::new();
    let Ok(summary) = run_session(&config, Cursor::new(b"x\n".to_vec()), &mut out).await else {
        panic!("session failed");
    };

    let lines = console_lines(&out);
    assert_eq!(lines.first().map(String::as_str), Some("[RAW] this is not json"));
    assert!(
        lines
            .get(1)
            .is_some_and(|line| line.starts_with("[Unknown] "))
    );
    assert_eq!(lines.get(2).map(String::as_str), Some("[Final] done"));
    assert_eq!(summary.final_result.as_deref(), Some("done"));
    assert_eq!(summary.received, 3);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_connect_error() {
    let config = ClientConfig::new("ws://127.0.0.1:1/ws");
    let mut out = Vec::new();
    let result = run_session(&config, Cursor::new(b"x\n".to_vec()), &mut out).await;
    assert!(matches!(result, Err(ClientError::Connect { .. })));
    assert!(out.is_empty());
}
