#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use parley_server::{routes, AppState};
use serde_json::Value;
use std::sync::Arc;
use tokio_tungstenite::tungstenite::Message;

pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Start the test app on a random TCP port and return the base URL plus the
/// shared state, so tests can drive operations directly as well.
pub async fn start_server() -> (String, Arc<AppState>) {
    let pool = super::setup_test_db().await;
    start_server_with_state(super::create_test_state(pool)).await
}

pub async fn start_server_with_state(state: Arc<AppState>) -> (String, Arc<AppState>) {
    let app = routes::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base = format!("http://127.0.0.1:{}", addr.port());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    (base, state)
}

pub fn ws_url(base: &str, token: &str) -> String {
    format!("{}/gateway?token={}", base.replace("http://", "ws://"), token)
}

/// Connect a WebSocket with a session token and wait until the server side
/// has registered it.
pub async fn ws_connect(base: &str, token: &str) -> WsStream {
    let (ws, _) = tokio_tungstenite::connect_async(ws_url(base, token)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    ws
}

/// Read next text message parsed as JSON, with timeout.
pub async fn recv_json(ws: &mut WsStream) -> Option<Value> {
    let timeout = tokio::time::timeout(std::time::Duration::from_secs(3), ws.next()).await;
    match timeout {
        Ok(Some(Ok(Message::Text(text)))) => serde_json::from_str(&text).ok(),
        _ => None,
    }
}

/// Drain all pending messages until timeout.
pub async fn drain_messages(ws: &mut WsStream) -> Vec<Value> {
    let mut messages = Vec::new();
    loop {
        let timeout =
            tokio::time::timeout(std::time::Duration::from_millis(200), ws.next()).await;
        match timeout {
            Ok(Some(Ok(Message::Text(text)))) => {
                if let Ok(v) = serde_json::from_str::<Value>(&text) {
                    messages.push(v);
                }
            }
            _ => break,
        }
    }
    messages
}

/// Send a JSON message over WebSocket.
pub async fn send_json(ws: &mut WsStream, value: &Value) {
    ws.send(Message::Text(serde_json::to_string(value).unwrap().into()))
        .await
        .unwrap();
}

pub async fn send_text(ws: &mut WsStream, text: &str) {
    ws.send(Message::Text(text.to_string().into())).await.unwrap();
}
