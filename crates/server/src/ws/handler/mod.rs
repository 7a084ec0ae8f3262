mod chat;
mod lifecycle;

use axum::{
    extract::{ws::{Message, WebSocket}, State, WebSocketUpgrade},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::middleware::auth::{authenticate, token_from_request};
use crate::models::AuthUser;
use crate::ws::events::ClientEvent;
use crate::AppState;

/// WebSocket upgrade handler. Authentication happens before the upgrade, so a
/// rejected client gets a plain 401 and never reaches the registry.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    uri: axum::http::Uri,
    headers: HeaderMap,
) -> Response {
    let token = token_from_request(&headers, &uri);
    match authenticate(&state.db, token.as_deref()).await {
        Ok(user) => ws.on_upgrade(move |socket| handle_socket(socket, state, user)),
        Err(e) => {
            tracing::warn!("rejected gateway connection: {}", e);
            e.into_response()
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user: AuthUser) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let client_id = state.gateway.register(user.id, tx).await;
    tracing::info!(user_id = user.id, username = %user.username, client_id, "gateway connected");

    lifecycle::send_initial_state(&state, &user).await;

    // Sole writer for this socket. Ends when the registry drops our sender,
    // either on disconnect or when a newer connection replaces this one.
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                return;
            }
        }
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    let recv_state = state.clone();
    let recv_user = user.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = ws_rx.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    let text: &str = &text;
                    match ClientEvent::decode(text) {
                        Ok(event) => handle_client_event(&recv_state, &recv_user, event).await,
                        Err(e) => {
                            tracing::warn!(user_id = recv_user.id, error = %e, "malformed client event");
                        }
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(user_id = recv_user.id, error = %e, "socket read failed");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    lifecycle::handle_disconnect(&state, &user, client_id).await;
}

async fn handle_client_event(state: &AppState, user: &AuthUser, event: ClientEvent) {
    match event {
        ClientEvent::Message { room_id, content } => {
            chat::handle_send_message(state, user, room_id, content).await;
        }
        ClientEvent::Read { message_id } => {
            chat::handle_read(state, user, message_id).await;
        }
        ClientEvent::Reaction { message_id, emoji } => {
            chat::handle_reaction(state, user, message_id, emoji).await;
        }
        ClientEvent::Ping => {}
        ClientEvent::Unknown => {
            tracing::warn!(user_id = user.id, "ignoring unknown client event");
        }
    }
}
