use crate::chat;
use crate::error::{AppError, AppResult};
use crate::models::{AuthUser, MessageId, ReadSelector, RoomId};
use crate::ws::events::ServerEvent;
use crate::AppState;

/// Report a failed event back to the connection that sent it.
async fn report(state: &AppState, user: &AuthUser, action: &str, result: AppResult<()>) {
    let Err(e) = result else { return };
    match &e {
        AppError::Storage(_) => tracing::error!(user_id = user.id, action, error = %e, "event failed"),
        _ => tracing::warn!(user_id = user.id, action, error = %e, "event rejected"),
    }
    state
        .gateway
        .push(user.id, &ServerEvent::Error { message: e.public_message() })
        .await;
}

pub async fn handle_send_message(state: &AppState, user: &AuthUser, room_id: RoomId, content: String) {
    let result = chat::send_message(state, user.id, room_id, &content).await.map(|_| ());
    report(state, user, "message", result).await;
}

pub async fn handle_read(state: &AppState, user: &AuthUser, message_id: MessageId) {
    let result = chat::mark_read(state, user.id, ReadSelector::Message(message_id))
        .await
        .map(|_| ());
    report(state, user, "read", result).await;
}

pub async fn handle_reaction(state: &AppState, user: &AuthUser, message_id: MessageId, emoji: String) {
    let result = chat::toggle_reaction(state, user.id, message_id, &emoji)
        .await
        .map(|_| ());
    report(state, user, "reaction", result).await;
}
