use crate::chat;
use crate::models::AuthUser;
use crate::ws::gateway::ClientId;
use crate::AppState;

pub async fn send_initial_state(state: &AppState, user: &AuthUser) {
    match chat::catch_up(state, user.id).await {
        Ok(rooms) => tracing::debug!(user_id = user.id, rooms, "pushed unread badges on connect"),
        Err(e) => tracing::error!(user_id = user.id, error = %e, "catch-up failed"),
    }
}

pub async fn handle_disconnect(state: &AppState, user: &AuthUser, client_id: ClientId) {
    if state.gateway.unregister(user.id, client_id).await {
        tracing::info!(user_id = user.id, client_id, "gateway disconnected");
    } else {
        tracing::info!(user_id = user.id, client_id, "replaced connection closed");
    }
}
