pub mod messages;
pub mod reactions;
pub mod rooms;

use crate::ws;
use crate::AppState;
use axum::{routing::{delete, get, patch, post}, Router};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Rooms
        .route("/rooms/direct", post(rooms::open_direct_room))
        .route("/rooms/{roomId}/messages", get(messages::list_messages))
        .route("/rooms/{roomId}/unread", get(rooms::get_unread))
        // Messages
        .route("/messages", post(messages::send_message))
        .route("/messages/read", post(messages::mark_read))
        .route("/messages/{messageId}", patch(messages::edit_message))
        .route("/messages/{messageId}", delete(messages::delete_message))
        .route("/admin/messages/{messageId}", delete(messages::hard_delete_message))
        // Reactions
        .route("/reactions", post(reactions::toggle_reaction));

    Router::new()
        .nest("/api", api_routes)
        .route("/gateway", get(ws::handler::ws_handler))
        .with_state(state)
}
