use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::chat;
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthUser, EditMessageRequest, MarkReadRequest, Message, MessageId, MessageWithStatus,
    ReadSelector, ReadTransition, RoomId, SendMessageRequest,
};
use crate::AppState;

/// GET /api/rooms/:roomId/messages
///
/// Returns the whole history and marks the room read for the caller.
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(room_id): Path<RoomId>,
) -> AppResult<Json<Vec<MessageWithStatus>>> {
    let history = chat::fetch_room_history(&state, user.id, room_id).await?;
    Ok(Json(history))
}

/// POST /api/messages
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let room_id = match (body.room_id, body.receiver_id) {
        (Some(room_id), None) => room_id,
        (None, Some(receiver_id)) => chat::open_direct_room(&state, user.id, receiver_id).await?,
        _ => {
            return Err(AppError::BadRequest(
                "Provide exactly one of room_id or receiver_id".into(),
            ))
        }
    };

    let message = chat::send_message(&state, user.id, room_id, &body.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /api/messages/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<MarkReadRequest>,
) -> AppResult<Json<Vec<ReadTransition>>> {
    let selector = match (body.room_id, body.message_id) {
        (Some(room_id), None) => ReadSelector::Room(room_id),
        (None, Some(message_id)) => ReadSelector::Message(message_id),
        _ => {
            return Err(AppError::BadRequest(
                "Provide exactly one of room_id or message_id".into(),
            ))
        }
    };

    let transitions = chat::mark_read(&state, user.id, selector).await?;
    Ok(Json(transitions))
}

/// PATCH /api/messages/:messageId
pub async fn edit_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(message_id): Path<MessageId>,
    Json(body): Json<EditMessageRequest>,
) -> AppResult<Json<Message>> {
    let message = chat::edit_message(&state, user.id, message_id, &body.content).await?;
    Ok(Json(message))
}

/// DELETE /api/messages/:messageId
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(message_id): Path<MessageId>,
) -> AppResult<Json<Message>> {
    let message = chat::delete_message(&state, user.id, message_id).await?;
    Ok(Json(message))
}

/// DELETE /api/admin/messages/:messageId
pub async fn hard_delete_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(message_id): Path<MessageId>,
) -> AppResult<StatusCode> {
    chat::hard_delete_message(&state, user.id, message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
