use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::chat;
use crate::error::AppResult;
use crate::models::{AuthUser, DirectRoomRequest, DirectRoomResponse, RoomId, UnreadResponse};
use crate::AppState;

/// POST /api/rooms/direct
pub async fn open_direct_room(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<DirectRoomRequest>,
) -> AppResult<Json<DirectRoomResponse>> {
    let room_id = chat::open_direct_room(&state, user.id, body.user_id).await?;
    Ok(Json(DirectRoomResponse { room_id }))
}

/// GET /api/rooms/:roomId/unread
pub async fn get_unread(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(room_id): Path<RoomId>,
) -> AppResult<Json<UnreadResponse>> {
    let count = chat::room_badge(&state, user.id, room_id).await?;
    Ok(Json(UnreadResponse { room_id, count }))
}
