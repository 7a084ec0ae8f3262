use serde::{Deserialize, Serialize};

use super::{RoomId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Room {
    pub id: RoomId,
    pub kind: String,
    pub name: Option<String>,
    pub created_at: String,
}

/// Storage key shared by both orderings of a user pair.
pub fn direct_key(a: UserId, b: UserId) -> String {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    format!("{}:{}", low, high)
}

#[derive(Debug, Deserialize)]
pub struct DirectRoomRequest {
    pub user_id: UserId,
}

#[derive(Debug, Serialize)]
pub struct DirectRoomResponse {
    pub room_id: RoomId,
}

#[derive(Debug, Serialize)]
pub struct UnreadResponse {
    pub room_id: RoomId,
    pub count: i64,
}
