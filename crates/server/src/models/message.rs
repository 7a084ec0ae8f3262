use serde::{Deserialize, Serialize};

use super::{MessageId, RoomId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub content: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    /// Set once the sender soft-deletes the message.
    pub deleted_at: Option<String>,
}

/// One (message, user) read/reaction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Receipt {
    pub message_id: MessageId,
    pub user_id: UserId,
    pub read_at: Option<String>,
    pub reaction: Option<String>,
}

/// Which unread receipts a mark-read covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSelector {
    Message(MessageId),
    /// Every unread message in the room authored by someone else.
    Room(RoomId),
}

/// A receipt that flipped from unread to read during one mark-read call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadTransition {
    pub message_id: MessageId,
    pub sender_id: UserId,
    pub read_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactionEntry {
    pub user_id: UserId,
    pub emoji: String,
}

/// A message as returned by the room history fetch.
#[derive(Debug, Serialize)]
pub struct MessageWithStatus {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub content: String,
    pub timestamp: String,
    pub updated_at: Option<String>,
    /// Earliest read by anyone other than the viewer.
    pub read_at: Option<String>,
    pub reactions: Vec<ReactionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub room_id: Option<RoomId>,
    pub receiver_id: Option<UserId>,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct EditMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub room_id: Option<RoomId>,
    pub message_id: Option<MessageId>,
}

#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub message_id: MessageId,
    pub emoji: String,
}

#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub message_id: MessageId,
    pub emoji: Option<String>,
}
