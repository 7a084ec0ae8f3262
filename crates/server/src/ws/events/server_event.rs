use serde::Serialize;

use crate::models::{Message, MessageId, RoomId, UserId};

// ── Server → Client Events ──

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Message {
        id: MessageId,
        room_id: RoomId,
        sender_id: UserId,
        content: String,
        timestamp: String,
    },
    Unread {
        room_id: RoomId,
        count: i64,
    },
    Read {
        message_id: MessageId,
        read_at: String,
    },
    /// `emoji` is the user's reaction after the toggle, `None` once cleared.
    Reaction {
        message_id: MessageId,
        emoji: Option<String>,
        user_id: UserId,
    },
    Edit {
        message_id: MessageId,
        content: String,
    },
    Delete {
        message_id: MessageId,
    },
    Mention {
        room_id: RoomId,
        message_id: MessageId,
        sender_id: UserId,
        content: String,
    },
    Error {
        message: String,
    },
}

impl From<&Message> for ServerEvent {
    fn from(message: &Message) -> Self {
        ServerEvent::Message {
            id: message.id,
            room_id: message.room_id,
            sender_id: message.sender_id,
            content: message.content.clone(),
            timestamp: message.created_at.clone(),
        }
    }
}
