mod server_event;

pub use server_event::ServerEvent;

use serde::Deserialize;

use crate::models::{MessageId, RoomId};

// ── Client → Server Events ──

/// Inbound frame, discriminated by its `type` field.
///
/// The sender is always the authenticated connection owner; any `sender_id`
/// or `read_at` a client includes is ignored.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Message {
        room_id: RoomId,
        content: String,
    },
    Read {
        message_id: MessageId,
    },
    Reaction {
        message_id: MessageId,
        emoji: String,
    },
    Ping,
    #[serde(other)]
    Unknown,
}

impl ClientEvent {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
