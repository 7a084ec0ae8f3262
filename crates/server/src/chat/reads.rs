use std::collections::{BTreeMap, HashSet};

use super::{push_badge_logged, require_member};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{
    MessageWithStatus, ReactionEntry, ReadSelector, ReadTransition, RoomId, UserId,
};
use crate::ws::events::ServerEvent;
use crate::AppState;

/// Mark the reader's receipts read and tell each affected sender.
///
/// Exactly one `read` event goes out per transitioned message, to that
/// message's sender. The reader then gets their recomputed badge for the
/// room, whether or not anything changed.
pub async fn mark_read(
    state: &AppState,
    reader_id: UserId,
    selector: ReadSelector,
) -> AppResult<Vec<ReadTransition>> {
    let room_id = match selector {
        ReadSelector::Room(room_id) => room_id,
        ReadSelector::Message(message_id) => {
            db::messages::get_message(&state.db, message_id)
                .await?
                .ok_or(AppError::NotFound("Message"))?
                .room_id
        }
    };
    require_member(state, room_id, reader_id).await?;

    let transitions = db::receipts::bulk_mark_read(&state.db, selector, reader_id).await?;

    let mut notified = HashSet::new();
    for t in &transitions {
        if t.sender_id == reader_id || !notified.insert(t.message_id) {
            continue;
        }
        state
            .gateway
            .push(
                t.sender_id,
                &ServerEvent::Read {
                    message_id: t.message_id,
                    read_at: t.read_at.clone(),
                },
            )
            .await;
    }

    if !transitions.is_empty() {
        tracing::debug!(reader_id, room_id, count = transitions.len(), "receipts marked read");
    }

    push_badge_logged(state, reader_id, room_id).await;
    Ok(transitions)
}

/// Full room history for a member. Fetching counts as reading the room.
pub async fn fetch_room_history(
    state: &AppState,
    viewer_id: UserId,
    room_id: RoomId,
) -> AppResult<Vec<MessageWithStatus>> {
    mark_read(state, viewer_id, ReadSelector::Room(room_id)).await?;

    let messages = db::messages::get_messages_by_room(&state.db, room_id).await?;
    let receipts = db::receipts::receipts_for_room(&state.db, room_id).await?;

    let mut by_message: BTreeMap<_, Vec<_>> = BTreeMap::new();
    for receipt in receipts {
        by_message.entry(receipt.message_id).or_default().push(receipt);
    }

    let history = messages
        .into_iter()
        .map(|m| {
            let rows = by_message.remove(&m.id).unwrap_or_default();
            let read_at = rows
                .iter()
                .filter(|r| r.user_id != viewer_id)
                .filter_map(|r| r.read_at.clone())
                .min();
            let reactions = rows
                .into_iter()
                .filter_map(|r| {
                    r.reaction.map(|emoji| ReactionEntry {
                        user_id: r.user_id,
                        emoji,
                    })
                })
                .collect();

            MessageWithStatus {
                id: m.id,
                room_id: m.room_id,
                sender_id: m.sender_id,
                content: m.content,
                timestamp: m.created_at,
                updated_at: m.updated_at,
                read_at,
                reactions,
            }
        })
        .collect();

    Ok(history)
}
