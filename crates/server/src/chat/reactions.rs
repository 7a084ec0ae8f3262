use parley_shared::validation::validate_emoji;

use super::require_member;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{MessageId, UserId};
use crate::ws::events::ServerEvent;
use crate::AppState;

/// Toggle `emoji` on a message for the acting user and return the reaction
/// now stored (`None` when this call cleared it).
///
/// The actor is always notified. The message's sender is notified too when
/// it is someone else.
pub async fn toggle_reaction(
    state: &AppState,
    user_id: UserId,
    message_id: MessageId,
    emoji: &str,
) -> AppResult<Option<String>> {
    validate_emoji(emoji).map_err(AppError::BadRequest)?;

    let message = db::messages::get_message(&state.db, message_id)
        .await?
        .ok_or(AppError::NotFound("Message"))?;
    require_member(state, message.room_id, user_id).await?;

    let stored = db::receipts::toggle_reaction(&state.db, message_id, user_id, emoji).await?;

    let event = ServerEvent::Reaction {
        message_id,
        emoji: stored.clone(),
        user_id,
    };
    state.gateway.push(user_id, &event).await;
    if message.sender_id != user_id {
        state.gateway.push(message.sender_id, &event).await;
    }

    Ok(stored)
}
