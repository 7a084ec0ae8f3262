//! Chat operations shared by the WebSocket router and the HTTP routes.
//!
//! Each operation validates, performs its storage write, then pushes the
//! resulting events. Pushes are best effort and never fail the operation.

mod mentions;
mod reactions;
mod reads;

pub use reactions::toggle_reaction;
pub use reads::{fetch_room_history, mark_read};

use parley_shared::constants::DELETED_MESSAGE_TEXT;
use parley_shared::validation::validate_message_content;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{Message, MessageId, RoomId, UserId};
use crate::ws::events::ServerEvent;
use crate::AppState;

/// Fail unless `user_id` belongs to the room. A missing room is `NotFound`.
pub(crate) async fn require_member(state: &AppState, room_id: RoomId, user_id: UserId) -> AppResult<()> {
    if db::rooms::is_member(&state.db, room_id, user_id).await? {
        return Ok(());
    }
    match db::rooms::get_room(&state.db, room_id).await? {
        Some(_) => Err(AppError::Forbidden("Not a member of this room".into())),
        None => Err(AppError::NotFound("Room")),
    }
}

/// Persist a message, seed its receipts, and deliver it.
///
/// The row and its receipts commit together. After commit every other
/// member gets the `message` event followed by their recomputed badge, and
/// mentioned members get a `mention`. The sender receives neither.
pub async fn send_message(
    state: &AppState,
    sender_id: UserId,
    room_id: RoomId,
    content: &str,
) -> AppResult<Message> {
    validate_message_content(content).map_err(AppError::BadRequest)?;
    require_member(state, room_id, sender_id).await?;

    let mut tx = state.db.begin().await?;
    let message = db::messages::create_message(&mut *tx, room_id, sender_id, content).await?;
    let seeded = db::receipts::seed_receipts(&mut *tx, message.id, room_id, sender_id).await?;
    tx.commit().await?;

    tracing::debug!(message_id = message.id, room_id, sender_id, seeded, "message stored");

    let members = match db::rooms::get_room_members(&state.db, room_id).await {
        Ok(members) => members,
        Err(e) => {
            tracing::error!(room_id, error = %e, "member lookup failed after send");
            return Ok(message);
        }
    };

    state
        .gateway
        .push_many(&members, &ServerEvent::from(&message), Some(sender_id))
        .await;

    for &member in members.iter().filter(|&&m| m != sender_id) {
        push_badge_logged(state, member, room_id).await;
    }

    if let Err(e) = mentions::notify(state, &message, &members).await {
        tracing::error!(message_id = message.id, error = %e, "mention lookup failed");
    }

    Ok(message)
}

/// Load a message and check the caller wrote it.
async fn owned_message(state: &AppState, user_id: UserId, message_id: MessageId) -> AppResult<Message> {
    let message = db::messages::get_message(&state.db, message_id)
        .await?
        .ok_or(AppError::NotFound("Message"))?;
    if message.sender_id != user_id {
        return Err(AppError::Forbidden("Only the sender can change this message".into()));
    }
    Ok(message)
}

pub async fn edit_message(
    state: &AppState,
    user_id: UserId,
    message_id: MessageId,
    content: &str,
) -> AppResult<Message> {
    validate_message_content(content).map_err(AppError::BadRequest)?;
    let existing = owned_message(state, user_id, message_id).await?;
    if existing.deleted_at.is_some() {
        return Err(deleted_edit());
    }

    // A concurrent delete between the check and the update also lands here.
    let message = db::messages::update_content(&state.db, message_id, user_id, content)
        .await?
        .ok_or_else(deleted_edit)?;

    let event = ServerEvent::Edit {
        message_id,
        content: message.content.clone(),
    };
    fan_out_logged(state, message.room_id, &event).await;
    Ok(message)
}

fn deleted_edit() -> AppError {
    AppError::BadRequest("Deleted messages cannot be edited".into())
}

/// Soft delete: the row and its receipts stay, the content becomes the
/// tombstone text and `deleted_at` is stamped. Deleting twice returns the
/// tombstone again without a second `delete` event.
pub async fn delete_message(state: &AppState, user_id: UserId, message_id: MessageId) -> AppResult<Message> {
    let existing = owned_message(state, user_id, message_id).await?;
    if existing.deleted_at.is_some() {
        return Ok(existing);
    }

    match db::messages::soft_delete(&state.db, message_id, user_id, DELETED_MESSAGE_TEXT).await? {
        Some(message) => {
            fan_out_logged(state, message.room_id, &ServerEvent::Delete { message_id }).await;
            Ok(message)
        }
        // Lost a race with another delete of the same message.
        None => owned_message(state, user_id, message_id).await,
    }
}

/// Administrative removal of the row. Receipts cascade, so members whose
/// badge counted this message get a fresh one.
pub async fn hard_delete_message(state: &AppState, admin_id: UserId, message_id: MessageId) -> AppResult<()> {
    if !state.config.is_admin(admin_id) {
        return Err(AppError::Forbidden("Admin access required".into()));
    }

    let message = db::messages::get_message(&state.db, message_id)
        .await?
        .ok_or(AppError::NotFound("Message"))?;
    let members = db::rooms::get_room_members(&state.db, message.room_id).await?;

    if !db::messages::hard_delete(&state.db, message_id).await? {
        return Err(AppError::NotFound("Message"));
    }
    tracing::info!(message_id, room_id = message.room_id, admin_id, "message hard deleted");

    state
        .gateway
        .push_many(&members, &ServerEvent::Delete { message_id }, None)
        .await;
    for &member in members.iter().filter(|&&m| m != message.sender_id) {
        push_badge_logged(state, member, message.room_id).await;
    }
    Ok(())
}

/// Start (or find) the direct room between the caller and `other`.
pub async fn open_direct_room(state: &AppState, user_id: UserId, other: UserId) -> AppResult<RoomId> {
    if other == user_id {
        return Err(AppError::BadRequest("Cannot open a direct room with yourself".into()));
    }
    if !db::users::user_exists(&state.db, other).await? {
        return Err(AppError::NotFound("User"));
    }
    Ok(db::rooms::get_or_create_direct_room(&state.db, user_id, other).await?)
}

pub async fn room_badge(state: &AppState, user_id: UserId, room_id: RoomId) -> AppResult<i64> {
    require_member(state, room_id, user_id).await?;
    Ok(db::receipts::unread_count(&state.db, user_id, room_id).await?)
}

/// Recompute a user's badge for one room and push it if they are online.
/// Returns whether an event was delivered.
pub async fn push_badge(state: &AppState, user_id: UserId, room_id: RoomId) -> Result<bool, sqlx::Error> {
    if !state.gateway.is_online(user_id).await {
        return Ok(false);
    }
    let count = db::receipts::unread_count(&state.db, user_id, room_id).await?;
    Ok(state
        .gateway
        .push(user_id, &ServerEvent::Unread { room_id, count })
        .await)
}

async fn push_badge_logged(state: &AppState, user_id: UserId, room_id: RoomId) {
    if let Err(e) = push_badge(state, user_id, room_id).await {
        tracing::error!(user_id, room_id, error = %e, "badge recompute failed");
    }
}

async fn fan_out_logged(state: &AppState, room_id: RoomId, event: &ServerEvent) {
    if let Err(e) = state.gateway.broadcast_room(&state.db, room_id, event, None).await {
        tracing::error!(room_id, error = %e, "room fanout failed");
    }
}

/// Push a non-zero badge for every room the user belongs to. Runs right after
/// a connection registers.
pub async fn catch_up(state: &AppState, user_id: UserId) -> Result<usize, sqlx::Error> {
    let mut pushed = 0;
    for room_id in db::rooms::list_room_ids_for_user(&state.db, user_id).await? {
        let count = db::receipts::unread_count(&state.db, user_id, room_id).await?;
        if count > 0 && state.gateway.push(user_id, &ServerEvent::Unread { room_id, count }).await {
            pushed += 1;
        }
    }
    Ok(pushed)
}
