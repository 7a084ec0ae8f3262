use axum::{extract::State, Json};
use std::sync::Arc;

use crate::chat;
use crate::error::AppResult;
use crate::models::{AuthUser, ReactionRequest, ReactionResponse};
use crate::AppState;

/// POST /api/reactions
pub async fn toggle_reaction(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<ReactionRequest>,
) -> AppResult<Json<ReactionResponse>> {
    let emoji = chat::toggle_reaction(&state, user.id, body.message_id, &body.emoji).await?;
    Ok(Json(ReactionResponse {
        message_id: body.message_id,
        emoji,
    }))
}
