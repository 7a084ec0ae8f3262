use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::db;
use crate::models::{Message, UserId};
use crate::ws::events::ServerEvent;
use crate::AppState;

fn mention_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"@([\p{Hiragana}\p{Katakana}\p{Han}\w.\-]+)").ok())
        .as_ref()
}

/// Distinct `@name` tokens in order of first appearance.
pub(crate) fn mentioned_usernames(content: &str) -> Vec<String> {
    let Some(re) = mention_pattern() else {
        return Vec::new();
    };
    let mut seen = BTreeSet::new();
    re.captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

/// Send `mention` to each mentioned member of the room except the sender.
pub(super) async fn notify(state: &AppState, message: &Message, members: &[UserId]) -> Result<usize, sqlx::Error> {
    let names = mentioned_usernames(&message.content);
    if names.is_empty() {
        return Ok(0);
    }

    let targets: Vec<UserId> = db::users::find_ids_by_usernames(&state.db, &names)
        .await?
        .into_iter()
        .filter(|id| *id != message.sender_id && members.contains(id))
        .collect();

    let event = ServerEvent::Mention {
        room_id: message.room_id,
        message_id: message.id,
        sender_id: message.sender_id,
        content: message.content.clone(),
    };
    Ok(state.gateway.push_many(&targets, &event, None).await)
}
