use crate::constants::*;

pub fn validate_message_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Message content is required".into());
    }
    if content.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(format!(
            "Message must be at most {} characters",
            MAX_MESSAGE_LENGTH
        ));
    }
    Ok(())
}

/// Reactions are free-text tokens, so only the shape is checked.
pub fn validate_emoji(emoji: &str) -> Result<(), String> {
    if emoji.is_empty() {
        return Err("Emoji is required".into());
    }
    if emoji.chars().count() > MAX_EMOJI_LENGTH {
        return Err(format!("Emoji must be at most {} characters", MAX_EMOJI_LENGTH));
    }
    if emoji.chars().any(char::is_whitespace) {
        return Err("Emoji cannot contain whitespace".into());
    }
    Ok(())
}
