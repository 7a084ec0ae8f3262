pub const APP_NAME: &str = "Parley";

// Limits
pub const MAX_MESSAGE_LENGTH: usize = 4000;
pub const MAX_EMOJI_LENGTH: usize = 64;

/// Content written over a message when its sender deletes it.
pub const DELETED_MESSAGE_TEXT: &str = "This message was deleted";
