mod message;
mod room;
mod user;

pub use message::*;
pub use room::*;
pub use user::*;

use chrono::{SecondsFormat, Utc};

pub type UserId = i64;
pub type RoomId = i64;
pub type MessageId = i64;

/// Current time as RFC3339 UTC with fixed microsecond precision, so stored
/// timestamps sort lexically in chronological order.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
