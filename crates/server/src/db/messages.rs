use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::{now_timestamp, Message, MessageId, RoomId, UserId};

const MESSAGE_COLUMNS: &str = "id, room_id, sender_id, content, created_at, updated_at, deleted_at";

pub async fn create_message<'e, E>(
    executor: E,
    room_id: RoomId,
    sender_id: UserId,
    content: &str,
) -> Result<Message, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Message>(
        r#"INSERT INTO messages (room_id, sender_id, content, created_at)
           VALUES (?, ?, ?, ?)
           RETURNING id, room_id, sender_id, content, created_at, updated_at, deleted_at"#,
    )
    .bind(room_id)
    .bind(sender_id)
    .bind(content.to_owned())
    .bind(now_timestamp())
    .fetch_one(executor)
    .await
}

pub async fn get_message(db: &SqlitePool, message_id: MessageId) -> Result<Option<Message>, sqlx::Error> {
    let sql = format!("SELECT {} FROM messages WHERE id = ?", MESSAGE_COLUMNS);
    sqlx::query_as::<_, Message>(&sql)
        .bind(message_id)
        .fetch_optional(db)
        .await
}

/// Full room history, oldest first.
pub async fn get_messages_by_room(db: &SqlitePool, room_id: RoomId) -> Result<Vec<Message>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM messages WHERE room_id = ? ORDER BY created_at ASC, id ASC",
        MESSAGE_COLUMNS
    );
    sqlx::query_as::<_, Message>(&sql)
        .bind(room_id)
        .fetch_all(db)
        .await
}

pub async fn get_sender_of_message<'e, E>(
    executor: E,
    message_id: MessageId,
) -> Result<Option<UserId>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, UserId>("SELECT sender_id FROM messages WHERE id = ?")
        .bind(message_id)
        .fetch_optional(executor)
        .await
}

/// Replace the content of a live message owned by `sender_id`. Returns the
/// edited row, or `None` when no live message matched.
pub async fn update_content(
    db: &SqlitePool,
    message_id: MessageId,
    sender_id: UserId,
    content: &str,
) -> Result<Option<Message>, sqlx::Error> {
    let sql = format!(
        r#"UPDATE messages SET content = ?, updated_at = ?
           WHERE id = ? AND sender_id = ? AND deleted_at IS NULL
           RETURNING {}"#,
        MESSAGE_COLUMNS
    );
    sqlx::query_as::<_, Message>(&sql)
        .bind(content)
        .bind(now_timestamp())
        .bind(message_id)
        .bind(sender_id)
        .fetch_optional(db)
        .await
}

/// Overwrite a live message with `tombstone` and stamp `deleted_at`.
/// `updated_at` is left alone. Returns `None` when the message is missing,
/// owned by someone else, or already deleted.
pub async fn soft_delete(
    db: &SqlitePool,
    message_id: MessageId,
    sender_id: UserId,
    tombstone: &str,
) -> Result<Option<Message>, sqlx::Error> {
    let sql = format!(
        r#"UPDATE messages SET content = ?, deleted_at = ?
           WHERE id = ? AND sender_id = ? AND deleted_at IS NULL
           RETURNING {}"#,
        MESSAGE_COLUMNS
    );
    sqlx::query_as::<_, Message>(&sql)
        .bind(tombstone)
        .bind(now_timestamp())
        .bind(message_id)
        .bind(sender_id)
        .fetch_optional(db)
        .await
}

/// Remove the row outright. Receipts go with it through the foreign key.
pub async fn hard_delete(db: &SqlitePool, message_id: MessageId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(message_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
