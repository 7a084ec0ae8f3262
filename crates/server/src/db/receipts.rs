use std::collections::HashMap;

use sqlx::{Executor, Sqlite, SqlitePool};

use crate::models::{
    now_timestamp, MessageId, ReadSelector, ReadTransition, Receipt, RoomId, UserId,
};

/// Insert an unread receipt for every member of the room except the sender.
///
/// Rows that already exist are left alone, so seeding the same message twice
/// (or concurrently) neither fails nor double counts. Returns the number of
/// rows actually inserted.
pub async fn seed_receipts<'e, E>(
    executor: E,
    message_id: MessageId,
    room_id: RoomId,
    sender_id: UserId,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"INSERT INTO message_reads (message_id, user_id, read_at)
           SELECT ?, user_id, NULL FROM room_members
           WHERE room_id = ? AND user_id != ?
           ON CONFLICT(message_id, user_id) DO NOTHING"#,
    )
    .bind(message_id)
    .bind(room_id)
    .bind(sender_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Flip the reader's matching unread receipts to read and report exactly the
/// rows that changed.
///
/// Only receipts owned by `reader_id` on messages authored by someone else are
/// touched. The `read_at IS NULL` guard makes the update the arbiter under
/// concurrency: a receipt is reported by at most one caller.
pub async fn bulk_mark_read(
    db: &SqlitePool,
    selector: ReadSelector,
    reader_id: UserId,
) -> Result<Vec<ReadTransition>, sqlx::Error> {
    let read_at = now_timestamp();
    let mut tx = db.begin().await?;

    let mut transitions = Vec::new();

    match selector {
        ReadSelector::Message(message_id) => {
            let flipped = sqlx::query_scalar::<_, MessageId>(
                r#"UPDATE message_reads SET read_at = ?
                   WHERE message_id = ? AND user_id = ? AND read_at IS NULL
                     AND EXISTS (
                         SELECT 1 FROM messages m
                         WHERE m.id = message_reads.message_id AND m.sender_id != ?
                     )
                   RETURNING message_id"#,
            )
            .bind(&read_at)
            .bind(message_id)
            .bind(reader_id)
            .bind(reader_id)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(message_id) = flipped {
                if let Some(sender_id) =
                    super::messages::get_sender_of_message(&mut *tx, message_id).await?
                {
                    transitions.push(ReadTransition {
                        message_id,
                        sender_id,
                        read_at: read_at.clone(),
                    });
                }
            }
        }
        ReadSelector::Room(room_id) => {
            let flipped = sqlx::query_scalar::<_, MessageId>(
                r#"UPDATE message_reads SET read_at = ?
                   WHERE user_id = ? AND read_at IS NULL
                     AND message_id IN (
                         SELECT id FROM messages WHERE room_id = ? AND sender_id != ?
                     )
                   RETURNING message_id"#,
            )
            .bind(&read_at)
            .bind(reader_id)
            .bind(room_id)
            .bind(reader_id)
            .fetch_all(&mut *tx)
            .await?;

            if !flipped.is_empty() {
                let sql = format!(
                    "SELECT id, sender_id FROM messages WHERE id IN ({})",
                    super::placeholders(flipped.len())
                );
                let mut query = sqlx::query_as::<_, (MessageId, UserId)>(&sql);
                for id in &flipped {
                    query = query.bind(id);
                }
                let senders: HashMap<MessageId, UserId> =
                    query.fetch_all(&mut *tx).await?.into_iter().collect();

                for message_id in flipped {
                    if let Some(&sender_id) = senders.get(&message_id) {
                        transitions.push(ReadTransition {
                            message_id,
                            sender_id,
                            read_at: read_at.clone(),
                        });
                    }
                }
            }
        }
    }

    tx.commit().await?;

    // RETURNING order is unspecified
    transitions.sort_by_key(|t| t.message_id);
    Ok(transitions)
}

/// Unread receipts the user holds in the room. The user's own messages never
/// count, even if a receipt row exists for them.
pub async fn unread_count(db: &SqlitePool, user_id: UserId, room_id: RoomId) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM message_reads mr
           JOIN messages m ON m.id = mr.message_id
           WHERE mr.user_id = ? AND m.room_id = ?
             AND mr.read_at IS NULL AND m.sender_id != mr.user_id"#,
    )
    .bind(user_id)
    .bind(room_id)
    .fetch_one(db)
    .await
}

pub async fn receipts_for_room(db: &SqlitePool, room_id: RoomId) -> Result<Vec<Receipt>, sqlx::Error> {
    sqlx::query_as::<_, Receipt>(
        r#"SELECT mr.message_id, mr.user_id, mr.read_at, mr.reaction
           FROM message_reads mr
           JOIN messages m ON m.id = mr.message_id
           WHERE m.room_id = ?
           ORDER BY mr.message_id, mr.user_id"#,
    )
    .bind(room_id)
    .fetch_all(db)
    .await
}

/// Toggle the user's reaction on a message in one statement and return the
/// stored reaction afterwards.
///
/// - no receipt row: insert one, already read, carrying `emoji`
/// - row with the same emoji: clear it
/// - row with another or no emoji: set `emoji`
pub async fn toggle_reaction(
    db: &SqlitePool,
    message_id: MessageId,
    user_id: UserId,
    emoji: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<String>>(
        r#"INSERT INTO message_reads (message_id, user_id, read_at, reaction)
           VALUES (?, ?, ?, ?)
           ON CONFLICT(message_id, user_id) DO UPDATE SET
               reaction = CASE
                   WHEN message_reads.reaction = excluded.reaction THEN NULL
                   ELSE excluded.reaction
               END
           RETURNING reaction"#,
    )
    .bind(message_id)
    .bind(user_id)
    .bind(now_timestamp())
    .bind(emoji)
    .fetch_one(db)
    .await
}
