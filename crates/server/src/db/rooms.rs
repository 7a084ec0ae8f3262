use sqlx::SqlitePool;

use crate::models::{direct_key, now_timestamp, Room, RoomId, UserId};

pub async fn get_room(db: &SqlitePool, room_id: RoomId) -> Result<Option<Room>, sqlx::Error> {
    sqlx::query_as::<_, Room>("SELECT id, kind, name, created_at FROM rooms WHERE id = ?")
        .bind(room_id)
        .fetch_optional(db)
        .await
}

pub async fn get_room_members(db: &SqlitePool, room_id: RoomId) -> Result<Vec<UserId>, sqlx::Error> {
    sqlx::query_scalar::<_, UserId>(
        "SELECT user_id FROM room_members WHERE room_id = ? ORDER BY joined_at, user_id",
    )
    .bind(room_id)
    .fetch_all(db)
    .await
}

pub async fn is_member(db: &SqlitePool, room_id: RoomId, user_id: UserId) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM room_members WHERE room_id = ? AND user_id = ?",
    )
    .bind(room_id)
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(count > 0)
}

pub async fn list_room_ids_for_user(db: &SqlitePool, user_id: UserId) -> Result<Vec<RoomId>, sqlx::Error> {
    sqlx::query_scalar::<_, RoomId>("SELECT room_id FROM room_members WHERE user_id = ? ORDER BY room_id")
        .bind(user_id)
        .fetch_all(db)
        .await
}

/// Return the direct room for the pair, creating it on first use.
///
/// Concurrent callers for the same pair converge on one row through the
/// UNIQUE constraint on `direct_key`: the losing insert becomes a no-op and
/// falls through to the lookup.
pub async fn get_or_create_direct_room(
    db: &SqlitePool,
    a: UserId,
    b: UserId,
) -> Result<RoomId, sqlx::Error> {
    let key = direct_key(a, b);
    let now = now_timestamp();

    let mut tx = db.begin().await?;

    let created = sqlx::query_scalar::<_, RoomId>(
        r#"INSERT INTO rooms (kind, direct_key, created_at) VALUES ('direct', ?, ?)
           ON CONFLICT(direct_key) DO NOTHING
           RETURNING id"#,
    )
    .bind(&key)
    .bind(&now)
    .fetch_optional(&mut *tx)
    .await?;

    let room_id = match created {
        Some(room_id) => {
            for user_id in [a, b] {
                sqlx::query(
                    r#"INSERT INTO room_members (room_id, user_id, joined_at) VALUES (?, ?, ?)
                       ON CONFLICT(room_id, user_id) DO NOTHING"#,
                )
                .bind(room_id)
                .bind(user_id)
                .bind(&now)
                .execute(&mut *tx)
                .await?;
            }
            tracing::info!(room_id, a, b, "created direct room");
            room_id
        }
        None => {
            sqlx::query_scalar::<_, RoomId>("SELECT id FROM rooms WHERE direct_key = ?")
                .bind(&key)
                .fetch_one(&mut *tx)
                .await?
        }
    };

    tx.commit().await?;
    Ok(room_id)
}
