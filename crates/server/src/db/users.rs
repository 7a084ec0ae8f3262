use sqlx::SqlitePool;

use crate::models::{AuthUser, UserId};

/// Resolve a session token to its user, ignoring expired sessions.
pub async fn find_session_user(
    db: &SqlitePool,
    token: &str,
    now: &str,
) -> Result<Option<AuthUser>, sqlx::Error> {
    let row = sqlx::query_as::<_, (UserId, String)>(
        r#"SELECT u.id, u.username
           FROM sessions s
           JOIN users u ON u.id = s.user_id
           WHERE s.token = ? AND s.expires_at > ?"#,
    )
    .bind(token)
    .bind(now)
    .fetch_optional(db)
    .await?;

    Ok(row.map(|(id, username)| AuthUser { id, username }))
}

/// Look up users by exact username. Unknown names are skipped.
pub async fn find_ids_by_usernames(
    db: &SqlitePool,
    usernames: &[String],
) -> Result<Vec<UserId>, sqlx::Error> {
    if usernames.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT id FROM users WHERE username IN ({})",
        super::placeholders(usernames.len())
    );
    let mut query = sqlx::query_scalar::<_, UserId>(&sql);
    for name in usernames {
        query = query.bind(name);
    }
    query.fetch_all(db).await
}

pub async fn user_exists(db: &SqlitePool, user_id: UserId) -> Result<bool, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(count > 0)
}
