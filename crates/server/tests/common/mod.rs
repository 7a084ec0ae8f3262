#![allow(dead_code)]

pub mod ws_helpers;

use axum::Router;
use chrono::{Duration, SecondsFormat, Utc};
use parley_server::{config::Config, db, models::{now_timestamp, RoomId, UserId}, routes, ws, AppState};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use std::sync::Arc;

/// Create an in-memory SQLite pool with schema applied.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");

    db::apply_schema(&pool).await.expect("Failed to apply schema");
    pool
}

/// File-backed database with a real connection pool, for tests that need
/// transactions to actually overlap. Files are removed on drop.
pub struct FileDb {
    pub pool: SqlitePool,
    path: PathBuf,
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub async fn setup_file_db(max_connections: u32) -> FileDb {
    let path = std::env::temp_dir().join(format!("parley-test-{}.db", uuid::Uuid::new_v4()));
    let pool = db::init_pool(path.to_str().unwrap(), max_connections)
        .await
        .expect("Failed to create file-backed pool");
    FileDb { pool, path }
}

pub fn test_config(admin_user_ids: Vec<UserId>) -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        database_path: ":memory:".into(),
        database_max_connections: 1,
        admin_user_ids,
        allowed_origin: None,
    }
}

pub fn create_test_state_with_admins(pool: SqlitePool, admin_user_ids: Vec<UserId>) -> Arc<AppState> {
    Arc::new(AppState {
        db: pool,
        config: test_config(admin_user_ids),
        gateway: Arc::new(ws::gateway::GatewayState::new()),
    })
}

pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    create_test_state_with_admins(pool, Vec::new())
}

/// Build a test Axum app with the given pool.
pub fn create_test_app(pool: SqlitePool) -> Router {
    routes::build_router(create_test_state(pool))
}

/// Create a user with a live 30-day session. Returns (user_id, session_token).
pub async fn create_test_user(pool: &SqlitePool, username: &str) -> (UserId, String) {
    let user_id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (username, created_at) VALUES (?, ?) RETURNING id",
    )
    .bind(username)
    .bind(now_timestamp())
    .fetch_one(pool)
    .await
    .unwrap();

    let token = uuid::Uuid::new_v4().to_string();
    let expires_at = (Utc::now() + Duration::days(30)).to_rfc3339_opts(SecondsFormat::Micros, true);

    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(&expires_at)
        .execute(pool)
        .await
        .unwrap();

    (user_id, token)
}

/// Create a group room containing `members`.
pub async fn create_group_room(pool: &SqlitePool, members: &[UserId]) -> RoomId {
    let room_id = sqlx::query_scalar::<_, RoomId>(
        "INSERT INTO rooms (kind, name, created_at) VALUES ('group', 'test', ?) RETURNING id",
    )
    .bind(now_timestamp())
    .fetch_one(pool)
    .await
    .unwrap();

    for &user_id in members {
        add_member(pool, room_id, user_id).await;
    }
    room_id
}

pub async fn add_member(pool: &SqlitePool, room_id: RoomId, user_id: UserId) {
    sqlx::query("INSERT INTO room_members (room_id, user_id, joined_at) VALUES (?, ?, ?)")
        .bind(room_id)
        .bind(user_id)
        .bind(now_timestamp())
        .execute(pool)
        .await
        .unwrap();
}

pub async fn count_rows(pool: &SqlitePool, sql: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await.unwrap()
}
