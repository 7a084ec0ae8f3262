use sqlx::SqlitePool;

use super::GatewayState;
use crate::models::{RoomId, UserId};
use crate::ws::events::ServerEvent;

impl GatewayState {
    /// Push an event to one user's live connection.
    ///
    /// Delivery is best effort: an offline user or a closed channel just
    /// drops the event. Returns whether it was handed to a connection.
    pub async fn push(&self, user_id: UserId, event: &ServerEvent) -> bool {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(user_id, error = %e, "failed to serialize event");
                return false;
            }
        };

        let Some(tx) = self.lookup(user_id).await else {
            tracing::debug!(user_id, "user offline, event dropped");
            return false;
        };

        if tx.send(msg).is_err() {
            tracing::debug!(user_id, "connection closed, event dropped");
            return false;
        }
        true
    }

    /// Push one event to each listed user, skipping `exclude`. Returns how many
    /// live connections accepted it.
    pub async fn push_many(&self, user_ids: &[UserId], event: &ServerEvent, exclude: Option<UserId>) -> usize {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize event");
                return 0;
            }
        };

        let clients = self.clients.read().await;
        let mut delivered = 0;
        for &user_id in user_ids {
            if Some(user_id) == exclude {
                continue;
            }
            match clients.get(&user_id) {
                Some(client) if client.tx.send(msg.clone()).is_ok() => delivered += 1,
                Some(_) => tracing::debug!(user_id, "connection closed, event dropped"),
                None => {}
            }
        }
        delivered
    }

    /// Fan an event out to every member of the room.
    ///
    /// Only the membership lookup can fail. Individual pushes are best effort
    /// and a partial fanout is not an error.
    pub async fn broadcast_room(
        &self,
        db: &SqlitePool,
        room_id: RoomId,
        event: &ServerEvent,
        exclude: Option<UserId>,
    ) -> Result<usize, sqlx::Error> {
        let members = crate::db::rooms::get_room_members(db, room_id).await?;
        Ok(self.push_many(&members, event, exclude).await)
    }
}
