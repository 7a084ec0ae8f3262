mod broadcast;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, RwLock};

use crate::models::UserId;

pub type ClientId = u64;

pub struct ConnectedClient {
    pub client_id: ClientId,
    pub tx: mpsc::UnboundedSender<String>,
}

/// Live connection registry: at most one outbound channel per user.
///
/// Every operation takes the single `clients` lock for an O(1) map access.
/// Senders are `mpsc` handles, so pushes from any task are serialized by the
/// channel and drained by the connection's own writer task.
pub struct GatewayState {
    next_id: AtomicU64,
    pub clients: RwLock<HashMap<UserId, ConnectedClient>>,
}

impl Default for GatewayState {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayState {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Install `tx` as the user's only live endpoint and return its id.
    ///
    /// A previous connection for the same user is evicted: its sender is
    /// dropped here, which ends that connection's writer task.
    pub async fn register(&self, user_id: UserId, tx: mpsc::UnboundedSender<String>) -> ClientId {
        let client_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let previous = self
            .clients
            .write()
            .await
            .insert(user_id, ConnectedClient { client_id, tx });

        if let Some(old) = previous {
            tracing::info!(user_id, old_client = old.client_id, client_id, "replaced live connection");
        }
        client_id
    }

    /// Remove the user's entry only if it still belongs to `client_id`.
    ///
    /// A connection that was already replaced must not evict its successor.
    pub async fn unregister(&self, user_id: UserId, client_id: ClientId) -> bool {
        let mut clients = self.clients.write().await;
        match clients.get(&user_id) {
            Some(current) if current.client_id == client_id => {
                clients.remove(&user_id);
                true
            }
            _ => false,
        }
    }

    pub async fn lookup(&self, user_id: UserId) -> Option<mpsc::UnboundedSender<String>> {
        self.clients
            .read()
            .await
            .get(&user_id)
            .map(|client| client.tx.clone())
    }

    pub async fn is_online(&self, user_id: UserId) -> bool {
        self.clients.read().await.contains_key(&user_id)
    }
}
