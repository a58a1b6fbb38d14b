//! Read-side presence cache.
//!
//! One subscription to the whole presence table feeds this cache; UI
//! consumers query it by user id instead of opening their own listeners, so
//! the listener count stays constant however many users are displayed.

use std::sync::Arc;

use huddle_shared::{PresenceRecord, PresenceStatus, UserId};
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::PresenceTable;

pub struct PresenceCache {
    entries: RwLock<PresenceTable>,
    /// Bumped on every applied snapshot or clear.
    version: watch::Sender<u64>,
}

impl PresenceCache {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            entries: RwLock::new(PresenceTable::new()),
            version,
        }
    }

    /// Replace the cached table with a fresh snapshot.
    pub async fn apply_snapshot(&self, table: PresenceTable) {
        {
            let mut entries = self.entries.write().await;
            *entries = table;
        }
        self.version.send_modify(|v| *v += 1);
    }

    /// Keep the cache in sync with `rx` until the sender goes away.
    pub fn spawn_sync(self: &Arc<Self>, mut rx: watch::Receiver<PresenceTable>) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let initial = rx.borrow_and_update().clone();
            cache.apply_snapshot(initial).await;

            while rx.changed().await.is_ok() {
                let table = rx.borrow_and_update().clone();
                debug!(entries = table.len(), "Presence snapshot received");
                cache.apply_snapshot(table).await;
            }

            info!("Presence subscription closed");
        })
    }

    /// The user's record, or `None` when presence is unknown.
    pub async fn get(&self, uid: &UserId) -> Option<PresenceRecord> {
        self.entries.read().await.get(uid).cloned()
    }

    pub async fn status_of(&self, uid: &UserId) -> Option<PresenceStatus> {
        self.entries.read().await.get(uid).map(|r| r.status)
    }

    /// Ids of every user currently `online`, sorted.
    pub async fn online_user_ids(&self) -> Vec<UserId> {
        let entries = self.entries.read().await;
        let mut ids: Vec<UserId> = entries
            .iter()
            .filter(|(_, record)| record.status == PresenceStatus::Online)
            .map(|(uid, _)| uid.clone())
            .collect();
        ids.sort();
        ids
    }

    pub async fn online_count(&self) -> usize {
        self.entries
            .read()
            .await
            .values()
            .filter(|r| r.status == PresenceStatus::Online)
            .count()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop everything, e.g. on logout.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        self.version.send_modify(|v| *v += 1);
    }

    /// Change feed for consumers that re-render on updates.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

impl Default for PresenceCache {
    fn default() -> Self {
        Self::new()
    }
}
