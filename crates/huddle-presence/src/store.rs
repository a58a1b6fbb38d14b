//! Contract of the realtime key-value service holding `presence/{uid}`.

use std::collections::HashMap;

use async_trait::async_trait;
use huddle_shared::{PresenceRecord, PresenceStatus, UserId};
use tokio::sync::watch;

use crate::error::PresenceError;

/// Full contents of the presence table, keyed by user id.
pub type PresenceTable = HashMap<UserId, PresenceRecord>;

#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Upsert the user's record with `timestamp` and `lastSeen` set to the
    /// store's own clock.
    async fn set_status(&self, uid: &UserId, status: PresenceStatus) -> Result<(), PresenceError>;

    /// One-shot read of a single record.  A missing key is `Ok(None)`.
    async fn get(&self, uid: &UserId) -> Result<Option<PresenceRecord>, PresenceError>;

    /// Register a value the store applies by itself if this client goes
    /// away without cleaning up.
    async fn on_disconnect_set(&self, uid: &UserId, status: PresenceStatus) -> Result<(), PresenceError>;

    async fn cancel_on_disconnect(&self, uid: &UserId) -> Result<(), PresenceError>;

    /// Subscribe to the whole presence table.  Each change publishes a
    /// fresh snapshot.
    fn subscribe(&self) -> watch::Receiver<PresenceTable>;
}
