//! In-process presence store.
//!
//! Mirrors the semantics of the hosted realtime database closely enough for
//! tests and the CLI simulator: writes are stamped with the store's clock,
//! subscribers receive whole-table snapshots and a simulated ungraceful
//! [`disconnect`](MemoryPresenceStore::disconnect) applies the registered
//! disconnect rule.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use huddle_shared::{PresenceRecord, PresenceStatus, UserId};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::PresenceError;
use crate::store::{PresenceStore, PresenceTable};

pub struct MemoryPresenceStore {
    table: watch::Sender<PresenceTable>,
    disconnect_rules: Mutex<HashMap<UserId, PresenceStatus>>,
    writes: Mutex<Vec<(UserId, PresenceStatus)>>,
    fail_writes: AtomicBool,
}

impl MemoryPresenceStore {
    pub fn new() -> Self {
        let (table, _) = watch::channel(PresenceTable::new());
        Self {
            table,
            disconnect_rules: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Every successful `set_status` call, in the order applied.
    pub fn write_log(&self) -> Vec<(UserId, PresenceStatus)> {
        lock(&self.writes).clone()
    }

    pub fn snapshot(&self) -> PresenceTable {
        self.table.borrow().clone()
    }

    pub fn disconnect_rule(&self, uid: &UserId) -> Option<PresenceStatus> {
        lock(&self.disconnect_rules).get(uid).copied()
    }

    /// Make subsequent writes fail, as an unreachable backend would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Simulate the client vanishing: apply and consume its disconnect
    /// rule, if any.  Returns the status written.
    pub fn disconnect(&self, uid: &UserId) -> Option<PresenceStatus> {
        let status = lock(&self.disconnect_rules).remove(uid)?;
        info!(key = %uid.presence_key(), %status, "Applying disconnect rule");
        self.apply(uid, status);
        Some(status)
    }

    fn apply(&self, uid: &UserId, status: PresenceStatus) {
        let record = PresenceRecord::stamped(status, Utc::now());
        self.table.send_modify(|table| {
            table.insert(uid.clone(), record);
        });
    }
}

impl Default for MemoryPresenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn set_status(&self, uid: &UserId, status: PresenceStatus) -> Result<(), PresenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PresenceError::Store("write rejected".into()));
        }

        debug!(key = %uid.presence_key(), %status, "Presence write");
        self.apply(uid, status);
        lock(&self.writes).push((uid.clone(), status));
        Ok(())
    }

    async fn get(&self, uid: &UserId) -> Result<Option<PresenceRecord>, PresenceError> {
        Ok(self.table.borrow().get(uid).cloned())
    }

    async fn on_disconnect_set(&self, uid: &UserId, status: PresenceStatus) -> Result<(), PresenceError> {
        lock(&self.disconnect_rules).insert(uid.clone(), status);
        Ok(())
    }

    async fn cancel_on_disconnect(&self, uid: &UserId) -> Result<(), PresenceError> {
        lock(&self.disconnect_rules).remove(uid);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<PresenceTable> {
        self.table.subscribe()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_and_read_back() {
        let store = MemoryPresenceStore::new();
        let uid = UserId::from("u1");

        assert_eq!(store.get(&uid).await.unwrap(), None);

        store.set_status(&uid, PresenceStatus::Online).await.unwrap();
        let record = store.get(&uid).await.unwrap().unwrap();
        assert_eq!(record.status, PresenceStatus::Online);
        assert_eq!(record.timestamp, record.last_seen);
    }

    #[tokio::test]
    async fn disconnect_rule_applies_once() {
        let store = MemoryPresenceStore::new();
        let uid = UserId::from("u1");

        store.set_status(&uid, PresenceStatus::Online).await.unwrap();
        store.on_disconnect_set(&uid, PresenceStatus::Offline).await.unwrap();

        assert_eq!(store.disconnect(&uid), Some(PresenceStatus::Offline));
        assert_eq!(store.snapshot()[&uid].status, PresenceStatus::Offline);
        assert_eq!(store.disconnect(&uid), None);
    }

    #[tokio::test]
    async fn cancelled_rule_does_nothing() {
        let store = MemoryPresenceStore::new();
        let uid = UserId::from("u1");

        store.on_disconnect_set(&uid, PresenceStatus::Offline).await.unwrap();
        store.cancel_on_disconnect(&uid).await.unwrap();
        assert_eq!(store.disconnect(&uid), None);
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn failing_writes_leave_table_untouched() {
        let store = MemoryPresenceStore::new();
        let uid = UserId::from("u1");
        store.set_fail_writes(true);

        assert!(store.set_status(&uid, PresenceStatus::Online).await.is_err());
        assert!(store.write_log().is_empty());
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_snapshots() {
        let store = MemoryPresenceStore::new();
        let mut rx = store.subscribe();

        store.set_status(&UserId::from("u1"), PresenceStatus::Away).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow()[&UserId::from("u1")].status, PresenceStatus::Away);
    }
}
