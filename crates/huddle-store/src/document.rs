//! Contract of the hosted document database, as seen by read-only
//! consumers such as search.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use huddle_shared::{ChannelId, ChannelRecord, Message, MessageId, ThreadReply, UserId, UserIdentity};

use crate::database::Database;
use crate::error::{Result, StoreError};

/// Read access to the `users`, `channels`, `channels/{id}/messages` and
/// `channels/{id}/messages/{id}/thread` collections.
///
/// Lists come back in stored order: channels and users by creation time,
/// messages and replies oldest first.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_channels(&self) -> Result<Vec<ChannelRecord>>;

    /// Channels whose member list contains `uid`.
    async fn channels_for_member(&self, uid: &UserId) -> Result<Vec<ChannelRecord>>;

    async fn list_messages(&self, channel_id: &ChannelId) -> Result<Vec<Message>>;

    async fn list_thread_replies(&self, channel_id: &ChannelId, message_id: &MessageId) -> Result<Vec<ThreadReply>>;

    async fn list_users(&self) -> Result<Vec<UserIdentity>>;

    /// A miss is `Ok(None)`, not an error.
    async fn get_user(&self, uid: &UserId) -> Result<Option<UserIdentity>>;
}

/// [`DocumentStore`] over the local SQLite replica.
pub struct SqliteDocumentStore {
    db: Mutex<Database>,
}

impl SqliteDocumentStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    /// Direct access for writes (imports, tests).
    pub fn database(&self) -> Result<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("Lock poisoned: {e}")))
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn list_channels(&self) -> Result<Vec<ChannelRecord>> {
        self.database()?.list_channels()
    }

    async fn channels_for_member(&self, uid: &UserId) -> Result<Vec<ChannelRecord>> {
        self.database()?.list_channels_for_member(uid)
    }

    async fn list_messages(&self, channel_id: &ChannelId) -> Result<Vec<Message>> {
        self.database()?.list_messages(channel_id)
    }

    async fn list_thread_replies(&self, channel_id: &ChannelId, message_id: &MessageId) -> Result<Vec<ThreadReply>> {
        self.database()?.list_thread_replies(channel_id, message_id)
    }

    async fn list_users(&self) -> Result<Vec<UserIdentity>> {
        self.database()?.list_users()
    }

    async fn get_user(&self, uid: &UserId) -> Result<Option<UserIdentity>> {
        self.database()?.get_user(uid)
    }
}
