//! In-memory [`DocumentStore`], with per-collection failure injection.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use huddle_channels::normalize_self_channel;
use huddle_shared::{ChannelId, ChannelRecord, Message, MessageId, ThreadReply, UserId, UserIdentity};
use tokio::sync::RwLock;

use crate::document::DocumentStore;
use crate::error::{Result, StoreError};
use crate::snapshot::Snapshot;

/// A collection of the document database, used to aim injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Channels,
    Messages,
    Threads,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => huddle_shared::constants::USERS_COLLECTION,
            Self::Channels => huddle_shared::constants::CHANNELS_COLLECTION,
            Self::Messages => huddle_shared::constants::MESSAGES_COLLECTION,
            Self::Threads => huddle_shared::constants::THREAD_COLLECTION,
        }
    }
}

#[derive(Default)]
struct Collections {
    users: Vec<UserIdentity>,
    channels: Vec<ChannelRecord>,
    messages: HashMap<ChannelId, Vec<Message>>,
    replies: HashMap<(ChannelId, MessageId), Vec<ThreadReply>>,
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    data: RwLock<Collections>,
    failing: RwLock<HashSet<Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        for user in snapshot.users {
            store.upsert_user(user).await;
        }
        for channel in snapshot.channels {
            store.upsert_channel(channel).await;
        }
        for entry in snapshot.messages {
            store.insert_message(&entry.channel_id, entry.message).await;
        }
        for entry in snapshot.thread_replies {
            store
                .insert_thread_reply(&entry.channel_id, &entry.parent_id, entry.reply)
                .await;
        }
        store
    }

    pub async fn upsert_user(&self, user: UserIdentity) {
        let mut data = self.data.write().await;
        match data.users.iter_mut().find(|u| u.uid == user.uid) {
            Some(existing) => *existing = user,
            None => data.users.push(user),
        }
    }

    pub async fn upsert_channel(&self, mut channel: ChannelRecord) {
        normalize_self_channel(&mut channel);
        let mut data = self.data.write().await;
        match data
            .channels
            .iter_mut()
            .find(|c| c.channel_id == channel.channel_id)
        {
            Some(existing) => *existing = channel,
            None => data.channels.push(channel),
        }
    }

    pub async fn insert_message(&self, channel_id: &ChannelId, message: Message) {
        let mut data = self.data.write().await;
        let messages = data.messages.entry(channel_id.clone()).or_default();
        messages.push(message);
        messages.sort_by(|a, b| a.time.cmp(&b.time));
    }

    /// Append a reply and flag its parent.  Unlike the SQLite replica a
    /// missing parent is tolerated; the reply is simply unreachable.
    pub async fn insert_thread_reply(&self, channel_id: &ChannelId, parent_id: &MessageId, reply: ThreadReply) {
        let mut data = self.data.write().await;

        if let Some(parent) = data
            .messages
            .get_mut(channel_id)
            .and_then(|msgs| msgs.iter_mut().find(|m| &m.message_id == parent_id))
        {
            parent.has_thread = true;
        }

        let replies = data
            .replies
            .entry((channel_id.clone(), parent_id.clone()))
            .or_default();
        replies.push(reply);
        replies.sort_by(|a, b| a.time.cmp(&b.time));
    }

    /// Make every read of `collection` fail until [`Self::heal`] is called.
    pub async fn fail_on(&self, collection: Collection) {
        self.failing.write().await.insert(collection);
    }

    pub async fn heal(&self, collection: Collection) {
        self.failing.write().await.remove(&collection);
    }

    async fn check(&self, collection: Collection) -> Result<()> {
        if self.failing.read().await.contains(&collection) {
            return Err(StoreError::Unavailable(format!(
                "{} query rejected",
                collection.as_str()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_channels(&self) -> Result<Vec<ChannelRecord>> {
        self.check(Collection::Channels).await?;
        Ok(self.data.read().await.channels.clone())
    }

    async fn channels_for_member(&self, uid: &UserId) -> Result<Vec<ChannelRecord>> {
        self.check(Collection::Channels).await?;
        Ok(self
            .data
            .read()
            .await
            .channels
            .iter()
            .filter(|c| c.has_member(uid))
            .cloned()
            .collect())
    }

    async fn list_messages(&self, channel_id: &ChannelId) -> Result<Vec<Message>> {
        self.check(Collection::Messages).await?;
        Ok(self
            .data
            .read()
            .await
            .messages
            .get(channel_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_thread_replies(&self, channel_id: &ChannelId, message_id: &MessageId) -> Result<Vec<ThreadReply>> {
        self.check(Collection::Threads).await?;
        Ok(self
            .data
            .read()
            .await
            .replies
            .get(&(channel_id.clone(), message_id.clone()))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_users(&self) -> Result<Vec<UserIdentity>> {
        self.check(Collection::Users).await?;
        Ok(self.data.read().await.users.clone())
    }

    async fn get_user(&self, uid: &UserId) -> Result<Option<UserIdentity>> {
        self.check(Collection::Users).await?;
        Ok(self
            .data
            .read()
            .await
            .users
            .iter()
            .find(|u| &u.uid == uid)
            .cloned())
    }
}
