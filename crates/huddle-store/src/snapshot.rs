//! Whole-store snapshots, used to seed the local replica from an export of
//! the hosted collections and to dump it back out.

use huddle_shared::{ChannelId, ChannelRecord, Message, MessageId, ThreadReply, UserIdentity};
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::error::Result;

/// Flattened contents of every collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub users: Vec<UserIdentity>,
    pub channels: Vec<ChannelRecord>,
    pub messages: Vec<SnapshotMessage>,
    pub thread_replies: Vec<SnapshotReply>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMessage {
    pub channel_id: ChannelId,
    #[serde(flatten)]
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotReply {
    pub channel_id: ChannelId,
    pub parent_id: MessageId,
    #[serde(flatten)]
    pub reply: ThreadReply,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.channels.is_empty()
            && self.messages.is_empty()
            && self.thread_replies.is_empty()
    }
}

impl Database {
    /// Load a snapshot.  Users and channels are upserted; messages and
    /// replies are inserted, so importing the same snapshot twice fails on
    /// the first duplicate message.
    pub fn import_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        for user in &snapshot.users {
            self.upsert_user(user)?;
        }
        for channel in &snapshot.channels {
            self.upsert_channel(channel)?;
        }
        for entry in &snapshot.messages {
            self.insert_message(&entry.channel_id, &entry.message)?;
        }
        for entry in &snapshot.thread_replies {
            self.insert_thread_reply(&entry.channel_id, &entry.parent_id, &entry.reply)?;
        }

        tracing::info!(
            users = snapshot.users.len(),
            channels = snapshot.channels.len(),
            messages = snapshot.messages.len(),
            replies = snapshot.thread_replies.len(),
            "snapshot imported"
        );
        Ok(())
    }

    /// Export every collection into a [`Snapshot`].
    pub fn export_snapshot(&self) -> Result<Snapshot> {
        let users = self.list_users()?;
        let channels = self.list_channels()?;

        let mut messages = Vec::new();
        let mut thread_replies = Vec::new();
        for channel in &channels {
            for message in self.list_messages(&channel.channel_id)? {
                if message.has_thread {
                    for reply in self.list_thread_replies(&channel.channel_id, &message.message_id)? {
                        thread_replies.push(SnapshotReply {
                            channel_id: channel.channel_id.clone(),
                            parent_id: message.message_id.clone(),
                            reply,
                        });
                    }
                }
                messages.push(SnapshotMessage {
                    channel_id: channel.channel_id.clone(),
                    message,
                });
            }
        }

        Ok(Snapshot {
            users,
            channels,
            messages,
            thread_replies,
        })
    }
}
