//! Search result records handed to the presentation layer.

use chrono::{DateTime, Utc};
use huddle_shared::{ChannelId, ChannelRecord, MessageId, PresenceStatus, UserId, UserIdentity};
use serde::{Deserialize, Serialize};

/// A user matched by name or email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHit {
    pub uid: UserId,
    pub user_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PresenceStatus>,
}

impl UserHit {
    pub fn new(user: &UserIdentity, status: Option<PresenceStatus>) -> Self {
        Self {
            uid: user.uid.clone(),
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            photo_url: user.photo_url.clone(),
            status,
        }
    }
}

/// A group channel matched by name or description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelHit {
    pub channel_id: ChannelId,
    pub channel_name: String,
    #[serde(default)]
    pub channel_description: String,
    #[serde(default)]
    pub channel_members: Vec<UserId>,
}

impl From<&ChannelRecord> for ChannelHit {
    fn from(channel: &ChannelRecord) -> Self {
        Self {
            channel_id: channel.channel_id.clone(),
            channel_name: channel.channel_name.clone(),
            channel_description: channel.channel_description.clone(),
            channel_members: channel.channel_members.clone(),
        }
    }
}

/// A message, direct message or thread reply whose text matched.
///
/// The direct-message fields are set for hits inside a DM, the reply fields
/// for hits inside a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHit {
    pub message_id: MessageId,
    pub message_author_id: UserId,
    pub message_content: String,
    pub time: DateTime<Utc>,
    pub channel_id: ChannelId,
    #[serde(default)]
    pub channel_name: String,
    /// Author's presence at the time of the search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PresenceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_message_user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_message_user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replied_message_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replier_name: Option<String>,
}

/// Tagged form of a single hit, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SearchResult {
    #[serde(rename = "user")]
    User(UserHit),
    #[serde(rename = "channels")]
    Channels(ChannelHit),
    #[serde(rename = "message")]
    Message(MessageHit),
    /// Any tag this build does not know about.
    #[serde(rename = "other", other)]
    Other,
}

/// Hits grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedSearchResults {
    pub users: Vec<UserHit>,
    pub channels: Vec<ChannelHit>,
    pub messages: Vec<MessageHit>,
    pub direct_messages: Vec<MessageHit>,
    pub threads: Vec<MessageHit>,
}

impl CategorizedSearchResults {
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> usize {
        self.users.len()
            + self.channels.len()
            + self.messages.len()
            + self.direct_messages.len()
            + self.threads.len()
    }

    /// Flatten into tagged results: users, channels, messages, direct
    /// messages, then threads.
    pub fn into_results(self) -> Vec<SearchResult> {
        let mut out = Vec::with_capacity(self.total());
        out.extend(self.users.into_iter().map(SearchResult::User));
        out.extend(self.channels.into_iter().map(SearchResult::Channels));
        out.extend(
            self.messages
                .into_iter()
                .chain(self.direct_messages)
                .chain(self.threads)
                .map(SearchResult::Message),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_shape() {
        let hit = SearchResult::Channels(ChannelHit {
            channel_id: ChannelId::from("c1"),
            channel_name: "general".into(),
            channel_description: String::new(),
            channel_members: vec![],
        });

        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["type"], "channels");
        assert_eq!(json["channelName"], "general");
    }

    #[test]
    fn user_hit_omits_unknown_status() {
        let user = UserIdentity::new("u1", "alice", "a@example.com");
        let json = serde_json::to_value(SearchResult::User(UserHit::new(&user, None))).unwrap();
        assert_eq!(json["type"], "user");
        assert!(json.get("status").is_none());
        assert_eq!(json["photoURL"], "");
    }

    #[test]
    fn unknown_tag_decodes_to_other() {
        let decoded: SearchResult = serde_json::from_str(r#"{"type":"file","name":"x.pdf"}"#).unwrap();
        assert_eq!(decoded, SearchResult::Other);
    }

    #[test]
    fn flatten_keeps_category_order() {
        let user = UserIdentity::new("u1", "alice", "");
        let results = CategorizedSearchResults {
            users: vec![UserHit::new(&user, Some(PresenceStatus::Online))],
            ..Default::default()
        };
        assert_eq!(results.total(), 1);
        assert!(matches!(results.into_results()[0], SearchResult::User(_)));
    }
}
