//! Domain records read from the document store and the realtime presence
//! table.
//!
//! Field names serialize in camelCase so records can be exchanged with the
//! hosted backend and the UI layer without a mapping step.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::GUEST_USER_NAME;
use crate::error::ModelError;
use crate::types::{ChannelId, MessageId, UserId};

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// A user's live connectivity / activity status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
    Away,
}

impl PresenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Away => "away",
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresenceStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "away" => Ok(Self::Away),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

/// One entry of the shared `presence/{uid}` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    pub status: PresenceStatus,
    /// Server time of the write that produced this record.
    pub timestamp: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl PresenceRecord {
    /// Build a record stamped with the given server time.
    pub fn stamped(status: PresenceStatus, server_now: DateTime<Utc>) -> Self {
        Self {
            status,
            timestamp: server_now,
            last_seen: server_now,
        }
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Moderator,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::Guest => "guest",
        }
    }
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "guest" => Ok(Self::Guest),
            other => Err(ModelError::UnknownRole(other.to_string())),
        }
    }
}

/// A user profile as stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub uid: UserId,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PresenceStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserIdentity {
    pub fn new(uid: impl Into<UserId>, user_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            user_name: user_name.into(),
            email: email.into(),
            photo_url: String::new(),
            created_at: Utc::now(),
            status: None,
            role: Some(Role::User),
        }
    }

    /// Guest sessions are never surfaced in user search.
    pub fn is_guest(&self) -> bool {
        self.role == Some(Role::Guest) || self.user_name == GUEST_USER_NAME
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelType {
    pub channel: bool,
    pub direct_message: bool,
}

impl ChannelType {
    pub fn group() -> Self {
        Self {
            channel: true,
            direct_message: false,
        }
    }

    pub fn direct_message() -> Self {
        Self {
            channel: false,
            direct_message: true,
        }
    }
}

/// A conversation record: either a group channel or a direct-message pair.
///
/// Direct-message records carry exactly two member ids; a pair of identical
/// ids is the user's self-channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    pub channel_id: ChannelId,
    #[serde(default)]
    pub channel_type: ChannelType,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default)]
    pub channel_description: String,
    pub created_by: UserId,
    #[serde(default)]
    pub channel_members: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChannelRecord {
    /// A new group channel.
    pub fn group(
        name: impl Into<String>,
        description: impl Into<String>,
        created_by: UserId,
        members: Vec<UserId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            channel_id: ChannelId::new(),
            channel_type: ChannelType::group(),
            channel_name: name.into(),
            channel_description: description.into(),
            created_by,
            channel_members: members,
            created_at: now,
            updated_at: now,
        }
    }

    /// A new direct-message channel between `from` and `to`.
    ///
    /// When both ids are equal this is a self-channel, stored in the
    /// canonical two-entry form.
    pub fn direct_message(from: UserId, to: UserId) -> Self {
        let now = Utc::now();
        Self {
            channel_id: ChannelId::new(),
            channel_type: ChannelType::direct_message(),
            channel_name: String::new(),
            channel_description: String::new(),
            created_by: from.clone(),
            channel_members: vec![from, to],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn self_channel(owner: UserId) -> Self {
        Self::direct_message(owner.clone(), owner)
    }

    pub fn is_direct_message(&self) -> bool {
        self.channel_type.direct_message
    }

    pub fn has_member(&self, uid: &UserId) -> bool {
        self.channel_members.iter().any(|m| m == uid)
    }

    /// The first member of a direct-message record that is not `me`.
    pub fn other_member(&self, me: &UserId) -> Option<&UserId> {
        self.channel_members
            .iter()
            .find(|m| *m != me && !m.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A message in `channels/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: MessageId,
    pub message_author_id: UserId,
    #[serde(default)]
    pub message_content: String,
    pub time: DateTime<Utc>,
    /// Set once the message has at least one thread reply.
    #[serde(default)]
    pub has_thread: bool,
}

/// A reply in `channels/{id}/messages/{id}/thread`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadReply {
    pub message_id: MessageId,
    pub message_author_id: UserId,
    #[serde(default)]
    pub message_content: String,
    pub time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_record_decodes_wire_shape() {
        let raw = serde_json::json!({
            "channelId": "c1",
            "channelType": { "channel": false, "directMessage": true },
            "createdBy": "u1",
            "channelMembers": ["u1", "u2"],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });

        let channel: ChannelRecord = serde_json::from_value(raw).unwrap();
        assert!(channel.is_direct_message());
        assert_eq!(channel.channel_name, "");
        assert_eq!(channel.other_member(&UserId::from("u1")), Some(&UserId::from("u2")));
    }

    #[test]
    fn missing_members_normalize_to_empty() {
        let raw = serde_json::json!({
            "channelId": "c2",
            "createdBy": "u1",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });

        let channel: ChannelRecord = serde_json::from_value(raw).unwrap();
        assert!(channel.channel_members.is_empty());
        assert_eq!(channel.channel_type, ChannelType::default());
    }

    #[test]
    fn guest_detection() {
        let mut user = UserIdentity::new("u1", "alice", "alice@example.com");
        assert!(!user.is_guest());

        user.role = Some(Role::Guest);
        assert!(user.is_guest());

        let named = UserIdentity::new("u2", GUEST_USER_NAME, "");
        assert!(named.is_guest());
    }

    #[test]
    fn self_channel_is_canonical_pair() {
        let me = UserId::from("u1");
        let channel = ChannelRecord::self_channel(me.clone());
        assert_eq!(channel.channel_members, vec![me.clone(), me.clone()]);
        assert_eq!(channel.other_member(&me), None);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Away".parse::<PresenceStatus>(), Ok(PresenceStatus::Away));
        assert!("busy".parse::<PresenceStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&PresenceStatus::Online).unwrap(),
            "\"online\""
        );
    }
}
