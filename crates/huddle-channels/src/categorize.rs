//! Partitioning of channel snapshots into the sidebar sections.

use huddle_shared::{ChannelId, ChannelRecord, UserId};
use serde::Serialize;

use crate::dedup::remove_duplicate_channels;
use crate::validate::filter_valid_channels;

/// The current user's channels, split by kind.
///
/// Derived from a snapshot on every call; it has no identity of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedChannelSet {
    pub regular_channels: Vec<ChannelRecord>,
    pub direct_message_channels: Vec<ChannelRecord>,
    pub self_channel: Option<ChannelRecord>,
}

impl CategorizedChannelSet {
    /// Look a channel up across all three sections.
    pub fn find(&self, id: &ChannelId) -> Option<&ChannelRecord> {
        find_channel_by_id(
            id,
            &self.regular_channels,
            &self.direct_message_channels,
            self.self_channel.as_ref(),
        )
    }

    pub fn len(&self) -> usize {
        self.regular_channels.len()
            + self.direct_message_channels.len()
            + usize::from(self.self_channel.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A direct message whose only participant is `current_user`.
///
/// Both the canonical two-entry form and the legacy single-entry form are
/// recognised.
pub fn is_self_channel(channel: &ChannelRecord, current_user: &UserId) -> bool {
    if !channel.is_direct_message() {
        return false;
    }

    match channel.channel_members.len() {
        1 => true,
        2 => channel.channel_members.iter().all(|m| m == current_user),
        _ => false,
    }
}

/// Split `channels` into regular channels, direct messages and the
/// self-channel, keeping only records `current_user` is a member of.
///
/// If several self-channels are present the last one wins.
pub fn categorize_channels(channels: &[ChannelRecord], current_user: &UserId) -> CategorizedChannelSet {
    let mut set = CategorizedChannelSet::default();

    for channel in channels {
        if !channel.has_member(current_user) {
            continue;
        }

        if channel.is_direct_message() {
            if is_self_channel(channel, current_user) {
                set.self_channel = Some(channel.clone());
            } else {
                set.direct_message_channels.push(channel.clone());
            }
        } else {
            set.regular_channels.push(channel.clone());
        }
    }

    set
}

/// Validate, deduplicate and categorize in one go.
pub fn prepare_channels(channels: &[ChannelRecord], current_user: &UserId) -> CategorizedChannelSet {
    let valid = filter_valid_channels(channels, current_user);
    let unique = remove_duplicate_channels(&valid);
    categorize_channels(&unique, current_user)
}

/// Search regular channels, then direct messages, then the self-channel.
pub fn find_channel_by_id<'a>(
    id: &ChannelId,
    channels: &'a [ChannelRecord],
    dm_channels: &'a [ChannelRecord],
    self_channel: Option<&'a ChannelRecord>,
) -> Option<&'a ChannelRecord> {
    channels
        .iter()
        .chain(dm_channels.iter())
        .chain(self_channel)
        .find(|c| &c.channel_id == id)
}
