//! Direct-message pair deduplication.

use std::collections::HashSet;

use huddle_shared::{ChannelRecord, UserId};
use tracing::debug;

/// Identity of a direct-message conversation: its member ids in sorted
/// order, independent of who created the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DmPairKey(Vec<UserId>);

impl DmPairKey {
    pub fn members(&self) -> &[UserId] {
        &self.0
    }
}

impl std::fmt::Display for DmPairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(UserId::as_str).collect();
        f.write_str(&joined.join(":"))
    }
}

/// Dedup key of a direct-message record, or `None` for group channels.
pub fn dm_pair_key(channel: &ChannelRecord) -> Option<DmPairKey> {
    if !channel.is_direct_message() {
        return None;
    }

    let mut members = channel.channel_members.clone();
    members.sort();
    Some(DmPairKey(members))
}

/// Collapse direct-message records that describe the same pair of users.
///
/// The first record seen for a pair wins and input order is otherwise
/// preserved.  Group channels are never considered duplicates.
pub fn remove_duplicate_channels(channels: &[ChannelRecord]) -> Vec<ChannelRecord> {
    let mut seen: HashSet<DmPairKey> = HashSet::new();
    let mut unique = Vec::with_capacity(channels.len());

    for channel in channels {
        match dm_pair_key(channel) {
            Some(key) => {
                if seen.contains(&key) {
                    debug!(channel = %channel.channel_id, pair = %key, "Skipping duplicate direct message");
                    continue;
                }
                seen.insert(key);
                unique.push(channel.clone());
            }
            None => unique.push(channel.clone()),
        }
    }

    unique
}
