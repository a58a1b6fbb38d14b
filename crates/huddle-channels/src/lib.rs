//! # huddle-channels
//!
//! Pure classification of channel snapshots for the current user.
//!
//! The document store hands back a flat, possibly dirty list of channel
//! records.  This crate drops malformed direct-message records, collapses
//! duplicate direct-message pairs and partitions what is left into group
//! channels, direct messages and the user's self-channel.  Nothing here
//! performs I/O or keeps state between calls.

pub mod available;
pub mod categorize;
pub mod dedup;
pub mod validate;

#[cfg(test)]
pub(crate) mod fixtures;

pub use available::{find_direct_message_with, get_available_users_for_new_dm};
pub use categorize::{
    categorize_channels, find_channel_by_id, is_self_channel, prepare_channels,
    CategorizedChannelSet,
};
pub use dedup::{dm_pair_key, remove_duplicate_channels, DmPairKey};
pub use validate::{filter_valid_channels, normalize_self_channel};
