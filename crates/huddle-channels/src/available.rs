//! Direct-message creation helpers.

use huddle_shared::{ChannelRecord, UserId, UserIdentity};

use crate::categorize::is_self_channel;

/// The existing direct message between `me` and `other`, if any.
///
/// With `me == other` this finds the self-channel.
pub fn find_direct_message_with<'a>(
    me: &UserId,
    other: &UserId,
    dm_channels: &'a [ChannelRecord],
) -> Option<&'a ChannelRecord> {
    dm_channels.iter().filter(|c| c.is_direct_message()).find(|c| {
        if me == other {
            is_self_channel(c, me) && c.has_member(me)
        } else {
            c.has_member(me) && c.has_member(other)
        }
    })
}

/// Users the current user can start a new direct message with: everyone
/// without an existing conversation, so a second record for the same pair
/// is never created.
pub fn get_available_users_for_new_dm(
    users: &[UserIdentity],
    dm_channels: &[ChannelRecord],
    current_user: &UserId,
) -> Vec<UserIdentity> {
    users
        .iter()
        .filter(|user| find_direct_message_with(current_user, &user.uid, dm_channels).is_none())
        .cloned()
        .collect()
}
