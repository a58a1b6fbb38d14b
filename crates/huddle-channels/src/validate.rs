//! Direct-message record validation.

use huddle_shared::{ChannelRecord, UserId};
use tracing::warn;

/// Keep every group channel and every well-formed direct message that
/// `current_user` takes part in.
///
/// A direct-message record is well-formed when it lists exactly two
/// non-empty member ids.  Malformed records are dropped with a warning
/// rather than reported as errors: upstream snapshots may be transiently
/// inconsistent.
pub fn filter_valid_channels(channels: &[ChannelRecord], current_user: &UserId) -> Vec<ChannelRecord> {
    channels
        .iter()
        .filter(|channel| {
            if !channel.is_direct_message() {
                return true;
            }

            let members = &channel.channel_members;
            if members.len() != 2 {
                warn!(
                    channel = %channel.channel_id,
                    members = members.len(),
                    "Dropping direct message with wrong member count"
                );
                return false;
            }

            if members.iter().any(UserId::is_empty) {
                warn!(channel = %channel.channel_id, "Dropping direct message with empty member id");
                return false;
            }

            channel.has_member(current_user)
        })
        .cloned()
        .collect()
}

/// Rewrite a one-member direct message into the canonical self-channel
/// form (two identical member ids).
///
/// Returns `true` if the record was changed.
pub fn normalize_self_channel(channel: &mut ChannelRecord) -> bool {
    if !channel.is_direct_message() || channel.channel_members.len() != 1 {
        return false;
    }

    let owner = channel.channel_members[0].clone();
    channel.channel_members.push(owner);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{dm, group, ids, uid};

    #[test]
    fn drops_dm_with_wrong_member_count() {
        let me = uid("u1");
        let channels = vec![
            dm("one", &["u1"]),
            dm("three", &["u1", "u2", "u3"]),
            dm("ok", &["u1", "u2"]),
        ];

        let valid = filter_valid_channels(&channels, &me);
        assert_eq!(ids(&valid), vec!["ok"]);
    }

    #[test]
    fn drops_malformed_even_without_membership() {
        let channels = vec![dm("one", &["u9"]), dm("three", &["u7", "u8", "u9"])];
        assert!(filter_valid_channels(&channels, &uid("u9")).is_empty());
        assert!(filter_valid_channels(&channels, &uid("u1")).is_empty());
    }

    #[test]
    fn drops_dm_with_empty_member_or_foreign_pair() {
        let me = uid("u1");
        let channels = vec![dm("empty", &["u1", ""]), dm("foreign", &["u2", "u3"])];
        assert!(filter_valid_channels(&channels, &me).is_empty());
    }

    #[test]
    fn group_channels_pass_through() {
        let me = uid("u1");
        let channels = vec![group("g0", &[]), group("g1", &["u2", "u3", "u4"])];
        let valid = filter_valid_channels(&channels, &me);
        assert_eq!(ids(&valid), vec!["g0", "g1"]);
    }

    #[test]
    fn normalizes_single_member_self_channel() {
        let mut legacy = dm("self", &["u1"]);
        assert!(normalize_self_channel(&mut legacy));
        assert_eq!(legacy.channel_members, vec![uid("u1"), uid("u1")]);

        // already canonical
        assert!(!normalize_self_channel(&mut legacy));

        let mut channel = group("g", &["u1"]);
        assert!(!normalize_self_channel(&mut channel));
    }
}
