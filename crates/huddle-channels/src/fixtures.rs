use chrono::{TimeZone, Utc};
use huddle_shared::{ChannelId, ChannelRecord, ChannelType, UserId};

pub fn uid(s: &str) -> UserId {
    UserId::from(s)
}

fn record(id: &str, channel_type: ChannelType, members: &[&str]) -> ChannelRecord {
    let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    ChannelRecord {
        channel_id: ChannelId::from(id),
        channel_type,
        channel_name: format!("name-{id}"),
        channel_description: String::new(),
        created_by: members.first().map(|m| uid(m)).unwrap_or_default(),
        channel_members: members.iter().map(|m| uid(m)).collect(),
        created_at: ts,
        updated_at: ts,
    }
}

pub fn dm(id: &str, members: &[&str]) -> ChannelRecord {
    record(id, ChannelType::direct_message(), members)
}

pub fn group(id: &str, members: &[&str]) -> ChannelRecord {
    record(id, ChannelType::group(), members)
}

pub fn ids(channels: &[ChannelRecord]) -> Vec<&str> {
    channels.iter().map(|c| c.channel_id.as_str()).collect()
}
