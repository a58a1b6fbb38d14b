//! CRUD operations for [`ChannelRecord`] records.

use huddle_channels::normalize_self_channel;
use huddle_shared::{ChannelId, ChannelRecord, ChannelType, UserId};
use rusqlite::params;

use crate::database::{ts_from_sql, ts_to_sql, Database};
use crate::error::Result;

const CHANNEL_COLUMNS: &str =
    "id, is_channel, is_direct_message, name, description, created_by, created_at, updated_at";

impl Database {
    // ------------------------------------------------------------------
    // Create / update
    // ------------------------------------------------------------------

    /// Insert a channel or replace an existing one, member list included.
    ///
    /// One-member direct messages are rewritten into the canonical
    /// self-channel form before they are stored.
    pub fn upsert_channel(&self, channel: &ChannelRecord) -> Result<()> {
        let mut channel = channel.clone();
        if normalize_self_channel(&mut channel) {
            tracing::debug!(channel = %channel.channel_id, "normalized self-channel members");
        }

        let tx = self.conn().unchecked_transaction()?;

        tx.execute(
            "INSERT INTO channels (id, is_channel, is_direct_message, name, description, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 is_channel        = excluded.is_channel,
                 is_direct_message = excluded.is_direct_message,
                 name              = excluded.name,
                 description       = excluded.description,
                 updated_at        = excluded.updated_at",
            params![
                channel.channel_id.as_str(),
                channel.channel_type.channel,
                channel.channel_type.direct_message,
                channel.channel_name,
                channel.channel_description,
                channel.created_by.as_str(),
                ts_to_sql(&channel.created_at),
                ts_to_sql(&channel.updated_at),
            ],
        )?;

        tx.execute(
            "DELETE FROM channel_members WHERE channel_id = ?1",
            params![channel.channel_id.as_str()],
        )?;

        for (position, member) in channel.channel_members.iter().enumerate() {
            tx.execute(
                "INSERT INTO channel_members (channel_id, position, user_id) VALUES (?1, ?2, ?3)",
                params![channel.channel_id.as_str(), position as i64, member.as_str()],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// List all channels in creation order.
    pub fn list_channels(&self) -> Result<Vec<ChannelRecord>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {CHANNEL_COLUMNS}
             FROM channels
             ORDER BY created_at ASC, id ASC"
        ))?;

        let rows = stmt.query_map([], row_to_channel)?;
        self.with_members(rows)
    }

    /// List the channels whose member list contains `uid`.
    pub fn list_channels_for_member(&self, uid: &UserId) -> Result<Vec<ChannelRecord>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {CHANNEL_COLUMNS}
             FROM channels
             WHERE id IN (SELECT channel_id FROM channel_members WHERE user_id = ?1)
             ORDER BY created_at ASC, id ASC"
        ))?;

        let rows = stmt.query_map(params![uid.as_str()], row_to_channel)?;
        self.with_members(rows)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a channel.  Returns `true` if a row was deleted.
    pub fn delete_channel(&self, id: &ChannelId) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM channels WHERE id = ?1", params![id.as_str()])?;
        Ok(affected > 0)
    }

    fn channel_members(&self, id: &ChannelId) -> Result<Vec<UserId>> {
        let mut stmt = self.conn().prepare(
            "SELECT user_id FROM channel_members WHERE channel_id = ?1 ORDER BY position ASC",
        )?;

        let rows = stmt.query_map(params![id.as_str()], |row| row.get::<_, String>(0))?;

        let mut members = Vec::new();
        for row in rows {
            members.push(UserId(row?));
        }
        Ok(members)
    }

    fn with_members<I>(&self, rows: I) -> Result<Vec<ChannelRecord>>
    where
        I: Iterator<Item = rusqlite::Result<ChannelRecord>>,
    {
        let mut channels = Vec::new();
        for row in rows {
            let mut channel = row?;
            channel.channel_members = self.channel_members(&channel.channel_id)?;
            channels.push(channel);
        }
        Ok(channels)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`ChannelRecord`] with an empty member list.
fn row_to_channel(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChannelRecord> {
    let id: String = row.get(0)?;
    let created_by: String = row.get(5)?;
    let created_str: String = row.get(6)?;
    let updated_str: String = row.get(7)?;

    Ok(ChannelRecord {
        channel_id: ChannelId(id),
        channel_type: ChannelType {
            channel: row.get(1)?,
            direct_message: row.get(2)?,
        },
        channel_name: row.get(3)?,
        channel_description: row.get(4)?,
        created_by: UserId(created_by),
        channel_members: Vec::new(),
        created_at: ts_from_sql(6, &created_str)?,
        updated_at: ts_from_sql(7, &updated_str)?,
    })
}
