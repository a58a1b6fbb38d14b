//! Thread replies of `channels/{id}/messages/{id}/thread`.

use huddle_shared::{ChannelId, MessageId, ThreadReply, UserId};
use rusqlite::params;

use crate::database::{ts_from_sql, ts_to_sql, Database};
use crate::error::{Result, StoreError};

impl Database {
    /// Store a reply and flag its parent message as threaded.
    pub fn insert_thread_reply(
        &self,
        channel_id: &ChannelId,
        parent_id: &MessageId,
        reply: &ThreadReply,
    ) -> Result<()> {
        let tx = self.conn().unchecked_transaction()?;

        let parent_found = tx.execute(
            "UPDATE messages SET has_thread = 1 WHERE channel_id = ?1 AND id = ?2",
            params![channel_id.as_str(), parent_id.as_str()],
        )? > 0;
        if !parent_found {
            return Err(StoreError::NotFound(format!("message {parent_id} in channel {channel_id}")));
        }

        tx.execute(
            "INSERT INTO thread_replies (channel_id, parent_id, id, author_id, content, time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                channel_id.as_str(),
                parent_id.as_str(),
                reply.message_id.as_str(),
                reply.message_author_id.as_str(),
                reply.message_content,
                ts_to_sql(&reply.time),
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Replies to one message, oldest first.
    pub fn list_thread_replies(&self, channel_id: &ChannelId, parent_id: &MessageId) -> Result<Vec<ThreadReply>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, author_id, content, time
             FROM thread_replies
             WHERE channel_id = ?1 AND parent_id = ?2
             ORDER BY time ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![channel_id.as_str(), parent_id.as_str()], |row| {
            let id: String = row.get(0)?;
            let author: String = row.get(1)?;
            let time_str: String = row.get(3)?;
            Ok(ThreadReply {
                message_id: MessageId(id),
                message_author_id: UserId(author),
                message_content: row.get(2)?,
                time: ts_from_sql(3, &time_str)?,
            })
        })?;

        let mut replies = Vec::new();
        for row in rows {
            replies.push(row?);
        }
        Ok(replies)
    }
}
