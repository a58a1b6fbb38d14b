//! CRUD operations for [`Message`] records of `channels/{id}/messages`.

use huddle_shared::{ChannelId, Message, MessageId, UserId};
use rusqlite::params;

use crate::database::{ts_from_sql, ts_to_sql, Database};
use crate::error::Result;

impl Database {
    pub fn insert_message(&self, channel_id: &ChannelId, message: &Message) -> Result<()> {
        self.conn().execute(
            "INSERT INTO messages (channel_id, id, author_id, content, time, has_thread)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                channel_id.as_str(),
                message.message_id.as_str(),
                message.message_author_id.as_str(),
                message.message_content,
                ts_to_sql(&message.time),
                message.has_thread,
            ],
        )?;
        Ok(())
    }

    /// All messages of a channel, oldest first.
    pub fn list_messages(&self, channel_id: &ChannelId) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, author_id, content, time, has_thread
             FROM messages
             WHERE channel_id = ?1
             ORDER BY time ASC, id ASC",
        )?;

        let rows = stmt.query_map(params![channel_id.as_str()], row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    /// Flag a message as having thread replies.  Returns `true` if the
    /// message exists.
    pub fn mark_has_thread(&self, channel_id: &ChannelId, message_id: &MessageId) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE messages SET has_thread = 1 WHERE channel_id = ?1 AND id = ?2",
            params![channel_id.as_str(), message_id.as_str()],
        )?;
        Ok(affected > 0)
    }

    pub fn delete_message(&self, channel_id: &ChannelId, message_id: &MessageId) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM messages WHERE channel_id = ?1 AND id = ?2",
            params![channel_id.as_str(), message_id.as_str()],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id: String = row.get(0)?;
    let author: String = row.get(1)?;
    let time_str: String = row.get(3)?;

    Ok(Message {
        message_id: MessageId(id),
        message_author_id: UserId(author),
        message_content: row.get(2)?,
        time: ts_from_sql(3, &time_str)?,
        has_thread: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use huddle_shared::ChannelRecord;

    use super::*;

    #[test]
    fn messages_come_back_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("messages.db")).unwrap();
        let channel = ChannelRecord::group("g", "", UserId::from("u1"), vec![UserId::from("u1")]);
        db.upsert_channel(&channel).unwrap();

        let now = Utc::now();
        for (id, offset) in [("late", 10), ("early", 1)] {
            let message = Message {
                message_id: MessageId::from(id),
                message_author_id: UserId::from("u1"),
                message_content: format!("{id} message"),
                time: now + Duration::seconds(offset),
                has_thread: false,
            };
            db.insert_message(&channel.channel_id, &message).unwrap();
        }

        let ids: Vec<String> = db
            .list_messages(&channel.channel_id)
            .unwrap()
            .into_iter()
            .map(|m| m.message_id.0)
            .collect();
        assert_eq!(ids, vec!["early", "late"]);

        assert!(db.mark_has_thread(&channel.channel_id, &MessageId::from("early")).unwrap());
        assert!(db.list_messages(&channel.channel_id).unwrap()[0].has_thread);
        assert!(db.delete_message(&channel.channel_id, &MessageId::from("late")).unwrap());
    }

    #[test]
    fn message_requires_existing_channel() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("messages.db")).unwrap();
        let message = Message {
            message_id: MessageId::new(),
            message_author_id: UserId::from("u1"),
            message_content: "orphan".into(),
            time: Utc::now(),
            has_thread: false,
        };
        assert!(db.insert_message(&ChannelId::from("nope"), &message).is_err());
    }
}
