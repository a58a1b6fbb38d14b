//! v001 -- Initial schema creation.
//!
//! One table per document collection, plus `channel_members` holding each
//! channel's ordered member list.

use rusqlite::Connection;

const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    uid        TEXT PRIMARY KEY NOT NULL,
    user_name  TEXT NOT NULL DEFAULT '',
    email      TEXT NOT NULL DEFAULT '',
    photo_url  TEXT NOT NULL DEFAULT '',
    status     TEXT,                          -- online / offline / away
    role       TEXT,                          -- user / admin / moderator / guest
    created_at TEXT NOT NULL                  -- RFC-3339, UTC, microseconds
);

-- ----------------------------------------------------------------
-- Channels
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS channels (
    id                TEXT PRIMARY KEY NOT NULL,
    is_channel        INTEGER NOT NULL DEFAULT 0,   -- boolean 0/1
    is_direct_message INTEGER NOT NULL DEFAULT 0,   -- boolean 0/1
    name              TEXT NOT NULL DEFAULT '',
    description       TEXT NOT NULL DEFAULT '',
    created_by        TEXT NOT NULL,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS channel_members (
    channel_id TEXT NOT NULL,
    position   INTEGER NOT NULL,              -- preserves member order
    user_id    TEXT NOT NULL,

    PRIMARY KEY (channel_id, position),
    FOREIGN KEY (channel_id) REFERENCES channels(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_channel_members_user ON channel_members(user_id);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    channel_id TEXT NOT NULL,
    id         TEXT NOT NULL,
    author_id  TEXT NOT NULL,
    content    TEXT NOT NULL DEFAULT '',
    time       TEXT NOT NULL,
    has_thread INTEGER NOT NULL DEFAULT 0,    -- boolean 0/1

    PRIMARY KEY (channel_id, id),
    FOREIGN KEY (channel_id) REFERENCES channels(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_channel_time ON messages(channel_id, time ASC);

-- ----------------------------------------------------------------
-- Thread replies
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS thread_replies (
    channel_id TEXT NOT NULL,
    parent_id  TEXT NOT NULL,
    id         TEXT NOT NULL,
    author_id  TEXT NOT NULL,
    content    TEXT NOT NULL DEFAULT '',
    time       TEXT NOT NULL,

    PRIMARY KEY (channel_id, parent_id, id),
    FOREIGN KEY (channel_id, parent_id) REFERENCES messages(channel_id, id) ON DELETE CASCADE
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
