//! CRUD operations for [`UserIdentity`] records.

use huddle_shared::{PresenceStatus, Role, UserId, UserIdentity};
use rusqlite::{params, OptionalExtension};

use crate::database::{parse_column, ts_from_sql, ts_to_sql, Database};
use crate::error::Result;

const USER_COLUMNS: &str = "uid, user_name, email, photo_url, status, role, created_at";

impl Database {
    /// Insert a user or overwrite the stored profile.
    pub fn upsert_user(&self, user: &UserIdentity) -> Result<()> {
        self.conn().execute(
            "INSERT INTO users (uid, user_name, email, photo_url, status, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(uid) DO UPDATE SET
                 user_name = excluded.user_name,
                 email     = excluded.email,
                 photo_url = excluded.photo_url,
                 status    = excluded.status,
                 role      = excluded.role",
            params![
                user.uid.as_str(),
                user.user_name,
                user.email,
                user.photo_url,
                user.status.map(|s| s.as_str()),
                user.role.map(|r| r.as_str()),
                ts_to_sql(&user.created_at),
            ],
        )?;
        Ok(())
    }

    /// Fetch a single user.  A miss is `Ok(None)`.
    pub fn get_user(&self, uid: &UserId) -> Result<Option<UserIdentity>> {
        let user = self
            .conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE uid = ?1"),
                params![uid.as_str()],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// List all users in creation order.
    pub fn list_users(&self) -> Result<Vec<UserIdentity>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, uid ASC"))?;

        let rows = stmt.query_map([], row_to_user)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserIdentity> {
    let uid: String = row.get(0)?;
    let status: Option<String> = row.get(4)?;
    let role: Option<String> = row.get(5)?;
    let created_str: String = row.get(6)?;

    Ok(UserIdentity {
        uid: UserId(uid),
        user_name: row.get(1)?,
        email: row.get(2)?,
        photo_url: row.get(3)?,
        status: status
            .map(|s| parse_column::<PresenceStatus>(4, &s))
            .transpose()?,
        role: role.map(|r| parse_column::<Role>(5, &r)).transpose()?,
        created_at: ts_from_sql(6, &created_str)?,
    })
}
