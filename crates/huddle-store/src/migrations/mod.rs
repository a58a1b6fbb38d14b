//! Schema migrations for the replica.
//!
//! The replica mirrors four document collections (users, channels with their
//! ordered member lists, messages, thread replies).  `PRAGMA user_version`
//! records the last step applied; opening a replica applies every later step
//! inside its own transaction, so a half-applied step never bumps the version.

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

type Step = fn(&Connection) -> rusqlite::Result<()>;

/// Ordered migration steps.  A step's version is its position plus one.
const STEPS: &[(&str, Step)] = &[("v001_initial", v001_initial::up)];

/// Schema version a fully migrated replica reports.
pub fn target_version() -> u32 {
    STEPS.len() as u32
}

/// Bring the replica's schema up to [`target_version`].
///
/// A replica written by a newer build (version above the target) is refused
/// rather than read with a schema this build does not know.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let target = target_version();

    if current > target {
        return Err(StoreError::Migration(format!(
            "replica schema v{current} is newer than supported v{target}"
        )));
    }
    if current == target {
        tracing::debug!(version = current, "Replica schema up to date");
        return Ok(());
    }

    for (version, (name, step)) in (1u32..).zip(STEPS.iter()).skip(current as usize) {
        tracing::info!(version, name, "Applying replica migration");

        conn.execute_batch("BEGIN")?;
        let applied = step(conn).and_then(|_| conn.pragma_update(None, "user_version", version));
        match applied {
            Ok(()) => conn.execute_batch("COMMIT")?,
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(StoreError::Migration(format!("{name}: {e}")));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(conn: &Connection) -> u32 {
        conn.pragma_query_value(None, "user_version", |row| row.get(0)).unwrap()
    }

    fn has_table(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn fresh_replica_gets_every_collection() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(version(&conn), target_version());
        for table in ["users", "channels", "channel_members", "messages", "thread_replies"] {
            assert!(has_table(&conn, table), "missing {table}");
        }
    }

    #[test]
    fn migrated_replica_is_left_alone() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn.execute("DROP TABLE thread_replies", []).unwrap();

        run_migrations(&conn).unwrap();
        assert!(!has_table(&conn, "thread_replies"));
    }

    #[test]
    fn newer_replica_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", target_version() + 1).unwrap();

        assert!(matches!(run_migrations(&conn), Err(StoreError::Migration(_))));
        assert!(!has_table(&conn, "users"));
    }
}
