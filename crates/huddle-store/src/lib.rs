//! # huddle-store
//!
//! Read access to the hosted document database, behind the
//! [`DocumentStore`] trait.
//!
//! Two implementations ship with the crate: [`MemoryDocumentStore`] for
//! tests and embedding, and [`SqliteDocumentStore`], a local SQLite replica
//! of the `users`, `channels`, `messages` and `thread` collections.  The
//! replica wraps a synchronous [`Database`] handle whose typed CRUD helpers
//! live next to each collection's schema.

pub mod channels;
pub mod database;
pub mod document;
pub mod memory;
pub mod messages;
pub mod migrations;
pub mod snapshot;
pub mod threads;
pub mod users;

mod error;

pub use database::Database;
pub use document::{DocumentStore, SqliteDocumentStore};
pub use error::{Result, StoreError};
pub use memory::{Collection, MemoryDocumentStore};
pub use snapshot::{Snapshot, SnapshotMessage, SnapshotReply};
