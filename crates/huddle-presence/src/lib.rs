//! # huddle-presence
//!
//! Client-side presence tracking.
//!
//! Browser-style environment signals (connectivity, focus, visibility,
//! input activity, unload) are fed as [`PresenceEvent`]s into a
//! deterministic [`PresenceMachine`].  The machine owns every debounce and
//! the away timeout as explicit [`Deferred`] timers and answers with
//! [`PresenceCommand`]s; [`spawn_presence`] runs it on a tokio task and
//! carries those commands out against a [`PresenceStore`].
//!
//! The read side is a single [`PresenceCache`] fed from one subscription to
//! the whole presence table.

pub mod cache;
pub mod config;
pub mod driver;
pub mod error;
pub mod event;
pub mod machine;
pub mod memory;
pub mod store;
pub mod timer;

pub use cache::PresenceCache;
pub use config::PresenceConfig;
pub use driver::{spawn_presence, PresenceHandle};
pub use error::PresenceError;
pub use event::PresenceEvent;
pub use machine::{PresenceCommand, PresenceMachine};
pub use memory::MemoryPresenceStore;
pub use store::{PresenceStore, PresenceTable};
pub use timer::{Deferred, DeferredState};
