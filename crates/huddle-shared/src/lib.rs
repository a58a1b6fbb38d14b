//! # huddle-shared
//!
//! Data model shared by every huddle crate: user identities, presence
//! records, channel records, messages and thread replies, plus the id
//! newtypes and timing constants the rest of the workspace agrees on.

pub mod constants;
pub mod error;
pub mod models;
pub mod types;

pub use error::ModelError;
pub use models::*;
pub use types::{ChannelId, MessageId, UserId};
