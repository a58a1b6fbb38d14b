//! # huddle-search
//!
//! Search over users, channels, messages, direct messages and thread
//! replies.
//!
//! A term may carry a sigil: `#` restricts the search to channels and `@`
//! to users.  Without one, [`SearchAggregator`] fans out to all five
//! categories concurrently.  Each category fails on its own: an error is
//! logged and that category comes back empty while the others still
//! report.

pub mod aggregator;
pub mod error;
pub mod results;
pub mod scope;
pub mod users;

pub use aggregator::SearchAggregator;
pub use error::SearchError;
pub use results::{CategorizedSearchResults, ChannelHit, MessageHit, SearchResult, UserHit};
pub use scope::{parse_term, SearchScope};
pub use users::UserDirectory;
