use huddle_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    /// A read against the document store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
