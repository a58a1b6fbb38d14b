use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresenceError {
    /// The realtime store rejected a read or write.
    #[error("Presence store error: {0}")]
    Store(String),

    /// The driver task has exited and no longer accepts events.
    #[error("Presence driver stopped")]
    DriverStopped,

    #[error("Unknown presence event: {0}")]
    UnknownEvent(String),
}
