/// Application name
pub const APP_NAME: &str = "huddle";

/// Quiet period before a connectivity-restored, focus or visible event
/// results in an `online` write (milliseconds)
pub const ONLINE_DEBOUNCE_MS: u64 = 1_000;

/// Quiet period applied to merged input activity (milliseconds)
pub const ACTIVITY_DEBOUNCE_MS: u64 = 1_000;

/// Time a blurred, hidden tab waits before reporting `away` (seconds)
pub const AWAY_AFTER_SECS: u64 = 30;

/// Display name reserved for anonymous guest sessions
pub const GUEST_USER_NAME: &str = "Guest";

/// Realtime key-value path holding one presence record per user id
pub const PRESENCE_PATH: &str = "presence";

/// Document store collections
pub const USERS_COLLECTION: &str = "users";
pub const CHANNELS_COLLECTION: &str = "channels";
pub const MESSAGES_COLLECTION: &str = "messages";
pub const THREAD_COLLECTION: &str = "thread";

/// File name of the local SQLite replica
pub const DB_FILE_NAME: &str = "huddle.db";
