//! Presence timing configuration.

use std::time::Duration;

use huddle_shared::constants::{ACTIVITY_DEBOUNCE_MS, AWAY_AFTER_SECS, ONLINE_DEBOUNCE_MS};

/// Timings used by the presence state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceConfig {
    /// Quiet period before connectivity-restored, focus and visible
    /// events turn into an `online` write.
    pub online_debounce: Duration,

    /// Quiet period applied to merged click / key / pointer / scroll /
    /// touch activity.
    pub activity_debounce: Duration,

    /// How long a blurred tab must stay hidden before it reports `away`.
    pub away_after: Duration,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            online_debounce: Duration::from_millis(ONLINE_DEBOUNCE_MS),
            activity_debounce: Duration::from_millis(ACTIVITY_DEBOUNCE_MS),
            away_after: Duration::from_secs(AWAY_AFTER_SECS),
        }
    }
}
