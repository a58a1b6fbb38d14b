use std::str::FromStr;

use crate::error::PresenceError;

/// Environment signals that drive presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    /// Authentication succeeded for the tracked user.
    Login,
    /// The user signed out; caches are about to be cleared.
    Logout,
    ConnectionLost,
    ConnectionRestored,
    Focus,
    Blur,
    VisibilityChanged { visible: bool },
    /// A raw click, keypress, pointer-move, scroll or touch.
    Activity,
    /// The page is being torn down.
    Unload,
}

impl FromStr for PresenceEvent {
    type Err = PresenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "login" => Ok(Self::Login),
            "logout" => Ok(Self::Logout),
            "offline" => Ok(Self::ConnectionLost),
            "online" => Ok(Self::ConnectionRestored),
            "focus" => Ok(Self::Focus),
            "blur" => Ok(Self::Blur),
            "visible" => Ok(Self::VisibilityChanged { visible: true }),
            "hidden" => Ok(Self::VisibilityChanged { visible: false }),
            "activity" | "click" | "keypress" | "mousemove" | "scroll" | "touchstart" => {
                Ok(Self::Activity)
            }
            "unload" | "beforeunload" => Ok(Self::Unload),
            other => Err(PresenceError::UnknownEvent(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_browser_event_names() {
        assert_eq!("offline".parse::<PresenceEvent>(), Ok(PresenceEvent::ConnectionLost));
        assert_eq!(" Hidden ".parse::<PresenceEvent>(), Ok(PresenceEvent::VisibilityChanged { visible: false }));
        assert_eq!("scroll".parse::<PresenceEvent>(), Ok(PresenceEvent::Activity));
        assert_eq!("beforeunload".parse::<PresenceEvent>(), Ok(PresenceEvent::Unload));
        assert_eq!(
            "resize".parse::<PresenceEvent>(),
            Err(PresenceError::UnknownEvent("resize".into()))
        );
    }
}
