//! Deferred actions with explicit idle / pending / fired states.
//!
//! A [`Deferred`] never sleeps by itself: the owner asks it for its
//! deadline and tells it the current time.  That keeps debounce and
//! timeout races testable without a wall clock.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredState {
    Idle,
    Pending { deadline: Instant },
    Fired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    state: DeferredState,
}

impl Deferred {
    pub fn new() -> Self {
        Self {
            state: DeferredState::Idle,
        }
    }

    pub fn state(&self) -> DeferredState {
        self.state
    }

    /// Schedule the action for `now + delay`, replacing any pending
    /// deadline.  Re-arming on every input is what makes this a debounce.
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.state = DeferredState::Pending {
            deadline: now + delay,
        };
    }

    pub fn cancel(&mut self) {
        if self.is_pending() {
            self.state = DeferredState::Idle;
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DeferredState::Pending { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DeferredState::Pending { deadline } => Some(deadline),
            _ => None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| deadline <= now)
    }

    /// Move a pending action to `Fired`.  Returns `false` if nothing was
    /// pending.
    pub fn fire(&mut self) -> bool {
        if self.is_pending() {
            self.state = DeferredState::Fired;
            true
        } else {
            false
        }
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        let start = Instant::now();
        let mut timer = Deferred::new();
        assert_eq!(timer.state(), DeferredState::Idle);
        assert!(!timer.fire());

        timer.arm(start, Duration::from_secs(1));
        assert!(!timer.is_due(start));
        assert!(timer.is_due(start + Duration::from_secs(1)));

        assert!(timer.fire());
        assert_eq!(timer.state(), DeferredState::Fired);
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn rearm_pushes_deadline() {
        let start = Instant::now();
        let mut timer = Deferred::new();
        timer.arm(start, Duration::from_millis(500));
        timer.arm(start + Duration::from_millis(400), Duration::from_millis(500));

        assert!(!timer.is_due(start + Duration::from_millis(600)));
        assert_eq!(timer.deadline(), Some(start + Duration::from_millis(900)));
    }

    #[test]
    fn cancel_returns_to_idle() {
        let start = Instant::now();
        let mut timer = Deferred::new();
        timer.arm(start, Duration::from_secs(30));
        timer.cancel();
        assert_eq!(timer.state(), DeferredState::Idle);
        assert!(!timer.is_due(start + Duration::from_secs(60)));
    }
}
