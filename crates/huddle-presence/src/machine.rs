//! The presence state machine.
//!
//! [`PresenceMachine`] is pure: it consumes events and the current time and
//! produces [`PresenceCommand`]s.  Every delayed transition is one of five
//! [`Deferred`] timers; [`PresenceMachine::poll`] fires whichever are due,
//! earliest deadline first, so a focus or activity that lands before the
//! away timeout cancels it and never the other way round.

use huddle_shared::PresenceStatus;
use tokio::time::Instant;
use tracing::debug;

use crate::config::PresenceConfig;
use crate::event::PresenceEvent;
use crate::timer::Deferred;

/// Side effects requested by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceCommand {
    /// Upsert `{status, timestamp, lastSeen}` for the tracked user.
    Write(PresenceStatus),
    /// Ask the store to write `offline` on our behalf if this client
    /// disconnects without cleaning up.
    RegisterDisconnectRule,
    CancelDisconnectRule,
    /// Read the current presence once and write `online` if it is `away`.
    ResumeIfAway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Reconnect,
    Focus,
    Visible,
    Activity,
    Away,
}

const TIMERS: [Timer; 5] = [
    Timer::Reconnect,
    Timer::Focus,
    Timer::Visible,
    Timer::Activity,
    Timer::Away,
];

#[derive(Debug, Clone)]
pub struct PresenceMachine {
    config: PresenceConfig,
    signed_in: bool,
    visible: bool,
    reconnect: Deferred,
    focus: Deferred,
    visible_debounce: Deferred,
    activity: Deferred,
    away: Deferred,
}

impl PresenceMachine {
    pub fn new(config: PresenceConfig) -> Self {
        Self {
            config,
            signed_in: false,
            visible: true,
            reconnect: Deferred::new(),
            focus: Deferred::new(),
            visible_debounce: Deferred::new(),
            activity: Deferred::new(),
            away: Deferred::new(),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_away_pending(&self) -> bool {
        self.away.is_pending()
    }

    /// Apply one event.  Events other than `Login` are ignored until a user
    /// has signed in.
    pub fn handle(&mut self, event: PresenceEvent, now: Instant) -> Vec<PresenceCommand> {
        // Visibility is environment state; track it even while signed out.
        if let PresenceEvent::VisibilityChanged { visible } = event {
            self.visible = visible;
        }

        if !self.signed_in && event != PresenceEvent::Login {
            debug!(?event, "Ignoring presence event before sign-in");
            return Vec::new();
        }

        match event {
            PresenceEvent::Login => {
                self.signed_in = true;
                vec![
                    PresenceCommand::Write(PresenceStatus::Online),
                    PresenceCommand::RegisterDisconnectRule,
                ]
            }
            PresenceEvent::Logout => {
                self.cancel_all();
                self.signed_in = false;
                vec![
                    PresenceCommand::Write(PresenceStatus::Offline),
                    PresenceCommand::CancelDisconnectRule,
                ]
            }
            PresenceEvent::Unload => {
                self.cancel_all();
                self.signed_in = false;
                vec![PresenceCommand::Write(PresenceStatus::Offline)]
            }
            PresenceEvent::ConnectionLost => {
                // no pending `online` may land after the `offline`
                self.reconnect.cancel();
                self.focus.cancel();
                self.visible_debounce.cancel();
                vec![PresenceCommand::Write(PresenceStatus::Offline)]
            }
            PresenceEvent::ConnectionRestored => {
                self.reconnect.arm(now, self.config.online_debounce);
                Vec::new()
            }
            PresenceEvent::Focus => {
                self.away.cancel();
                self.focus.arm(now, self.config.online_debounce);
                Vec::new()
            }
            PresenceEvent::Blur => {
                self.away.arm(now, self.config.away_after);
                Vec::new()
            }
            PresenceEvent::VisibilityChanged { visible } => {
                if visible {
                    self.visible_debounce.arm(now, self.config.online_debounce);
                }
                Vec::new()
            }
            PresenceEvent::Activity => {
                self.activity.arm(now, self.config.activity_debounce);
                Vec::new()
            }
        }
    }

    /// Fire every timer due at `now`, earliest deadline first.
    pub fn poll(&mut self, now: Instant) -> Vec<PresenceCommand> {
        let mut commands = Vec::new();

        while let Some(timer) = self.earliest_due(now) {
            self.slot(timer).fire();
            if let Some(command) = self.on_fire(timer) {
                commands.push(command);
            }
        }

        commands
    }

    /// The next instant at which [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        TIMERS
            .iter()
            .filter_map(|t| self.slot_ref(*t).deadline())
            .min()
    }

    fn on_fire(&mut self, timer: Timer) -> Option<PresenceCommand> {
        match timer {
            Timer::Reconnect | Timer::Focus => Some(PresenceCommand::Write(PresenceStatus::Online)),
            Timer::Visible => {
                if self.visible {
                    Some(PresenceCommand::Write(PresenceStatus::Online))
                } else {
                    debug!("Tab hidden again before visibility debounce fired");
                    None
                }
            }
            Timer::Activity => {
                self.away.cancel();
                Some(PresenceCommand::ResumeIfAway)
            }
            Timer::Away => {
                if self.visible {
                    debug!("Away timeout expired while tab visible");
                    None
                } else {
                    Some(PresenceCommand::Write(PresenceStatus::Away))
                }
            }
        }
    }

    fn earliest_due(&self, now: Instant) -> Option<Timer> {
        TIMERS
            .iter()
            .copied()
            .filter(|t| self.slot_ref(*t).is_due(now))
            .min_by_key(|t| self.slot_ref(*t).deadline())
    }

    fn cancel_all(&mut self) {
        for timer in TIMERS {
            self.slot(timer).cancel();
        }
    }

    fn slot(&mut self, timer: Timer) -> &mut Deferred {
        match timer {
            Timer::Reconnect => &mut self.reconnect,
            Timer::Focus => &mut self.focus,
            Timer::Visible => &mut self.visible_debounce,
            Timer::Activity => &mut self.activity,
            Timer::Away => &mut self.away,
        }
    }

    fn slot_ref(&self, timer: Timer) -> &Deferred {
        match timer {
            Timer::Reconnect => &self.reconnect,
            Timer::Focus => &self.focus,
            Timer::Visible => &self.visible_debounce,
            Timer::Activity => &self.activity,
            Timer::Away => &self.away,
        }
    }
}

impl Default for PresenceMachine {
    fn default() -> Self {
        Self::new(PresenceConfig::default())
    }
}
