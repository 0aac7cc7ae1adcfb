//! Session state machine.

use serde::{Deserialize, Serialize};

/// Why playback is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauseReason {
    User,
    /// The route became public (speaker). Only a private route may resume.
    RouteSafety,
    ScheduledBreak,
    SystemInterruption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Playing,
    Paused(PauseReason),
    /// Fading out before teardown.
    Stopping,
}

impl SessionState {
    pub fn is_playing(self) -> bool {
        self == SessionState::Playing
    }

    pub fn pause_reason(self) -> Option<PauseReason> {
        match self {
            SessionState::Paused(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Sources are registered and running.
    Started,
    StopRequested,
    StopFinished,
    Pause(PauseReason),
    Resumed,
    /// Cleanup after a failure or a forced teardown.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Changed(SessionState),
}

#[derive(Debug, Default)]
pub struct SessionFsm {
    state: SessionState,
}

impl SessionFsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transition(&mut self, event: SessionEvent) -> Transition {
        use SessionEvent::*;
        use SessionState::*;

        let next = match (event, self.state) {
            (Started, _) => Some(Playing),

            (StopRequested, Playing) => Some(Stopping),
            (StopRequested, _) => None,

            (StopFinished, Stopping) => Some(Idle),
            (StopFinished, _) => None,

            (Pause(reason), Playing) => Some(Paused(reason)),
            // A pause on top of a pause can only tighten to route safety.
            (Pause(PauseReason::RouteSafety), Paused(current))
                if current != PauseReason::RouteSafety =>
            {
                Some(Paused(PauseReason::RouteSafety))
            }
            (Pause(_), _) => None,

            (Resumed, Paused(_)) => Some(Playing),
            (Resumed, _) => None,

            (Reset, Idle) => None,
            (Reset, _) => Some(Idle),
        };

        match next {
            Some(state) if state != self.state => {
                self.state = state;
                Transition::Changed(state)
            }
            _ => Transition::None,
        }
    }
}
