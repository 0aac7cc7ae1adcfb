//! Platform audio-session abstraction.
//!
//! Mobile platforms require the app to activate an audio session with a
//! category before output is allowed. Desktop hosts have no such concept and
//! use [`NullSession`].

use crate::Result;

/// Session categories in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionCategory {
    /// Exclusive background playback.
    Playback,
    /// Mixes with other apps. Used when `Playback` is refused.
    Ambient,
}

pub trait AudioSession: Send {
    fn activate(&mut self, category: SessionCategory) -> Result<()>;
    fn deactivate(&mut self);
    fn is_active(&self) -> bool;
}

/// Always-available session for hosts without session management.
#[derive(Debug, Default)]
pub struct NullSession {
    active: Option<SessionCategory>,
}

impl NullSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> Option<SessionCategory> {
        self.active
    }
}

impl AudioSession for NullSession {
    fn activate(&mut self, category: SessionCategory) -> Result<()> {
        self.active = Some(category);
        Ok(())
    }

    fn deactivate(&mut self) {
        self.active = None;
    }

    fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_session_lifecycle() {
        let mut session = NullSession::new();
        assert!(!session.is_active());
        session.activate(SessionCategory::Playback).unwrap();
        assert_eq!(session.category(), Some(SessionCategory::Playback));
        session.deactivate();
        assert!(!session.is_active());
    }
}
