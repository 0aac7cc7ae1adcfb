//! Controller configuration and listener settings.

use crate::{Error, Result};
use nocturne_synth::PresetId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed tuning of the session controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Ceiling for `system_volume × app_gain`.
    pub gain_cap: f32,
    /// System volume floor used when computing the app gain.
    pub min_system_volume: f32,
    /// Period of the control clock that advances fades.
    pub control_tick: Duration,
    /// Fade-out before the engine stops on pause.
    pub pause_fade_secs: f32,
    pub default_stop_fade_secs: f32,
    /// Per-source fade-in on play, and master fade-in on resume.
    pub fade_in_secs: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gain_cap: 0.75,
            min_system_volume: 1e-3,
            control_tick: Duration::from_millis(20),
            pause_fade_secs: 0.5,
            default_stop_fade_secs: 0.5,
            fade_in_secs: 1.0,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.gain_cap > 0.0 && self.gain_cap <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "gain_cap {} out of range (0-1]",
                self.gain_cap
            )));
        }
        if !(self.min_system_volume > 0.0 && self.min_system_volume < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "min_system_volume {} out of range (0-1)",
                self.min_system_volume
            )));
        }
        if self.control_tick.is_zero() {
            return Err(Error::InvalidConfig("control_tick must be non-zero".into()));
        }
        for (name, secs) in [
            ("pause_fade_secs", self.pause_fade_secs),
            ("default_stop_fade_secs", self.default_stop_fade_secs),
            ("fade_in_secs", self.fade_in_secs),
        ] {
            if !(secs >= 0.0 && secs.is_finite()) {
                return Err(Error::InvalidConfig(format!("{name} {secs} must be >= 0")));
            }
        }
        Ok(())
    }
}

/// Listener-facing preferences, persisted by a
/// [`SettingsStore`](crate::SettingsStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Resume after a phone call or other system interruption.
    pub auto_resume_after_interruption: bool,
    /// Resume when a scheduled break ends.
    pub resume_after_break: bool,
    pub last_preset: Option<PresetId>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_resume_after_interruption: true,
            resume_after_break: true,
            last_preset: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.control_tick, Duration::from_millis(20));
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_cap = SessionConfig {
            gain_cap: 1.5,
            ..Default::default()
        };
        assert!(matches!(bad_cap.validate(), Err(Error::InvalidConfig(_))));

        let bad_tick = SessionConfig {
            control_tick: Duration::ZERO,
            ..Default::default()
        };
        assert!(bad_tick.validate().is_err());

        let bad_fade = SessionConfig {
            pause_fade_secs: -1.0,
            ..Default::default()
        };
        assert!(bad_fade.validate().is_err());
    }

    #[test]
    fn test_settings_default_allows_resume() {
        let settings = Settings::default();
        assert!(settings.auto_resume_after_interruption);
        assert!(settings.resume_after_break);
        assert_eq!(settings.last_preset, None);
    }
}
