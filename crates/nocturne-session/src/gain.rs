//! Dynamic gain compensation.
//!
//! The device master volume is set to `app_gain = min(1, cap / max(v, ε))`
//! where `v` is the system volume, so that `v × app_gain` never exceeds
//! `cap` however loud the system is set.

use crate::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainCompensation {
    cap: f32,
    floor: f32,
}

impl GainCompensation {
    pub fn new(cap: f32, floor: f32) -> Self {
        Self { cap, floor }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.gain_cap, config.min_system_volume)
    }

    pub fn cap(&self) -> f32 {
        self.cap
    }

    /// App gain for `system_volume`. Out-of-range and NaN volumes are
    /// treated as silence.
    pub fn app_gain(&self, system_volume: f32) -> f32 {
        let volume = if system_volume.is_nan() {
            0.0
        } else {
            system_volume.clamp(0.0, 1.0)
        };

        let mut gain = (self.cap / volume.max(self.floor)).min(1.0);
        // The division can round up by an ulp.
        while gain > 0.0 && volume * gain > self.cap {
            gain = f32::from_bits(gain.to_bits() - 1);
        }
        gain
    }
}

impl Default for GainCompensation {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
