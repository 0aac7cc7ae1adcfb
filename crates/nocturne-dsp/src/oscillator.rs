//! Sine oscillators evaluated directly from elapsed time.

use nocturne_core::Signal;
use std::f64::consts::TAU;

/// `sin(2π·(frac(f·t) + phase))`.
///
/// The cycle count is wrapped before the multiply by 2π, so precision does
/// not degrade after hours of playback.
#[inline]
pub fn phase_wrapped_sine(freq: f64, t: f64, phase: f64) -> f32 {
    let cycles = (freq * t).rem_euclid(1.0);
    (TAU * (cycles + phase)).sin() as f32
}

/// Fixed-frequency sine. Stateless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineOscillator {
    pub freq: f64,
    pub amplitude: f32,
    /// Phase offset in cycles.
    pub phase: f64,
}

impl SineOscillator {
    pub fn new(freq: f64) -> Self {
        Self {
            freq,
            amplitude: 1.0,
            phase: 0.0,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f32) -> Self {
        self.amplitude = amplitude;
        self
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }
}

impl Signal for SineOscillator {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        phase_wrapped_sine(self.freq, t, self.phase) * self.amplitude
    }
}

/// Integrates a time-varying frequency into a phase in `[0, 1)`.
///
/// Used for sweeps, where `sin(2π·f(t)·t)` would not be continuous.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseAccumulator {
    phase: f64,
}

impl PhaseAccumulator {
    pub fn new(initial_phase: f64) -> Self {
        Self {
            phase: initial_phase.rem_euclid(1.0),
        }
    }

    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Advance by `freq · dt` cycles and return the new phase.
    #[inline]
    pub fn advance(&mut self, freq: f64, dt: f64) -> f64 {
        self.phase = (self.phase + freq * dt).rem_euclid(1.0);
        self.phase
    }

    #[inline]
    pub fn sine(&self) -> f32 {
        (TAU * self.phase).sin() as f32
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quarter_cycle_is_peak() {
        assert_abs_diff_eq!(phase_wrapped_sine(1.0, 0.25, 0.0), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(phase_wrapped_sine(440.0, 0.0, 0.25), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_drift_after_hours() {
        // 8 hours in, a whole number of cycles for 440 Hz.
        let t = 8.0 * 3600.0;
        assert_abs_diff_eq!(phase_wrapped_sine(440.0, t, 0.0), 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(
            phase_wrapped_sine(440.0, t + 1.0 / 1760.0, 0.0),
            1.0,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_oscillator_amplitude() {
        let mut osc = SineOscillator::new(1.0).with_amplitude(0.5);
        assert_abs_diff_eq!(osc.sample(0.25), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_accumulator_wraps() {
        let mut acc = PhaseAccumulator::default();
        for _ in 0..10 {
            acc.advance(100.0, 0.0037);
        }
        assert!((0.0..1.0).contains(&acc.phase()));
        assert_abs_diff_eq!(acc.phase(), (100.0 * 0.037f64).fract(), epsilon = 1e-9);
    }
}
