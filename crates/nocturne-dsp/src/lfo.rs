//! Low-frequency modulators and the amplitude mapping presets use.
//!
//! Every LFO implements [`Signal`] and produces values in `[-1, 1]`. Use
//! [`ModRange::map`] to turn that into a gain.

use crate::oscillator::{phase_wrapped_sine, PhaseAccumulator};
use nocturne_core::Signal;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Control interval for the drift walk.
const DRIFT_STEP_SECS: f64 = 0.01;

/// Maps an LFO value in `[-1, 1]` onto `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModRange {
    pub min: f32,
    pub max: f32,
}

impl ModRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn map(&self, value: f32) -> f32 {
        let normalized = (value + 1.0) / 2.0;
        self.min + (self.max - self.min) * normalized
    }
}

/// Plain sine LFO.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineLfo {
    pub freq: f64,
    /// Phase offset in cycles.
    pub phase: f64,
}

impl SineLfo {
    pub fn new(freq: f64) -> Self {
        Self { freq, phase: 0.0 }
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }
}

impl Signal for SineLfo {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        phase_wrapped_sine(self.freq, t, self.phase)
    }
}

/// Slow bounded random walk in `[-1, 1]`, reflecting at the bounds.
///
/// A new step is drawn every 10 ms with a size proportional to the elapsed
/// time; output is linearly interpolated between steps.
#[derive(Debug, Clone)]
pub struct DriftLfo {
    rate: f32,
    seed: u64,
    rng: SmallRng,
    from: f32,
    to: f32,
    next_step: f64,
}

impl DriftLfo {
    /// `rate` is the largest change per second of a single step.
    pub fn new(rate: f32, seed: u64) -> Self {
        Self {
            rate,
            seed,
            rng: SmallRng::seed_from_u64(seed),
            from: 0.0,
            to: 0.0,
            next_step: 0.0,
        }
    }

    fn reflect(v: f32) -> f32 {
        let v = if v > 1.0 {
            2.0 - v
        } else if v < -1.0 {
            -2.0 - v
        } else {
            v
        };
        v.clamp(-1.0, 1.0)
    }

    fn step(&mut self) {
        self.from = self.to;
        let delta = self.rng.gen_range(-1.0f32..1.0) * self.rate * DRIFT_STEP_SECS as f32;
        self.to = Self::reflect(self.to + delta);
        self.next_step += DRIFT_STEP_SECS;
    }
}

impl Signal for DriftLfo {
    fn sample(&mut self, t: f64) -> f32 {
        // Skip far ahead without walking every step in between.
        if t - self.next_step > 1.0 {
            self.next_step = t - DRIFT_STEP_SECS;
        }
        while t >= self.next_step {
            self.step();
        }
        let frac = (1.0 - (self.next_step - t) / DRIFT_STEP_SECS).clamp(0.0, 1.0) as f32;
        self.from + (self.to - self.from) * frac
    }

    fn reset(&mut self) {
        *self = Self::new(self.rate, self.seed);
    }
}

/// Sine LFO whose rate wanders by up to `±depth` (relative) under a drift walk.
/// Phase is integrated, so the output never jumps.
#[derive(Debug, Clone)]
pub struct WanderingLfo {
    freq: f64,
    depth: f64,
    drift: DriftLfo,
    phase: PhaseAccumulator,
    last_t: Option<f64>,
}

impl WanderingLfo {
    pub fn new(freq: f64, depth: f64, seed: u64) -> Self {
        Self {
            freq,
            depth,
            drift: DriftLfo::new(1.0, seed),
            phase: PhaseAccumulator::default(),
            last_t: None,
        }
    }
}

impl Signal for WanderingLfo {
    fn sample(&mut self, t: f64) -> f32 {
        let dt = match self.last_t {
            Some(last) if t > last => t - last,
            Some(_) => 0.0,
            None => t,
        };
        self.last_t = Some(t);

        let wander = self.drift.sample(t) as f64;
        self.phase.advance(self.freq * (1.0 + self.depth * wander), dt);
        self.phase.sine()
    }

    fn reset(&mut self) {
        self.drift.reset();
        self.phase.reset();
        self.last_t = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mod_range_mapping() {
        let range = ModRange::new(0.4, 0.8);
        assert_relative_eq!(range.map(-1.0), 0.4);
        assert_relative_eq!(range.map(0.0), 0.6);
        assert_relative_eq!(range.map(1.0), 0.8);
    }

    #[test]
    fn test_drift_stays_bounded_and_smooth() {
        let mut drift = DriftLfo::new(40.0, 9);
        let mut prev = drift.sample(0.0);
        for i in 1..200_000 {
            let v = drift.sample(i as f64 / 1000.0);
            assert!((-1.0..=1.0).contains(&v));
            assert!((v - prev).abs() < 0.5);
            prev = v;
        }
    }

    #[test]
    fn test_drift_is_deterministic() {
        let mut a = DriftLfo::new(1.0, 4);
        let mut b = DriftLfo::new(1.0, 4);
        for i in 0..1000 {
            let t = i as f64 * 0.003;
            assert_eq!(a.sample(t), b.sample(t));
        }
    }

    #[test]
    fn test_wandering_lfo_is_continuous() {
        let mut lfo = WanderingLfo::new(0.5, 0.3, 2);
        let sr = 1000.0;
        let mut prev = lfo.sample(0.0);
        for i in 1..20_000 {
            let v = lfo.sample(i as f64 / sr);
            assert!((-1.0..=1.0).contains(&v));
            // 0.65 Hz max: per-sample change is tiny.
            assert!((v - prev).abs() < 0.01);
            prev = v;
        }
    }

    #[test]
    fn test_sine_lfo() {
        let mut lfo = SineLfo::new(0.25);
        assert_relative_eq!(lfo.sample(1.0), 1.0, epsilon = 1e-6);
    }
}
