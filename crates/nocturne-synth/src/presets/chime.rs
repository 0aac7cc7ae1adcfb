//! Metallic tree chimes: a cascade of high, slightly detuned grains.

use nocturne_core::Signal;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

pub const GRAINS: usize = 24;
const CASCADE_SECS: f64 = 0.020;
const GRAIN_TAU: f64 = 1.2;
const SILENCE_FLOOR: f64 = 0.001;
const DETUNE_RANGE: f64 = 3.0;

/// Base frequencies of the five chime variations.
pub const VARIATION_BASES: [f64; 5] = [5500.0, 5800.0, 6000.0, 6200.0, 6500.0];

#[derive(Debug, Clone, Copy, Default)]
struct Grain {
    freq: f64,
    phase: f64,
}

/// One strike: 24 grains gliding upward, 20 ms apart.
#[derive(Debug, Clone, Copy)]
pub struct ChimeStrike {
    grains: [Grain; GRAINS],
}

impl ChimeStrike {
    /// Time after the strike at which it stops being rendered.
    pub const RING_SECS: f64 = GRAINS as f64 * CASCADE_SECS + GRAIN_TAU * 3.0;

    pub fn new<R: Rng>(base_freq: f64, rng: &mut R) -> Self {
        let mut grains = [Grain::default(); GRAINS];
        for (i, grain) in grains.iter_mut().enumerate() {
            let spread = 0.8 + (i as f64 / (GRAINS - 1) as f64) * 0.5;
            let detune = (rng.gen::<f64>() - 0.5) * DETUNE_RANGE;
            grain.freq = base_freq * spread + detune;
            grain.phase = rng.gen::<f64>() * TAU;
        }
        Self { grains }
    }

    /// Output `since` seconds after the strike, normalized by grain count.
    pub fn sample(&self, since: f64) -> f32 {
        if !(0.0..Self::RING_SECS).contains(&since) {
            return 0.0;
        }
        let mut value = 0.0;
        for (i, grain) in self.grains.iter().enumerate() {
            let local = since - i as f64 * CASCADE_SECS;
            if local < 0.0 {
                break;
            }
            let env = (-local / GRAIN_TAU).exp();
            if env < SILENCE_FLOOR {
                continue;
            }
            value += ((TAU * grain.freq * local).rem_euclid(TAU) + grain.phase).sin() * env;
        }
        (value / GRAINS as f64) as f32
    }
}

/// Chimes struck at random every 10-20 s, each from a random variation.
#[derive(Debug, Clone)]
pub struct TreeChime {
    seed: u64,
    rng: SmallRng,
    ringing: Option<(f64, ChimeStrike)>,
    next_at: f64,
}

impl TreeChime {
    const FIRST_STRIKE: f64 = 1.0;

    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
            ringing: None,
            next_at: Self::FIRST_STRIKE,
        }
    }

    fn strike(&mut self, t: f64) {
        let base = VARIATION_BASES[self.rng.gen_range(0..VARIATION_BASES.len())];
        self.ringing = Some((t, ChimeStrike::new(base, &mut self.rng)));
        self.next_at = t + self.rng.gen_range(10.0..20.0);
    }
}

impl Signal for TreeChime {
    fn sample(&mut self, t: f64) -> f32 {
        if t >= self.next_at {
            self.strike(t);
        }
        match &self.ringing {
            Some((start, strike)) => strike.sample(t - start),
            None => 0.0,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.seed);
    }
}
