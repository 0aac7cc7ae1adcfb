//! Per-note tone generators.

use nocturne_dsp::phase_wrapped_sine;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

/// `(harmonic multiple, amplitude)`.
pub type Partial = (f64, f32);

pub const ORGAN: &[Partial] = &[(1.0, 1.0), (2.0, 0.45), (3.0, 0.25), (4.0, 0.12), (6.0, 0.03)];

pub const TRUMPET: &[Partial] = &[
    (1.0, 1.0),
    (2.0, 0.55),
    (3.0, 0.35),
    (4.0, 0.2),
    (5.0, 0.12),
    (6.0, 0.06),
];

/// Odd harmonics only.
pub const CLARINET: &[Partial] = &[(1.0, 1.0), (3.0, 0.33), (5.0, 0.2), (7.0, 0.14), (9.0, 0.11)];

const BELL_HARMONICS: [Partial; 6] = [
    (1.0, 1.0),
    (2.0, 0.6),
    (3.0, 0.35),
    (4.0, 0.2),
    (5.0, 0.1),
    (6.0, 0.05),
];

/// Slightly inharmonic partials that give the bell its metal.
const BELL_INHARMONICS: [Partial; 2] = [(2.756, 0.08), (4.112, 0.04)];

const STRING_HARMONICS: [Partial; 8] = [
    (1.0, 1.0),
    (2.0, 0.5),
    (3.0, 0.35),
    (4.0, 0.25),
    (5.0, 0.15),
    (6.0, 0.10),
    (7.0, 0.06),
    (8.0, 0.03),
];

/// Stiff strings run sharp: partial `h` sits at `h * (1 + B h²)`.
const STRING_STIFFNESS: f64 = 0.0003;
const BODY_CEILING_HZ: f64 = 150.0;
const BODY_GAIN: f32 = 0.08;
/// Rate at which the pick transient dies; past `NOISE_WINDOW` it is inaudible.
const NOISE_DECAY: f64 = 50.0;
const NOISE_WINDOW: f64 = 0.15;
/// Resolution of the transient's noise grid.
const NOISE_RATE: f64 = 48_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timbre {
    Sine,
    /// Fundamental plus weighted overtones under a shared vibrato, divided
    /// by the partial count.
    Harmonic {
        partials: &'static [Partial],
        vibrato_rate: f64,
        /// In cycles.
        vibrato_depth: f64,
    },
    /// Three sines at `f`, `f + spread`, `f - spread`, averaged.
    Detuned { spread: f64 },
    /// Music-box tine. Higher harmonics ring shorter.
    Bell { brightness: f32, decay: f64 },
    /// Guitar string: stretched partials, a low body resonance and a short
    /// pick transient. `noise` is the transient's level before brightness.
    Plucked { brightness: f32, noise: f32 },
}

impl Timbre {
    pub const fn harmonic(partials: &'static [Partial], vibrato_rate: f64, vibrato_depth: f64) -> Self {
        Timbre::Harmonic {
            partials,
            vibrato_rate,
            vibrato_depth,
        }
    }

    /// One sample of a note at `freq`.
    ///
    /// `t` drives the oscillator phase. `dt` is the time since the note
    /// started; struck timbres use it for both phase and decay.
    pub fn sample(&self, freq: f64, t: f64, dt: f64) -> f32 {
        match *self {
            Timbre::Sine => phase_wrapped_sine(freq, t, 0.0),
            Timbre::Harmonic {
                partials,
                vibrato_rate,
                vibrato_depth,
            } => {
                if partials.is_empty() {
                    return 0.0;
                }
                let vibrato = (TAU * vibrato_rate * t).sin() * vibrato_depth;
                let sum: f32 = partials
                    .iter()
                    .map(|&(h, amp)| phase_wrapped_sine(freq * h, t, vibrato) * amp)
                    .sum();
                sum / partials.len() as f32
            }
            Timbre::Detuned { spread } => {
                (phase_wrapped_sine(freq, t, 0.0)
                    + phase_wrapped_sine(freq + spread, t, 0.0)
                    + phase_wrapped_sine(freq - spread, t, 0.0))
                    / 3.0
            }
            Timbre::Bell { brightness, decay } => bell(freq, dt, brightness, decay),
            Timbre::Plucked { brightness, noise } => plucked(freq, dt, brightness, noise),
        }
    }
}

fn bell(freq: f64, dt: f64, brightness: f32, decay: f64) -> f32 {
    let mut value = 0.0f64;
    for &(h, amp) in BELL_HARMONICS.iter() {
        let decay_mult = 1.0 / (1.0 + (h - 1.0) * 0.3);
        let env = (-dt / decay * (1.0 + (h - 1.0) * 0.5)).exp();
        value += amp as f64 * decay_mult * phase_wrapped_sine(freq * h, dt, 0.0) as f64 * env;
    }
    let env = (-dt / decay * 2.0).exp();
    for &(ratio, amp) in BELL_INHARMONICS.iter() {
        value += (amp * brightness) as f64 * phase_wrapped_sine(freq * ratio, dt, 0.0) as f64 * env;
    }
    (value / 1.5) as f32
}

fn plucked(freq: f64, dt: f64, brightness: f32, noise: f32) -> f32 {
    let dt = dt.max(0.0);
    let mut value = 0.0f64;
    for &(h, amp) in STRING_HARMONICS.iter() {
        let env = (-dt * (1.0 + (h - 1.0) * 0.4) * 0.8).exp();
        let stretched = freq * h * (1.0 + STRING_STIFFNESS * h * h);
        value += amp as f64 * phase_wrapped_sine(stretched, dt, 0.0) as f64 * env;
    }
    value *= brightness as f64;

    let body = (freq * 0.5).min(BODY_CEILING_HZ);
    value += (BODY_GAIN * brightness) as f64
        * phase_wrapped_sine(body, dt, 0.0) as f64
        * (-dt * 1.5).exp();

    if noise > 0.0 && dt < NOISE_WINDOW {
        value += (noise * brightness) as f64 * pick_noise(freq, dt) as f64 * (-dt * NOISE_DECAY).exp();
    }
    (value / 1.8) as f32
}

/// Repeatable noise for the pick transient, keyed by note pitch and the
/// sample slot `dt` falls in, so a note sounds the same on every pass.
fn pick_noise(freq: f64, dt: f64) -> f32 {
    let slot = (dt * NOISE_RATE) as u64;
    let key = freq.to_bits().rotate_left(17) ^ slot;
    SmallRng::seed_from_u64(key).gen_range(-1.0..1.0)
}

/// Gain reduction for high notes: linear from 1 at `threshold` down to
/// `1 - depth` at `ceiling` and above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighFreqTaper {
    pub threshold: f64,
    pub ceiling: f64,
    pub depth: f32,
}

impl HighFreqTaper {
    pub const fn new(threshold: f64, ceiling: f64, depth: f32) -> Self {
        Self {
            threshold,
            ceiling,
            depth,
        }
    }

    pub fn gain(&self, freq: f64) -> f32 {
        if freq < self.threshold {
            return 1.0;
        }
        let ratio = ((freq - self.threshold) / (self.ceiling - self.threshold)).min(1.0);
        1.0 - ratio as f32 * self.depth
    }
}
