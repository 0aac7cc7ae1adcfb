//! Forest birdsong: ninety short whistled chirps scattered over a 30 s loop.

use nocturne_core::Signal;
use nocturne_dsp::PhaseAccumulator;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

pub const LOOP_SECS: f64 = 30.0;
pub const CALLS_PER_LOOP: usize = 90;
/// Loop peak lands at `1 / HEADROOM` of full scale.
const HEADROOM: f32 = 1.1;

#[derive(Debug, Clone, Copy)]
struct Chirp {
    start: f64,
    duration: f64,
    f_start: f64,
    f_end: f64,
    /// Share of the duration spent rising.
    attack_share: f64,
    decay_rate: f64,
    vibrato_rate: f64,
    vibrato_depth: f64,
    amplitude: f32,
    phase: PhaseAccumulator,
}

impl Chirp {
    fn new<R: Rng>(rng: &mut R) -> Self {
        let duration = rng.gen_range(0.12..0.4);
        let start = rng.gen_range(0.0..LOOP_SECS - duration);
        let f_start = rng.gen_range(2000.0..3500.0);
        Self {
            start,
            duration,
            f_start,
            f_end: f_start * rng.gen_range(0.7..1.3),
            attack_share: rng.gen_range(0.05..0.15),
            decay_rate: rng.gen_range(2.5..4.5),
            vibrato_rate: rng.gen_range(4.0..8.0),
            vibrato_depth: rng.gen_range(0.01..0.03),
            amplitude: rng.gen_range(0.2..0.5),
            phase: PhaseAccumulator::default(),
        }
    }

    fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Highest level the chirp can reach, vibrato included.
    fn ceiling(&self) -> f32 {
        self.amplitude * (1.0 + self.vibrato_depth) as f32
    }

    fn envelope(&self, since: f64) -> f32 {
        let attack = self.duration * self.attack_share;
        let rise = if since < attack { since / attack } else { 1.0 };
        (rise * (-self.decay_rate * since / self.duration).exp()) as f32
    }

    fn sample(&mut self, since: f64, dt: f64) -> f32 {
        if !(0.0..self.duration).contains(&since) {
            return 0.0;
        }
        let freq = self.f_start + (self.f_end - self.f_start) * since / self.duration;
        self.phase.advance(freq, dt);
        let vibrato = 1.0 + self.vibrato_depth * (TAU * self.vibrato_rate * since).sin();
        self.phase.sine() * self.envelope(since) * vibrato as f32 * self.amplitude
    }
}

/// Worst case of overlapping chirps: the active set only grows at a start,
/// so the largest sum is found at one of them.
fn peak_bound(chirps: &[Chirp]) -> f32 {
    chirps
        .iter()
        .map(|c| {
            chirps
                .iter()
                .filter(|o| o.start <= c.start && c.start < o.end())
                .map(Chirp::ceiling)
                .sum::<f32>()
        })
        .fold(0.0, f32::max)
}

/// A fixed 30 s loop of chirps drawn once from the seed.
#[derive(Debug, Clone)]
pub struct ForestBirds {
    seed: u64,
    /// Sorted by start.
    chirps: Vec<Chirp>,
    level: f32,
    last_t: Option<f64>,
    last_position: f64,
}

impl ForestBirds {
    pub fn new(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut chirps: Vec<Chirp> = (0..CALLS_PER_LOOP).map(|_| Chirp::new(&mut rng)).collect();
        chirps.sort_by(|a, b| a.start.total_cmp(&b.start));

        let bound = peak_bound(&chirps);
        let level = if bound > 0.0 { 1.0 / (bound * HEADROOM) } else { 0.0 };
        Self {
            seed,
            chirps,
            level,
            last_t: None,
            last_position: 0.0,
        }
    }

    /// Chirps sounding at loop position `position`.
    pub fn active_count(&self, position: f64) -> usize {
        let upto = self.chirps.partition_point(|c| c.start <= position);
        self.chirps[..upto]
            .iter()
            .filter(|c| position < c.end())
            .count()
    }

    pub fn call_starts(&self) -> impl Iterator<Item = f64> + '_ {
        self.chirps.iter().map(|c| c.start)
    }
}

impl Signal for ForestBirds {
    fn sample(&mut self, t: f64) -> f32 {
        let dt = match self.last_t {
            Some(last) if t > last => t - last,
            _ => 0.0,
        };
        self.last_t = Some(t);

        let position = t.rem_euclid(LOOP_SECS);
        if position < self.last_position {
            for chirp in &mut self.chirps {
                chirp.phase.reset();
            }
        }
        self.last_position = position;

        let upto = self.chirps.partition_point(|c| c.start <= position);
        self.chirps[..upto]
            .iter_mut()
            .filter(|c| position < c.end())
            .map(|c| c.sample(position - c.start, dt))
            .sum::<f32>()
            * self.level
    }

    fn reset(&mut self) {
        *self = Self::new(self.seed);
    }
}
