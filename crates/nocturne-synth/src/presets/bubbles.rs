//! Soft underwater "poko" bubbles: triplets of short rising chirps.

use nocturne_core::Signal;
use nocturne_dsp::{PhaseAccumulator, WhiteNoise};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const MIN_EVENT_GAP: f64 = 2.5;
const MAX_EVENT_GAP: f64 = 7.5;
const TONE_MIX: f32 = 0.85;
const NOISE_MIX: f32 = 0.12;
const ATTACK_SHARE: f64 = 0.07;
const DECAY_RATE: f64 = 2.8;

#[derive(Debug, Clone, Copy)]
struct Poko {
    offset: f64,
    duration: f64,
    f_start: f64,
    f_end: f64,
    gain: f32,
    phase: PhaseAccumulator,
}

impl Poko {
    fn new<R: Rng>(offset: f64, gain: f32, rng: &mut R) -> Self {
        let f_start = rng.gen_range(120.0..220.0);
        Self {
            offset,
            duration: rng.gen_range(0.04..0.09),
            f_start,
            f_end: f_start * rng.gen_range(1.3..1.8),
            gain,
            phase: PhaseAccumulator::default(),
        }
    }

    fn envelope(&self, since: f64) -> f32 {
        let attack = self.duration * ATTACK_SHARE;
        let rise = if since < attack { since / attack } else { 1.0 };
        (rise * (-DECAY_RATE * since / self.duration).exp()) as f32
    }

    fn sample(&mut self, since: f64, dt: f64, noise: f32) -> f32 {
        if !(0.0..self.duration).contains(&since) {
            return 0.0;
        }
        let freq = self.f_start + (self.f_end - self.f_start) * since / self.duration;
        self.phase.advance(freq, dt);
        (self.phase.sine() * TONE_MIX + noise * NOISE_MIX) * self.envelope(since) * self.gain
    }
}

#[derive(Debug, Clone, Copy)]
struct BubbleEvent {
    start: f64,
    level: f32,
    pokos: [Poko; 3],
}

impl BubbleEvent {
    fn new<R: Rng>(start: f64, rng: &mut R) -> Self {
        let second = rng.gen_range(0.120..0.250);
        let third = rng.gen_range(0.300..0.500);
        let pokos = [
            Poko::new(0.0, 1.0, rng),
            Poko::new(second, rng.gen_range(0.9..1.0), rng),
            Poko::new(third, rng.gen_range(0.45..0.7), rng),
        ];
        Self {
            start,
            level: rng.gen_range(0.18..0.32),
            pokos,
        }
    }

    fn end(&self) -> f64 {
        self.pokos
            .iter()
            .map(|p| self.start + p.offset + p.duration)
            .fold(self.start, f64::max)
    }
}

/// Bubble events at least 2.5 s apart.
#[derive(Debug, Clone)]
pub struct Bubbles {
    seed: u64,
    rng: SmallRng,
    noise: WhiteNoise,
    event: Option<BubbleEvent>,
    next_at: f64,
    last_t: Option<f64>,
}

impl Bubbles {
    pub fn new(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let next_at = rng.gen_range(0.5..2.0);
        Self {
            seed,
            rng,
            noise: WhiteNoise::new(seed.wrapping_add(1)),
            event: None,
            next_at,
            last_t: None,
        }
    }

    /// Start time of the event currently sounding, if any.
    pub fn current_event(&self) -> Option<f64> {
        self.event.map(|e| e.start)
    }
}

impl Signal for Bubbles {
    fn sample(&mut self, t: f64) -> f32 {
        let dt = match self.last_t {
            Some(last) if t > last => t - last,
            _ => 0.0,
        };
        self.last_t = Some(t);

        if t >= self.next_at {
            self.event = Some(BubbleEvent::new(t, &mut self.rng));
            self.next_at = t + self.rng.gen_range(MIN_EVENT_GAP..MAX_EVENT_GAP);
        }

        let Some(event) = self.event.as_mut() else {
            return 0.0;
        };
        if t >= event.end() {
            self.event = None;
            return 0.0;
        }

        let since_event = t - event.start;
        let noise = self.noise.next_sample();
        let level = event.level;
        event
            .pokos
            .iter_mut()
            .map(|poko| poko.sample(since_event - poko.offset, dt, noise))
            .sum::<f32>()
            * level
    }

    fn reset(&mut self) {
        *self = Self::new(self.seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48000.0;

    #[test]
    fn test_events_respect_min_gap() {
        let mut bubbles = Bubbles::new(4);
        let mut starts: Vec<f64> = Vec::new();
        for i in 0..(30.0 * SR) as usize {
            bubbles.sample(i as f64 / SR);
            if let Some(start) = bubbles.current_event() {
                if starts.last() != Some(&start) {
                    starts.push(start);
                }
            }
        }
        assert!(starts.len() >= 3);
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= MIN_EVENT_GAP);
        }
    }

    #[test]
    fn test_output_bounded() {
        let mut bubbles = Bubbles::new(2);
        for i in 0..(10.0 * SR) as usize {
            let s = bubbles.sample(i as f64 / SR);
            assert!(s.is_finite() && s.abs() < 1.0);
        }
    }

    #[test]
    fn test_poko_envelope_shape() {
        let mut rng = SmallRng::seed_from_u64(0);
        let poko = Poko::new(0.0, 1.0, &mut rng);
        assert_eq!(poko.envelope(0.0), 0.0);
        let peak = poko.envelope(poko.duration * ATTACK_SHARE);
        assert!(peak > 0.7 && peak <= 1.0);
        assert!(poko.envelope(poko.duration * 0.99) < 0.07);
    }
}
