//! Seeded noise generators. Each instance owns its RNG.

use nocturne_core::Signal;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Uniform white noise in `[-1, 1)`.
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    seed: u64,
    rng: SmallRng,
}

impl WhiteNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.rng.gen_range(-1.0..1.0)
    }
}

impl Signal for WhiteNoise {
    #[inline]
    fn sample(&mut self, _t: f64) -> f32 {
        self.next_sample()
    }

    fn reset(&mut self) {
        self.rng = SmallRng::seed_from_u64(self.seed);
    }
}

/// Pink noise from a bank of one-pole filters (Paul Kellet's refined method).
#[derive(Debug, Clone)]
pub struct PinkNoise {
    white: WhiteNoise,
    b: [f32; 7],
}

impl PinkNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            white: WhiteNoise::new(seed),
            b: [0.0; 7],
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let w = self.white.next_sample();
        let b = &mut self.b;
        b[0] = 0.99886 * b[0] + w * 0.0555179;
        b[1] = 0.99332 * b[1] + w * 0.0750759;
        b[2] = 0.96900 * b[2] + w * 0.1538520;
        b[3] = 0.86650 * b[3] + w * 0.3104856;
        b[4] = 0.55000 * b[4] + w * 0.5329522;
        b[5] = -0.7616 * b[5] - w * 0.0168980;
        let pink = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + w * 0.5362;
        b[6] = w * 0.115926;
        pink * 0.11
    }
}

impl Signal for PinkNoise {
    #[inline]
    fn sample(&mut self, _t: f64) -> f32 {
        self.next_sample()
    }

    fn reset(&mut self) {
        self.white.reset();
        self.b = [0.0; 7];
    }
}

/// Brown (red) noise from a leaky integrator.
#[derive(Debug, Clone)]
pub struct BrownNoise {
    white: WhiteNoise,
    last: f32,
}

impl BrownNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            white: WhiteNoise::new(seed),
            last: 0.0,
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let w = self.white.next_sample();
        self.last = (self.last + 0.02 * w) / 1.02;
        self.last * 3.5
    }
}

impl Signal for BrownNoise {
    #[inline]
    fn sample(&mut self, _t: f64) -> f32 {
        self.next_sample()
    }

    fn reset(&mut self) {
        self.white.reset();
        self.last = 0.0;
    }
}
