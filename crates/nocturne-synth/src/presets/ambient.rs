//! Noise beds: pink noise, ocean surf, rain, forest wind and leaf rustles.

use crate::Result;
use nocturne_core::Signal;
use nocturne_dsp::{
    lowpass_cascade, phase_wrapped_sine, BiquadFilter, Filtered, ModRange, PinkNoise, SineLfo,
    WanderingLfo, WhiteNoise,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

/// Pink noise with a slow breathing swell.
pub struct PinkBed {
    noise: PinkNoise,
    breath: SineLfo,
}

impl PinkBed {
    const BREATH: ModRange = ModRange::new(0.85, 1.0);

    pub fn new(seed: u64) -> Self {
        Self {
            noise: PinkNoise::new(seed),
            breath: SineLfo::new(0.1),
        }
    }
}

impl Signal for PinkBed {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        self.noise.next_sample() * Self::BREATH.map(self.breath.sample(t))
    }

    fn reset(&mut self) {
        self.noise.reset();
    }
}

/// Overlapping slow swells, clipped to `[0, 1]`.
#[inline]
pub fn swell(t: f64) -> f32 {
    let v = 0.6
        + 0.3 * phase_wrapped_sine(3.0 / 60.0, t, 0.0)
        + 0.2 * phase_wrapped_sine(2.0 / 60.0, t, 0.0)
        + 0.1 * phase_wrapped_sine(5.0 / 60.0, t, 0.0);
    v.clamp(0.0, 1.0)
}

/// White noise under the swell envelope, before filtering.
pub struct Surf {
    noise: WhiteNoise,
}

impl Signal for Surf {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        self.noise.next_sample() * swell(t)
    }

    fn reset(&mut self) {
        self.noise.reset();
    }
}

/// Surf through a 4th-order 2 kHz low-pass.
pub type OceanWaves = Filtered<Surf>;

pub fn ocean_waves(seed: u64, sample_rate: f64) -> Result<OceanWaves> {
    let surf = Surf {
        noise: WhiteNoise::new(seed),
    };
    Ok(Filtered::new(surf, lowpass_cascade(2000.0, 2, sample_rate)?))
}

/// Three filtered noise bands under a slow intensity swell.
pub struct Rain {
    drops: Filtered<WhiteNoise>,
    patter: Filtered<WhiteNoise>,
    hiss: Filtered<WhiteNoise>,
    intensity: SineLfo,
}

impl Rain {
    const INTENSITY: ModRange = ModRange::new(0.6, 1.0);

    pub fn new(seed: u64, sample_rate: f64) -> Result<Self> {
        Ok(Self {
            drops: Filtered::new(
                WhiteNoise::new(seed),
                vec![BiquadFilter::lowpass(800.0, sample_rate)?],
            ),
            patter: Filtered::new(
                WhiteNoise::new(seed.wrapping_add(1)),
                vec![BiquadFilter::bandpass(1000.0, 4000.0, sample_rate)?],
            ),
            hiss: Filtered::new(
                WhiteNoise::new(seed.wrapping_add(2)),
                vec![BiquadFilter::highpass(3000.0, sample_rate)?],
            ),
            intensity: SineLfo::new(0.05),
        })
    }
}

impl Signal for Rain {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        let bed = 0.3 * self.drops.sample(t) + 0.4 * self.patter.sample(t) + 0.2 * self.hiss.sample(t);
        bed * Self::INTENSITY.map(self.intensity.sample(t))
    }

    fn reset(&mut self) {
        self.drops.reset();
        self.patter.reset();
        self.hiss.reset();
    }

    fn reset_effects(&mut self) {
        self.drops.reset_effects();
        self.patter.reset_effects();
        self.hiss.reset_effects();
    }
}

/// Soft low-passed pink noise that rises and falls on a wandering LFO.
pub struct ForestWind {
    air: Filtered<PinkNoise>,
    gust: WanderingLfo,
}

impl ForestWind {
    const GUST: ModRange = ModRange::new(0.8, 1.2);

    pub fn new(seed: u64, sample_rate: f64) -> Result<Self> {
        Ok(Self {
            air: Filtered::new(PinkNoise::new(seed), lowpass_cascade(2000.0, 2, sample_rate)?),
            gust: WanderingLfo::new(0.05, 0.3, seed.wrapping_add(1)),
        })
    }
}

impl Signal for ForestWind {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        self.air.sample(t) * Self::GUST.map(self.gust.sample(t))
    }

    fn reset(&mut self) {
        self.air.reset();
        self.gust.reset();
    }

    fn reset_effects(&mut self) {
        self.air.reset_effects();
    }
}

const MAX_RUSTLES: usize = 4;

#[derive(Clone, Copy)]
struct Rustle {
    start: f64,
    duration: f64,
    level: f32,
    band: BiquadFilter,
}

/// Sparse 2-8 kHz noise bursts under a Hann window, 0.5-1.2 s long.
pub struct Leaves {
    seed: u64,
    rng: SmallRng,
    noise: WhiteNoise,
    band: BiquadFilter,
    active: Vec<Rustle>,
    next_at: f64,
}

impl Leaves {
    pub fn new(seed: u64, sample_rate: f64) -> Result<Self> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let next_at = rng.gen_range(0.2..1.0);
        Ok(Self {
            seed,
            rng,
            noise: WhiteNoise::new(seed.wrapping_add(1)),
            band: BiquadFilter::bandpass(2000.0, 8000.0, sample_rate)?,
            active: Vec::with_capacity(MAX_RUSTLES),
            next_at,
        })
    }

    pub fn active(&self) -> usize {
        self.active.len()
    }

    fn spawn(&mut self, t: f64) {
        if self.active.len() < MAX_RUSTLES {
            let mut band = self.band;
            band.reset();
            self.active.push(Rustle {
                start: t,
                duration: self.rng.gen_range(0.5..1.2),
                level: self.rng.gen_range(0.08..0.18),
                band,
            });
        }
        self.next_at = t + self.rng.gen_range(0.3..1.2);
    }
}

impl Signal for Leaves {
    fn sample(&mut self, t: f64) -> f32 {
        if t >= self.next_at {
            self.spawn(t);
        }
        self.active.retain(|r| t < r.start + r.duration);

        let mut value = 0.0;
        for rustle in self.active.iter_mut() {
            let x = (t - rustle.start) / rustle.duration;
            let window = 0.5 * (1.0 - (TAU * x).cos());
            let grain = rustle.band.process(self.noise.next_sample());
            value += grain * window as f32 * rustle.level;
        }
        value
    }

    fn reset(&mut self) {
        self.rng = SmallRng::seed_from_u64(self.seed);
        self.next_at = self.rng.gen_range(0.2..1.0);
        self.noise.reset();
        self.active.clear();
    }

    fn reset_effects(&mut self) {
        for rustle in self.active.iter_mut() {
            rustle.band.reset();
        }
    }
}
