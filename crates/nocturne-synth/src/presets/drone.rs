//! Midnight hum: a sub-bass drone over a dark brown-noise bed.

use crate::Result;
use nocturne_core::{OutputRoute, Signal};
use nocturne_dsp::{lowpass_cascade, phase_wrapped_sine, BrownNoise, Filtered, ModRange, WanderingLfo};

/// Sub-bass fundamental for the route the hum plays through. Small
/// speakers cannot reproduce A1, so they get A2; earbuds and headphones
/// go lower.
pub fn sub_bass_fundamental(route: OutputRoute) -> f64 {
    match route {
        OutputRoute::Speaker => 110.00,
        OutputRoute::Bluetooth => 73.42,
        OutputRoute::Headphones => 55.00,
        OutputRoute::Unknown => 110.00,
    }
}

/// `(frequency ratio, amplitude)`: fundamental, octave and fifth.
const PARTIALS: [(f64, f32); 3] = [(1.0, 1.0), (2.0, 0.5), (1.5, 0.3)];

/// Fundamental plus octave and fifth, breathing on a wandering LFO.
#[derive(Debug, Clone)]
pub struct SubBass {
    fundamental: f64,
    breath: WanderingLfo,
}

impl SubBass {
    const BREATH: ModRange = ModRange::new(0.7, 1.0);

    pub fn new(fundamental: f64, seed: u64) -> Self {
        Self {
            fundamental,
            breath: WanderingLfo::new(0.07, 0.3, seed),
        }
    }

    pub fn for_route(route: OutputRoute, seed: u64) -> Self {
        Self::new(sub_bass_fundamental(route), seed)
    }

    pub fn fundamental(&self) -> f64 {
        self.fundamental
    }
}

impl Signal for SubBass {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        let norm: f32 = PARTIALS.iter().map(|p| p.1).sum();
        let tone: f32 = PARTIALS
            .iter()
            .map(|&(ratio, amp)| phase_wrapped_sine(self.fundamental * ratio, t, 0.0) * amp)
            .sum();
        tone / norm * Self::BREATH.map(self.breath.sample(t))
    }

    fn reset(&mut self) {
        self.breath.reset();
    }
}

/// Brown noise low-passed at 400 Hz.
pub type BrownBed = Filtered<BrownNoise>;

pub fn brown_bed(seed: u64, sample_rate: f64) -> Result<BrownBed> {
    Ok(Filtered::new(
        BrownNoise::new(seed),
        lowpass_cascade(400.0, 1, sample_rate)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table() {
        assert_eq!(sub_bass_fundamental(OutputRoute::Speaker), 110.0);
        assert_eq!(sub_bass_fundamental(OutputRoute::Bluetooth), 73.42);
        assert_eq!(sub_bass_fundamental(OutputRoute::Headphones), 55.0);
        assert_eq!(
            sub_bass_fundamental(OutputRoute::Unknown),
            sub_bass_fundamental(OutputRoute::Speaker)
        );
    }

    #[test]
    fn test_sub_bass_bounded() {
        let mut bass = SubBass::for_route(OutputRoute::Headphones, 3);
        assert_eq!(bass.fundamental(), 55.0);
        for i in 0..48_000 {
            let v = bass.sample(i as f64 / 48_000.0);
            assert!(v.abs() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn test_brown_bed_is_quiet_and_finite() {
        let mut bed = brown_bed(7, 48_000.0).unwrap();
        for i in 0..48_000 {
            let v = bed.sample(i as f64 / 48_000.0);
            assert!(v.is_finite() && v.abs() < 2.0);
        }
    }
}
