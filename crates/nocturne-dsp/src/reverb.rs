//! Schroeder reverb: pre-delay, four damped feedback combs in parallel,
//! four all-passes in series.
//!
//! All buffers are sized at construction; processing never allocates.

use crate::{Error, Result};
use tracing::trace;

/// Comb lengths in samples at 48 kHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombTuning {
    #[default]
    Standard,
    /// Tighter spacing for small, bright rooms.
    Short,
}

impl CombTuning {
    pub fn delays(self) -> [usize; 4] {
        match self {
            CombTuning::Standard => [1557, 1617, 1491, 1422],
            CombTuning::Short => [1116, 1188, 1277, 1356],
        }
    }
}

const ALLPASS_DELAYS: [usize; 4] = [225, 556, 441, 341];
const ALLPASS_GAIN: f32 = 0.5;
const REFERENCE_RATE: f64 = 48000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    /// Multiplier on the comb lengths.
    pub room_size: f32,
    /// One-pole damping inside each comb loop, `[0, 1)`.
    pub damping: f32,
    /// Comb feedback, `[0, 1)`.
    pub decay: f32,
    /// Wet share of the output, `[0, 1]`.
    pub mix: f32,
    /// Seconds.
    pub pre_delay: f32,
    pub comb_tuning: CombTuning,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            room_size: 1.0,
            damping: 0.5,
            decay: 0.8,
            mix: 0.3,
            pre_delay: 0.02,
            comb_tuning: CombTuning::Standard,
        }
    }
}

impl ReverbParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.room_size > 0.0 && self.room_size <= 10.0) {
            return Err(Error::InvalidParameter(format!(
                "room_size {} out of range (0-10]",
                self.room_size
            )));
        }
        if !(0.0..1.0).contains(&self.damping) {
            return Err(Error::InvalidParameter(format!(
                "damping {} out of range [0-1)",
                self.damping
            )));
        }
        if !(0.0..1.0).contains(&self.decay) {
            return Err(Error::InvalidParameter(format!(
                "decay {} out of range [0-1)",
                self.decay
            )));
        }
        if !(0.0..=1.0).contains(&self.mix) {
            return Err(Error::InvalidParameter(format!(
                "mix {} out of range [0-1]",
                self.mix
            )));
        }
        if !(0.0..=1.0).contains(&self.pre_delay) {
            return Err(Error::InvalidParameter(format!(
                "pre_delay {} out of range [0-1] s",
                self.pre_delay
            )));
        }
        Ok(())
    }
}

/// Fixed-length delay. `read` returns the sample written `len` writes ago.
#[derive(Debug, Clone)]
struct DelayLine {
    buffer: Vec<f32>,
    pos: usize,
}

impl DelayLine {
    fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            pos: 0,
        }
    }

    #[inline]
    fn read(&self) -> f32 {
        self.buffer[self.pos]
    }

    #[inline]
    fn write(&mut self, value: f32) {
        self.buffer[self.pos] = value;
        self.pos += 1;
        if self.pos == self.buffer.len() {
            self.pos = 0;
        }
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

#[derive(Debug, Clone)]
struct Comb {
    line: DelayLine,
    prev: f32,
}

impl Comb {
    #[inline]
    fn process(&mut self, input: f32, damping: f32, decay: f32) -> f32 {
        self.prev = self.line.read() * (1.0 - damping) + self.prev * damping;
        let out = input + self.prev * decay;
        self.line.write(out);
        out
    }

    fn clear(&mut self) {
        self.line.clear();
        self.prev = 0.0;
    }
}

#[derive(Debug, Clone)]
struct Allpass {
    inputs: DelayLine,
    outputs: DelayLine,
}

impl Allpass {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let out = -ALLPASS_GAIN * input + self.inputs.read() + ALLPASS_GAIN * self.outputs.read();
        self.inputs.write(input);
        self.outputs.write(out);
        out
    }

    fn clear(&mut self) {
        self.inputs.clear();
        self.outputs.clear();
    }
}

#[derive(Debug, Clone)]
pub struct SchroederReverb {
    params: ReverbParams,
    pre_delay: Option<DelayLine>,
    combs: Vec<Comb>,
    allpasses: Vec<Allpass>,
}

impl SchroederReverb {
    pub fn new(params: ReverbParams, sample_rate: f64) -> Result<Self> {
        params.validate()?;
        let scale = sample_rate / REFERENCE_RATE;

        let pre_samples = (params.pre_delay as f64 * sample_rate).round() as usize;
        let pre_delay = (pre_samples > 0).then(|| DelayLine::new(pre_samples));

        let combs = params
            .comb_tuning
            .delays()
            .iter()
            .map(|&d| {
                let len = (d as f64 * params.room_size as f64 * scale).round() as usize;
                Comb {
                    line: DelayLine::new(len),
                    prev: 0.0,
                }
            })
            .collect();

        let allpasses = ALLPASS_DELAYS
            .iter()
            .map(|&d| {
                let len = (d as f64 * scale).round() as usize;
                Allpass {
                    inputs: DelayLine::new(len),
                    outputs: DelayLine::new(len),
                }
            })
            .collect();

        trace!(?params, sample_rate, "Built reverb");
        Ok(Self {
            params,
            pre_delay,
            combs,
            allpasses,
        })
    }

    pub fn params(&self) -> &ReverbParams {
        &self.params
    }

    #[inline]
    pub fn process(&mut self, dry: f32) -> f32 {
        let input = match self.pre_delay.as_mut() {
            Some(line) => {
                let delayed = line.read();
                line.write(dry);
                delayed
            }
            None => dry,
        };

        let ReverbParams { damping, decay, .. } = self.params;
        let mut wet = 0.0;
        for comb in self.combs.iter_mut() {
            wet += comb.process(input, damping, decay);
        }
        wet /= self.combs.len() as f32;

        for allpass in self.allpasses.iter_mut() {
            wet = allpass.process(wet);
        }

        dry * (1.0 - self.params.mix) + wet * self.params.mix
    }

    /// Zero every delay line.
    pub fn reset(&mut self) {
        if let Some(line) = self.pre_delay.as_mut() {
            line.clear();
        }
        self.combs.iter_mut().for_each(Comb::clear);
        self.allpasses.iter_mut().for_each(Allpass::clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48000.0;

    fn impulse_response(reverb: &mut SchroederReverb, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| reverb.process(if i == 0 { 1.0 } else { 0.0 }))
            .collect()
    }

    #[test]
    fn test_adds_tail() {
        let mut reverb = SchroederReverb::new(ReverbParams::default(), SR).unwrap();
        let ir = impulse_response(&mut reverb, 48000);
        let tail_energy: f32 = ir[4800..].iter().map(|s| s * s).sum();
        assert!(tail_energy > 0.0);
    }

    #[test]
    fn test_deterministic() {
        let params = ReverbParams {
            comb_tuning: CombTuning::Short,
            ..Default::default()
        };
        let a = impulse_response(&mut SchroederReverb::new(params, SR).unwrap(), 9600);
        let b = impulse_response(&mut SchroederReverb::new(params, SR).unwrap(), 9600);
        assert_eq!(a, b);
    }

    #[test]
    fn test_reset_matches_fresh() {
        let mut reverb = SchroederReverb::new(ReverbParams::default(), SR).unwrap();
        let first = impulse_response(&mut reverb, 4800);
        reverb.reset();
        assert_eq!(first, impulse_response(&mut reverb, 4800));
    }

    #[test]
    fn test_dry_only_when_mix_zero() {
        let params = ReverbParams {
            mix: 0.0,
            ..Default::default()
        };
        let mut reverb = SchroederReverb::new(params, SR).unwrap();
        for i in 0..1000 {
            let x = (i as f32 * 0.01).sin();
            assert_eq!(reverb.process(x), x);
        }
    }

    #[test]
    fn test_pre_delay_holds_wet_back() {
        let params = ReverbParams {
            mix: 1.0,
            pre_delay: 0.1,
            ..Default::default()
        };
        let mut reverb = SchroederReverb::new(params, SR).unwrap();
        let ir = impulse_response(&mut reverb, 4800);
        assert!(ir.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_stable_under_long_input() {
        let params = ReverbParams {
            decay: 0.95,
            damping: 0.1,
            room_size: 2.0,
            ..Default::default()
        };
        let mut reverb = SchroederReverb::new(params, SR).unwrap();
        for i in 0..480_000 {
            let y = reverb.process(if i % 4800 == 0 { 1.0 } else { 0.0 });
            assert!(y.is_finite() && y.abs() < 100.0);
        }
    }

    #[test]
    fn test_rejects_runaway_feedback() {
        let params = ReverbParams {
            decay: 1.0,
            ..Default::default()
        };
        assert!(SchroederReverb::new(params, SR).is_err());
    }
}
