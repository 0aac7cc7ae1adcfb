//! Mixer, effects chain, and the signal that ties them together.

use crate::limiter::SoftLimiter;
use crate::reverb::SchroederReverb;
use nocturne_core::{BoxedSignal, Signal};

/// Static-gain sum of several signals.
#[derive(Default)]
pub struct Mixer {
    inputs: Vec<(BoxedSignal, f32)>,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, signal: BoxedSignal, gain: f32) -> Self {
        self.inputs.push((signal, gain));
        self
    }

    pub fn push(&mut self, signal: BoxedSignal, gain: f32) {
        self.inputs.push((signal, gain));
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl Signal for Mixer {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        self.inputs
            .iter_mut()
            .map(|(signal, gain)| signal.sample(t) * *gain)
            .sum()
    }

    fn reset(&mut self) {
        for (signal, _) in self.inputs.iter_mut() {
            signal.reset();
        }
    }

    fn reset_effects(&mut self) {
        for (signal, _) in self.inputs.iter_mut() {
            signal.reset_effects();
        }
    }
}

/// Reverb (optional) then limiter (optional), always in that order.
#[derive(Debug, Clone, Default)]
pub struct EffectsChain {
    reverb: Option<SchroederReverb>,
    limiter: Option<SoftLimiter>,
}

impl EffectsChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reverb(mut self, reverb: SchroederReverb) -> Self {
        self.reverb = Some(reverb);
        self
    }

    pub fn with_limiter(mut self, limiter: SoftLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn has_reverb(&self) -> bool {
        self.reverb.is_some()
    }

    pub fn has_limiter(&self) -> bool {
        self.limiter.is_some()
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let x = match self.reverb.as_mut() {
            Some(reverb) => reverb.process(x),
            None => x,
        };
        match self.limiter.as_ref() {
            Some(limiter) => limiter.process(x),
            None => x,
        }
    }

    /// Clear reverb tails. The limiter is stateless.
    pub fn reset(&mut self) {
        if let Some(reverb) = self.reverb.as_mut() {
            reverb.reset();
        }
    }
}

/// A mixer followed by an effects chain.
pub struct ProcessedSignal {
    mixer: Mixer,
    chain: EffectsChain,
}

impl ProcessedSignal {
    pub fn new(mixer: Mixer, chain: EffectsChain) -> Self {
        Self { mixer, chain }
    }

    pub fn chain(&self) -> &EffectsChain {
        &self.chain
    }
}

impl Signal for ProcessedSignal {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        let x = self.mixer.sample(t);
        self.chain.process(x)
    }

    fn reset(&mut self) {
        self.mixer.reset();
        self.chain.reset();
    }

    fn reset_effects(&mut self) {
        self.mixer.reset_effects();
        self.chain.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reverb::ReverbParams;
    use nocturne_core::FnSignal;

    fn constant(value: f32) -> BoxedSignal {
        Box::new(FnSignal(move |_t: f64| value))
    }

    #[test]
    fn test_mixer_sums_with_gains() {
        let mut mixer = Mixer::new()
            .with_input(constant(1.0), 0.5)
            .with_input(constant(0.5), 0.2);
        assert!((mixer.sample(0.0) - 0.6).abs() < 1e-6);
        assert_eq!(mixer.len(), 2);
    }

    #[test]
    fn test_chain_limits_after_reverb() {
        let reverb = SchroederReverb::new(ReverbParams::default(), 48000.0).unwrap();
        let chain = EffectsChain::new()
            .with_reverb(reverb)
            .with_limiter(SoftLimiter::new(1.0, 0.5).unwrap());
        let mut signal = ProcessedSignal::new(Mixer::new().with_input(constant(5.0), 1.0), chain);
        for i in 0..4800 {
            assert!(signal.sample(i as f64 / 48000.0).abs() < 0.5);
        }
    }

    #[test]
    fn test_reset_effects_clears_tail() {
        let reverb = SchroederReverb::new(
            ReverbParams {
                mix: 1.0,
                pre_delay: 0.0,
                ..Default::default()
            },
            48000.0,
        )
        .unwrap();
        let impulse: BoxedSignal = Box::new(FnSignal(|t: f64| if t == 0.0 { 1.0 } else { 0.0 }));
        let mut signal = ProcessedSignal::new(
            Mixer::new().with_input(impulse, 1.0),
            EffectsChain::new().with_reverb(reverb),
        );
        for i in 0..2000 {
            signal.sample(i as f64 / 48000.0);
        }
        signal.reset_effects();
        for i in 2000..4000 {
            assert_eq!(signal.sample(i as f64 / 48000.0), 0.0);
        }
    }
}
