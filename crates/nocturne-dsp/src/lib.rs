//! Time-domain DSP building blocks for Nocturne: oscillators, seeded noise,
//! LFOs, note envelopes, biquad filters, Schroeder reverb, and soft limiting.
//!
//! Everything audible implements [`nocturne_core::Signal`]. Generators are
//! evaluated from elapsed time; stateful ones (noise, filters, reverb) own
//! their memory and are reset through the `Signal` reset hooks.

mod error;
pub use error::{Error, Result};

mod oscillator;
pub use oscillator::{phase_wrapped_sine, PhaseAccumulator, SineOscillator};

mod noise;
pub use noise::{BrownNoise, PinkNoise, WhiteNoise};

mod lfo;
pub use lfo::{DriftLfo, ModRange, SineLfo, WanderingLfo};

mod envelope;
pub use envelope::{AttackCurve, Envelope, Sustain};

mod filter;
pub use filter::{lowpass_cascade, BiquadFilter, FilterKind, Filtered};

mod reverb;
pub use reverb::{CombTuning, ReverbParams, SchroederReverb};

mod limiter;
pub use limiter::{soft_clip, tanh_saturate, SoftLimiter};

mod mixer;
pub use mixer::{EffectsChain, Mixer, ProcessedSignal};
