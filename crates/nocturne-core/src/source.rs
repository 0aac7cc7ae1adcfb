//! Sources: a mixed/effected signal plus its handle into the output device.
//!
//! A [`Source`] is built on the control side, handed to
//! [`OutputDevice::register`](crate::OutputDevice::register) which moves the
//! signal into a render-side [`SourceVoice`], and from then on is driven
//! through a shared [`SourceControl`] made of atomics only.

use crate::lockfree::{AtomicByte, AtomicFloat, Sequence};
use crate::signal::BoxedSignal;
use crate::smooth::SmoothedValue;
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Identifier assigned by the device at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// Lifecycle of a registered source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SourceState {
    /// Attached to the device, never started.
    Registered = 0,
    /// Producing audio.
    Started = 1,
    /// Attached but silenced. Resuming is cheap.
    Suspended = 2,
    /// Released. The render voice is gone or about to be dropped.
    Detached = 3,
}

impl SourceState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SourceState::Registered,
            1 => SourceState::Started,
            2 => SourceState::Suspended,
            _ => SourceState::Detached,
        }
    }
}

/// Shared control block between a [`Source`] and its render voice.
#[derive(Debug)]
pub struct SourceControl {
    id: SourceId,
    state: AtomicByte,
    gain_target: AtomicFloat,
    fade_secs: AtomicFloat,
    fade_seq: Sequence,
    reset_seq: Sequence,
}

impl SourceControl {
    fn new(id: SourceId) -> Self {
        Self {
            id,
            state: AtomicByte::new(SourceState::Registered as u8),
            gain_target: AtomicFloat::new(0.0),
            fade_secs: AtomicFloat::new(0.0),
            fade_seq: Sequence::default(),
            reset_seq: Sequence::default(),
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn state(&self) -> SourceState {
        SourceState::from_u8(self.state.get())
    }

    pub(crate) fn set_state(&self, state: SourceState) {
        self.state.set(state as u8);
    }

    /// Ramp the source gain to `target` over `secs`.
    pub fn fade_to(&self, target: f32, secs: f32) {
        self.gain_target.set(target);
        self.fade_secs.set(secs.max(0.0));
        self.fade_seq.bump();
    }

    pub fn gain_target(&self) -> f32 {
        self.gain_target.get()
    }

    pub fn request_effects_reset(&self) {
        self.reset_seq.bump();
    }
}

/// Render-side half of a source. Lives on the audio thread.
pub struct SourceVoice {
    signal: BoxedSignal,
    control: Arc<SourceControl>,
    gain: SmoothedValue,
    frames: u64,
    seen_fade: u64,
    seen_reset: u64,
}

impl SourceVoice {
    fn new(signal: BoxedSignal, control: Arc<SourceControl>) -> Self {
        Self {
            signal,
            control,
            gain: SmoothedValue::new(0.0, 0.005, 48000.0),
            frames: 0,
            seen_fade: 0,
            seen_reset: 0,
        }
    }

    pub fn id(&self) -> SourceId {
        self.control.id
    }

    pub fn state(&self) -> SourceState {
        self.control.state()
    }

    /// Current per-source gain as seen by the render thread.
    pub fn gain(&self) -> f32 {
        self.gain.current()
    }

    fn sync_control(&mut self, sample_rate: f64) {
        let fade = self.control.fade_seq.get();
        if fade != self.seen_fade {
            self.seen_fade = fade;
            self.gain.ramp_to(
                self.control.gain_target.get(),
                self.control.fade_secs.get() as f64,
                sample_rate,
            );
        }

        let reset = self.control.reset_seq.get();
        if reset != self.seen_reset {
            self.seen_reset = reset;
            self.signal.reset_effects();
        }
    }

    /// Mix this voice into `out`. Time only advances while started.
    #[inline]
    pub fn render_into(&mut self, out: &mut [f32], sample_rate: f64) {
        self.sync_control(sample_rate);
        if self.control.state() != SourceState::Started {
            return;
        }

        for sample in out.iter_mut() {
            let t = self.frames as f64 / sample_rate;
            let g = self.gain.next_sample();
            *sample += self.signal.sample(t) * g;
            self.frames += 1;
        }
    }
}

/// Control-side half shared by both source kinds.
struct SourceUnit {
    label: String,
    signal: Option<BoxedSignal>,
    control: Option<Arc<SourceControl>>,
}

impl SourceUnit {
    fn new(label: impl Into<String>, signal: BoxedSignal) -> Self {
        Self {
            label: label.into(),
            signal: Some(signal),
            control: None,
        }
    }

    fn attach(&mut self, id: SourceId) -> Result<SourceVoice> {
        let signal = self.signal.take().ok_or(Error::SourceAlreadyRegistered)?;
        let control = Arc::new(SourceControl::new(id));
        self.control = Some(Arc::clone(&control));
        Ok(SourceVoice::new(signal, control))
    }
}

/// A signal passed through a mixer and effects chain. Resetting its
/// effects clears reverb and limiter tails.
pub struct ProcessedSource {
    unit: SourceUnit,
}

impl ProcessedSource {
    pub fn new(label: impl Into<String>, signal: BoxedSignal) -> Self {
        Self {
            unit: SourceUnit::new(label, signal),
        }
    }
}

/// A raw signal played at a fixed level with no effects.
pub struct DrySource {
    unit: SourceUnit,
    level: f32,
}

impl DrySource {
    pub fn new(label: impl Into<String>, signal: BoxedSignal, level: f32) -> Self {
        Self {
            unit: SourceUnit::new(label, signal),
            level: level.clamp(0.0, 1.0),
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}

/// Closed set of source kinds the device knows how to drive.
pub enum Source {
    Processed(ProcessedSource),
    Dry(DrySource),
}

impl Source {
    pub fn processed(label: impl Into<String>, signal: BoxedSignal) -> Self {
        Source::Processed(ProcessedSource::new(label, signal))
    }

    pub fn dry(label: impl Into<String>, signal: BoxedSignal, level: f32) -> Self {
        Source::Dry(DrySource::new(label, signal, level))
    }

    fn unit(&self) -> &SourceUnit {
        match self {
            Source::Processed(s) => &s.unit,
            Source::Dry(s) => &s.unit,
        }
    }

    pub fn label(&self) -> &str {
        &self.unit().label
    }

    pub fn id(&self) -> Option<SourceId> {
        self.unit().control.as_ref().map(|c| c.id())
    }

    /// `None` until registered with a device.
    pub fn state(&self) -> Option<SourceState> {
        self.unit().control.as_ref().map(|c| c.state())
    }

    pub fn control(&self) -> Option<&Arc<SourceControl>> {
        self.unit().control.as_ref()
    }

    /// Move the signal into a render voice. Called by devices only.
    pub fn attach(&mut self, id: SourceId) -> Result<SourceVoice> {
        match self {
            Source::Processed(s) => s.unit.attach(id),
            Source::Dry(s) => s.unit.attach(id),
        }
    }

    /// Ramp from the current gain up to the source's nominal level.
    pub fn apply_fade_in(&self, secs: f32) {
        match self {
            Source::Processed(s) => {
                if let Some(control) = &s.unit.control {
                    control.fade_to(1.0, secs);
                }
            }
            Source::Dry(s) => {
                if let Some(control) = &s.unit.control {
                    control.fade_to(s.level, secs);
                }
            }
        }
    }

    /// Ramp from the current gain down to silence.
    pub fn apply_fade_out(&self, secs: f32) {
        if let Some(control) = self.control() {
            control.fade_to(0.0, secs);
        }
    }

    pub fn reset_effects_state(&self) {
        match self {
            Source::Processed(s) => {
                if let Some(control) = &s.unit.control {
                    control.request_effects_reset();
                }
            }
            // Nothing downstream of a dry signal holds a tail.
            Source::Dry(_) => {}
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Source::Processed(_) => "Processed",
            Source::Dry(_) => "Dry",
        };
        f.debug_struct("Source")
            .field("kind", &kind)
            .field("label", &self.label())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::FnSignal;

    fn ones() -> BoxedSignal {
        Box::new(FnSignal(|_t: f64| 1.0f32))
    }

    #[test]
    fn test_unregistered_source_has_no_state() {
        let source = Source::processed("bed", ones());
        assert_eq!(source.state(), None);
        assert_eq!(source.label(), "bed");
    }

    #[test]
    fn test_attach_twice_fails() {
        let mut source = Source::processed("bed", ones());
        assert!(source.attach(SourceId(1)).is_ok());
        assert!(matches!(
            source.attach(SourceId(2)),
            Err(Error::SourceAlreadyRegistered)
        ));
        assert_eq!(source.state(), Some(SourceState::Registered));
    }

    #[test]
    fn test_voice_is_silent_until_started() {
        let mut source = Source::processed("bed", ones());
        let mut voice = source.attach(SourceId(1)).unwrap();
        source.apply_fade_in(0.0);

        let mut out = [0.0f32; 8];
        voice.render_into(&mut out, 48000.0);
        assert!(out.iter().all(|s| *s == 0.0));

        source.control().unwrap().set_state(SourceState::Started);
        voice.render_into(&mut out, 48000.0);
        assert!(out.iter().all(|s| *s == 1.0));
    }

    #[test]
    fn test_dry_fade_in_targets_level() {
        let mut source = Source::dry("tone", ones(), 0.25);
        let mut voice = source.attach(SourceId(7)).unwrap();
        source.control().unwrap().set_state(SourceState::Started);
        source.apply_fade_in(0.0);

        let mut out = [0.0f32; 4];
        voice.render_into(&mut out, 48000.0);
        assert_eq!(out, [0.25; 4]);
        assert_eq!(voice.gain(), 0.25);
    }

    #[test]
    fn test_fade_out_ramps_to_silence() {
        let mut source = Source::processed("bed", ones());
        let mut voice = source.attach(SourceId(1)).unwrap();
        source.control().unwrap().set_state(SourceState::Started);
        source.apply_fade_in(0.0);
        let mut warm = [0.0f32; 1];
        voice.render_into(&mut warm, 48000.0);

        source.apply_fade_out(0.001);
        let mut out = vec![0.0f32; 96];
        voice.render_into(&mut out, 48000.0);
        assert!(out[0] > 0.0);
        assert_eq!(*out.last().unwrap(), 0.0);
        assert!(out.windows(2).all(|w| w[1] <= w[0]));
    }
}
