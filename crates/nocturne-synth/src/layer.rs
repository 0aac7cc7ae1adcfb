//! Looping melodic layers and timbre cross-fades.

use crate::note::ScheduledNote;
use crate::timbre::{HighFreqTaper, Timbre};
use nocturne_core::Signal;
use nocturne_dsp::Envelope;
use std::f64::consts::PI;

/// Linear 0→1 blend over `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossfade {
    pub start: f64,
    pub duration: f64,
}

impl Crossfade {
    pub const fn new(start: f64, duration: f64) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// 0 before the fade, 1 after it.
    #[inline]
    pub fn blend(&self, position: f64) -> f64 {
        if position < self.start {
            0.0
        } else if position >= self.end() || self.duration <= 0.0 {
            1.0
        } else {
            (position - self.start) / self.duration
        }
    }
}

/// Sag applied to `fade_out` notes: flat for the first half, then a cosine
/// glide down to 30%.
#[inline]
pub fn sustain_sag(progress: f64) -> f32 {
    if progress <= 0.5 {
        return 1.0;
    }
    let fade = ((progress - 0.5) * 2.0).min(1.0);
    (0.3 + 0.7 * (1.0 + (fade * PI).cos()) / 2.0) as f32
}

/// A note table looping every `cycle` seconds, one timbre, one envelope.
///
/// Every note whose window `[start, start + duration + release)` contains
/// the loop position contributes, so release tails overlap the next note.
#[derive(Debug, Clone)]
pub struct MelodicLayer {
    notes: Vec<ScheduledNote>,
    timbre: Timbre,
    envelope: Envelope,
    gain: f32,
    taper: Option<HighFreqTaper>,
    cycle: f64,
}

impl MelodicLayer {
    /// `notes` must be sorted by start; [`crate::note::schedule`] does that.
    pub fn new(notes: Vec<ScheduledNote>, timbre: Timbre, envelope: Envelope, cycle: f64) -> Self {
        Self {
            notes,
            timbre,
            envelope,
            gain: 1.0,
            taper: None,
            cycle,
        }
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_taper(mut self, taper: HighFreqTaper) -> Self {
        self.taper = Some(taper);
        self
    }

    pub fn notes(&self) -> &[ScheduledNote] {
        &self.notes
    }

    pub fn cycle(&self) -> f64 {
        self.cycle
    }

    /// Number of notes sounding at loop position `position`.
    pub fn active_count(&self, position: f64) -> usize {
        let upto = self.notes.partition_point(|n| n.start <= position);
        self.notes[..upto]
            .iter()
            .filter(|n| position < n.start + self.envelope.active_until(n.duration))
            .count()
    }

    fn note_gain(&self, note: &ScheduledNote) -> f32 {
        match note.gain {
            Some(gain) => gain,
            None => self.gain * self.taper.map_or(1.0, |taper| taper.gain(note.freq)),
        }
    }

    /// Sum of all notes sounding at loop position `position`.
    pub fn render_at(&self, position: f64) -> f32 {
        let upto = self.notes.partition_point(|n| n.start <= position);
        let mut value = 0.0;
        for note in &self.notes[..upto] {
            if position >= note.start + self.envelope.active_until(note.duration) {
                continue;
            }
            let dt = position - note.start;
            let mut env = self
                .envelope
                .with_decay_scale(note.decay_scale)
                .gain(dt, note.duration);
            if env == 0.0 {
                continue;
            }
            if note.fade_out && note.duration > 0.0 {
                env *= sustain_sag(dt / note.duration);
            }
            value += self.timbre.sample(note.freq, position, dt) * env * self.note_gain(note);
        }
        value
    }
}

impl Signal for MelodicLayer {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        let position = if self.cycle > 0.0 {
            t.rem_euclid(self.cycle)
        } else {
            t
        };
        self.render_at(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::{schedule, Breath, Meter, Note};
    use approx::assert_relative_eq;

    fn layer(notes: &[Note], release: f64) -> MelodicLayer {
        let meter = Meter::new(1.0, 3.0);
        MelodicLayer::new(
            schedule(notes, &meter, 0.1),
            Timbre::Sine,
            Envelope::asr(0.1, release),
            9.0,
        )
    }

    #[test]
    fn test_crossfade_blend() {
        let fade = Crossfade::new(4.0, 2.0);
        assert_eq!(fade.blend(3.9), 0.0);
        assert_relative_eq!(fade.blend(5.0), 0.5);
        assert_eq!(fade.blend(6.0), 1.0);
    }

    #[test]
    fn test_release_tails_overlap() {
        let layer = layer(
            &[Note::new(440.0, 1, 0.0, 1.0), Note::new(660.0, 1, 1.0, 1.0)],
            0.5,
        );
        assert_eq!(layer.active_count(0.5), 1);
        assert_eq!(layer.active_count(1.2), 2);
        assert_eq!(layer.active_count(1.6), 1);
        assert_eq!(layer.active_count(2.6), 0);
    }

    #[test]
    fn test_breath_window_matches_envelope() {
        let layer = layer(&[Note::new(440.0, 1, 0.0, 1.0).breath(Breath::Long)], 0.0);
        assert_eq!(layer.active_count(0.84), 1);
        assert_eq!(layer.active_count(0.86), 0);
        assert_eq!(layer.render_at(0.86), 0.0);
    }

    #[test]
    fn test_loops_every_cycle() {
        let mut layer = layer(&[Note::new(440.0, 1, 0.0, 2.0)], 0.2);
        let first = layer.sample(0.731);
        let again = layer.sample(9.731);
        assert_relative_eq!(first, again, epsilon = 1e-4);
        assert_eq!(layer.sample(12.0), 0.0);
    }

    #[test]
    fn test_custom_gain_skips_taper() {
        let meter = Meter::new(1.0, 3.0);
        let notes = schedule(
            &[Note::new(1200.0, 1, 0.0, 1.0), Note::new(1200.0, 2, 0.0, 1.0).gain(0.5)],
            &meter,
            0.1,
        );
        let layer = MelodicLayer::new(notes, Timbre::Sine, Envelope::asr(0.1, 0.1), 6.0)
            .with_gain(0.5)
            .with_taper(HighFreqTaper::new(600.0, 1200.0, 0.5));
        assert_relative_eq!(layer.note_gain(&layer.notes()[0]), 0.25);
        assert_relative_eq!(layer.note_gain(&layer.notes()[1]), 0.5);
    }

    #[test]
    fn test_sustain_sag() {
        assert_eq!(sustain_sag(0.25), 1.0);
        assert_relative_eq!(sustain_sag(0.75), 0.65, epsilon = 1e-6);
        assert_relative_eq!(sustain_sag(1.0), 0.3, epsilon = 1e-6);
    }
}
