//! Note tables and scheduling.
//!
//! Presets store melodies as bar/beat tables. Scheduling turns each entry
//! into absolute start and duration within the loop, and shortens notes that
//! carry a breath so the next note starts from a short gap.

/// Gap inserted before the following note.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Breath {
    #[default]
    None,
    /// 80 ms.
    Short,
    /// 150 ms.
    Long,
}

impl Breath {
    pub fn secs(self) -> f64 {
        match self {
            Breath::None => 0.0,
            Breath::Short => 0.08,
            Breath::Long => 0.15,
        }
    }
}

/// Beat length and bar size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meter {
    pub beat_secs: f64,
    pub beats_per_bar: f64,
}

impl Meter {
    pub const fn new(beat_secs: f64, beats_per_bar: f64) -> Self {
        Self {
            beat_secs,
            beats_per_bar,
        }
    }

    /// Beats per minute in 3/4.
    pub fn waltz(bpm: f64) -> Self {
        Self::new(60.0 / bpm, 3.0)
    }

    pub fn bar_secs(&self) -> f64 {
        self.beat_secs * self.beats_per_bar
    }

    /// Seconds from the top of bar 1 to `beat` of `bar` (1-indexed bars).
    pub fn position(&self, bar: u32, beat: f64) -> f64 {
        bar.saturating_sub(1) as f64 * self.bar_secs() + beat * self.beat_secs
    }

    pub fn bars(&self, count: u32) -> f64 {
        count as f64 * self.bar_secs()
    }
}

/// One entry of a note table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub freq: f64,
    /// 1-indexed.
    pub bar: u32,
    pub beat: f64,
    pub beats: f64,
    pub breath: Breath,
    /// Overrides the layer gain (and skips any high-frequency taper).
    pub gain: Option<f32>,
    /// Sag to 30% over the second half of the note.
    pub fade_out: bool,
    pub decay_scale: f64,
}

impl Note {
    pub const fn new(freq: f64, bar: u32, beat: f64, beats: f64) -> Self {
        Self {
            freq,
            bar,
            beat,
            beats,
            breath: Breath::None,
            gain: None,
            fade_out: false,
            decay_scale: 1.0,
        }
    }

    pub const fn breath(mut self, breath: Breath) -> Self {
        self.breath = breath;
        self
    }

    pub const fn gain(mut self, gain: f32) -> Self {
        self.gain = Some(gain);
        self
    }

    pub const fn fading(mut self) -> Self {
        self.fade_out = true;
        self
    }

    pub const fn decay_scale(mut self, scale: f64) -> Self {
        self.decay_scale = scale;
        self
    }

    /// Place the note on the timeline. The effective duration is fixed here
    /// and used for both the active window and the envelope.
    pub fn schedule(&self, meter: &Meter, attack: f64) -> ScheduledNote {
        let nominal = self.beats * meter.beat_secs;
        ScheduledNote {
            start: meter.position(self.bar, self.beat),
            duration: effective_duration(nominal, self.breath.secs(), attack),
            freq: self.freq,
            gain: self.gain,
            fade_out: self.fade_out,
            decay_scale: self.decay_scale,
        }
    }
}

/// A note with absolute timing, ready for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledNote {
    pub start: f64,
    /// Effective (breath-shortened) duration.
    pub duration: f64,
    pub freq: f64,
    pub gain: Option<f32>,
    pub fade_out: bool,
    pub decay_scale: f64,
}

impl ScheduledNote {
    pub fn transposed(mut self, semitones: f64) -> Self {
        self.freq = transpose(self.freq, semitones);
        self
    }
}

/// `breath > 0 ⇒ max(duration - breath, attack)`, otherwise `duration`.
#[inline]
pub fn effective_duration(duration: f64, breath: f64, attack: f64) -> f64 {
    if breath > 0.0 {
        (duration - breath).max(attack)
    } else {
        duration
    }
}

/// Equal-tempered shift.
#[inline]
pub fn transpose(freq: f64, semitones: f64) -> f64 {
    freq * 2f64.powf(semitones / 12.0)
}

/// Schedule a whole table, sorted by start time.
pub fn schedule(notes: &[Note], meter: &Meter, attack: f64) -> Vec<ScheduledNote> {
    let mut scheduled: Vec<ScheduledNote> =
        notes.iter().map(|n| n.schedule(meter, attack)).collect();
    scheduled.sort_by(|a, b| a.start.total_cmp(&b.start));
    scheduled
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_breath_shortens_down_to_attack() {
        assert_relative_eq!(effective_duration(1.0, 0.15, 0.15), 0.85);
        assert_relative_eq!(effective_duration(0.2, 0.15, 0.15), 0.15);
        assert_relative_eq!(effective_duration(1.0, 0.0, 0.15), 1.0);
    }

    #[test]
    fn test_meter_positions() {
        let meter = Meter::waltz(60.0);
        assert_relative_eq!(meter.bar_secs(), 3.0);
        assert_relative_eq!(meter.position(2, 1.5), 4.5);
        assert_relative_eq!(meter.position(1, 0.0), 0.0);
    }

    #[test]
    fn test_schedule_applies_breath_once() {
        let meter = Meter::new(1.0, 3.0);
        let note = Note::new(440.0, 5, 0.0, 2.0).breath(Breath::Long);
        let scheduled = note.schedule(&meter, 0.15);
        assert_relative_eq!(scheduled.start, 12.0);
        assert_relative_eq!(scheduled.duration, 1.85);
    }

    #[test]
    fn test_schedule_sorts_by_start() {
        let meter = Meter::new(1.0, 3.0);
        let notes = [
            Note::new(440.0, 2, 0.0, 1.0),
            Note::new(330.0, 1, 2.0, 1.0),
        ];
        let scheduled = schedule(&notes, &meter, 0.1);
        assert!(scheduled[0].start < scheduled[1].start);
    }

    #[test]
    fn test_transpose_down_whole_tone() {
        assert_relative_eq!(transpose(440.0, -2.0), 391.995, epsilon = 1e-3);
    }
}
