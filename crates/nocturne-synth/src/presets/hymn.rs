//! The 25-bar hymn behind `JupiterHymn`, `CathedralStillness` and
//! `AcousticJupiter`.
//!
//! Both styles share one melody, an organ drone and a handful of chime
//! accents. They differ in how real time maps onto the score:
//!
//! - Jupiter plays a 0.5 s lead-in, skips the two-beat intro rest on every
//!   pass, eases back from 1.2× to 1.0× through the last section, then
//!   holds 1 s of tail before looping.
//! - Cathedral skips the intro rest on the first pass only and stays at
//!   1.2× from section 3 to the end.
//!
//! Every layer reads its position from a [`HymnClock`], so the drone swells
//! and the chimes brighten with the sections regardless of tempo.

use crate::layer::{Crossfade, MelodicLayer};
use crate::note::{schedule, Breath, Meter, Note, ScheduledNote};
use crate::presets::chime::ChimeStrike;
use crate::tempo::{SectionMap, TempoMap};
use crate::timbre::{HighFreqTaper, Timbre, CLARINET, ORGAN, TRUMPET};
use nocturne_core::Signal;
use nocturne_dsp::{
    phase_wrapped_sine, soft_clip, tanh_saturate, AttackCurve, CombTuning, Envelope, ReverbParams,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::f64::consts::FRAC_PI_2;

const E4: f64 = 329.63;
const G4: f64 = 392.00;
const A4: f64 = 440.00;
const B4: f64 = 493.88;
const C5: f64 = 523.25;
const D5: f64 = 587.33;
const E5: f64 = 659.25;
const G5: f64 = 783.99;
const A5: f64 = 880.00;
const B5: f64 = 987.77;
const C6: f64 = 1046.50;
const D6: f64 = 1174.66;
const E6: f64 = 1318.51;

const BEAT_SECS: f64 = 1.0;
const TOTAL_BARS: u32 = 25;
const SECTION_BARS: [u32; 6] = [1, 5, 9, 13, 17, 21];
/// Musical length of the whole score.
pub const SCORE_SECS: f64 = 75.0;
const INTRO_REST: f64 = 2.0 * BEAT_SECS;
const LEAD_IN: f64 = 0.5;
const TAIL: f64 = 1.0;

const TRANSPOSE: f64 = -2.0;
const ATTACK: f64 = 0.15;
const RELEASE: f64 = 0.18;
const GYMNO_ATTACK: f64 = 0.35;
const GYMNO_DECAY: f64 = 4.5;
const GYMNO_RELEASE: f64 = 0.5;
const GYMNO_DETUNE: f64 = 0.1;
const VOICE_GAIN: f32 = 0.22;
const GYMNO_GAIN: f32 = 0.28;
const VIBRATO_RATE: f64 = 4.0;
const VIBRATO_DEPTH: f64 = 0.001;
const CLARINET_CLIMAX: f32 = 1.1;
const MELODY_CLIP: f32 = 0.8;

const PLUCK_ATTACK: f64 = 0.008;
const PLUCK_DECAY: f64 = 2.5;
const PLUCK_END_FADE: f64 = 0.06;
const PLUCK_GAIN: f32 = 0.35;
const PLUCK_HIGH_HZ: f64 = 600.0;
const PLUCK_HIGH_GAIN: f32 = 0.85;

const DRONE_ROOT: f64 = 130.81;
const DRONE_FIFTH: f64 = 196.00;
const DRONE_PARTIALS: [(f64, f64); 4] = [(1.0, 0.9), (2.0, 0.4), (3.0, 0.25), (4.0, 0.15)];
const DRONE_LFO_HZ: f64 = 0.02;
const DRONE_LEVEL: f64 = 0.12;

/// Real seconds into a loop at which chimes ring.
pub const CHIME_TIMES: [f64; 8] = [15.0, 25.0, 30.0, 38.0, 48.0, 55.0, 62.0, 68.0];
const CHIME_BASE_HZ: f64 = 6000.0;
const CHIME_LEVEL: f32 = 0.03;
const CHIME_DISTANT: f32 = 0.1;

#[rustfmt::skip]
const MELODY: &[Note] = &[
    Note::new(E4, 1, 2.0, 0.5), Note::new(G4, 1, 2.5, 0.5),
    Note::new(A4, 2, 0.0, 1.0).breath(Breath::Short), Note::new(A4, 2, 1.0, 0.5),
    Note::new(C5, 2, 1.5, 0.5), Note::new(B4, 2, 2.0, 0.75), Note::new(G4, 2, 2.75, 0.25),
    Note::new(C5, 3, 0.0, 0.5), Note::new(D5, 3, 0.5, 0.5), Note::new(C5, 3, 1.0, 1.0), Note::new(B4, 3, 2.0, 1.0),
    Note::new(A4, 4, 0.0, 0.5), Note::new(B4, 4, 0.5, 0.5), Note::new(A4, 4, 1.0, 1.0), Note::new(G4, 4, 2.0, 1.0),

    Note::new(E4, 5, 0.0, 2.0).breath(Breath::Long), Note::new(E4, 5, 2.0, 0.5), Note::new(G4, 5, 2.5, 0.5),
    Note::new(A4, 6, 0.0, 1.0).breath(Breath::Long), Note::new(A4, 6, 1.0, 0.5),
    Note::new(C5, 6, 1.5, 0.5), Note::new(B4, 6, 2.0, 0.75), Note::new(G4, 6, 2.75, 0.25),
    Note::new(C5, 7, 0.0, 0.5), Note::new(D5, 7, 0.5, 0.5),
    Note::new(E5, 7, 1.0, 1.0).breath(Breath::Short), Note::new(E5, 7, 2.0, 1.0).breath(Breath::Short),
    Note::new(E5, 8, 0.0, 0.5), Note::new(D5, 8, 0.5, 0.5), Note::new(C5, 8, 1.0, 1.0), Note::new(D5, 8, 2.0, 1.0),

    Note::new(C5, 9, 0.0, 2.0).breath(Breath::Long), Note::new(G5, 9, 2.0, 0.5), Note::new(E5, 9, 2.5, 0.5),
    Note::new(D5, 10, 0.0, 1.0).breath(Breath::Short), Note::new(D5, 10, 1.0, 1.0),
    Note::new(C5, 10, 2.0, 0.5), Note::new(E5, 10, 2.5, 0.5),
    Note::new(D5, 11, 0.0, 1.0), Note::new(G4, 11, 1.0, 1.0).breath(Breath::Short),
    Note::new(G5, 11, 2.0, 0.5), Note::new(E5, 11, 2.5, 0.5),
    Note::new(D5, 12, 0.0, 1.0).breath(Breath::Short), Note::new(D5, 12, 1.0, 1.0),
    Note::new(E5, 12, 2.0, 0.5), Note::new(G5, 12, 2.5, 0.5).breath(Breath::Short),

    Note::new(A5, 13, 0.0, 2.0).breath(Breath::Long), Note::new(A5, 13, 2.0, 0.5), Note::new(B5, 13, 2.5, 0.5),
    Note::new(C6, 14, 0.0, 1.0), Note::new(B5, 14, 1.0, 1.0), Note::new(A5, 14, 2.0, 1.0),
    Note::new(G5, 15, 0.0, 1.0), Note::new(C6, 15, 1.0, 1.0), Note::new(E5, 15, 2.0, 1.0),
    Note::new(D5, 16, 0.0, 0.5), Note::new(C5, 16, 0.5, 0.5), Note::new(D5, 16, 1.0, 1.0), Note::new(E5, 16, 2.0, 1.0),

    Note::new(G5, 17, 0.0, 2.0).breath(Breath::Long), Note::new(E5, 17, 2.0, 0.5),
    Note::new(G5, 17, 2.5, 0.5).breath(Breath::Short),
    Note::new(A5, 18, 0.0, 1.0).breath(Breath::Short), Note::new(A5, 18, 1.0, 0.5),
    Note::new(C6, 18, 1.5, 0.5), Note::new(B5, 18, 2.0, 0.75), Note::new(G5, 18, 2.75, 0.25),
    Note::new(C6, 19, 0.0, 0.5), Note::new(D6, 19, 0.5, 0.5),
    Note::new(C6, 19, 1.0, 1.0).breath(Breath::Short), Note::new(B5, 19, 2.0, 1.0),
    Note::new(A5, 20, 0.0, 0.5), Note::new(B5, 20, 0.5, 0.5), Note::new(A5, 20, 1.0, 1.0), Note::new(G5, 20, 2.0, 1.0),

    Note::new(E5, 21, 0.0, 2.0).breath(Breath::Long), Note::new(E5, 21, 2.0, 0.5),
    Note::new(G5, 21, 2.5, 0.5).breath(Breath::Short),
    Note::new(A5, 22, 0.0, 1.0).breath(Breath::Short), Note::new(A5, 22, 1.0, 0.5),
    Note::new(C6, 22, 1.5, 0.5), Note::new(B5, 22, 2.0, 0.75),
    Note::new(G5, 22, 2.75, 0.25).breath(Breath::Short),
    Note::new(C6, 23, 0.0, 0.5), Note::new(D6, 23, 0.5, 0.5),
    Note::new(E6, 23, 1.0, 1.0).breath(Breath::Short), Note::new(E6, 23, 2.0, 1.0).breath(Breath::Short),
    Note::new(E6, 24, 0.0, 0.5), Note::new(D6, 24, 0.5, 0.5), Note::new(C6, 24, 1.0, 1.0), Note::new(D6, 24, 2.0, 1.0),
    Note::new(C6, 25, 0.0, 3.0),
];

/// Which arrangement of the hymn to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HymnStyle {
    Jupiter,
    Cathedral,
}

impl HymnStyle {
    /// Section progress at which the clarinet starts to fade, and the span
    /// over which it reaches silence.
    fn clarinet_fade(self) -> (f64, f64) {
        match self {
            HymnStyle::Jupiter => (0.3, 0.7),
            HymnStyle::Cathedral => (0.8, 0.2),
        }
    }

    /// Drone level for a section and the progress through it.
    pub fn drone_volume(self, section: usize, progress: f64) -> f64 {
        match (self, section) {
            (HymnStyle::Jupiter, 0) => 0.0,
            (HymnStyle::Jupiter, 1) => (progress * FRAC_PI_2).sin().powi(2),
            (HymnStyle::Jupiter, 5) => {
                if progress < 0.2 {
                    1.0
                } else if progress < 0.8 {
                    ((progress - 0.2) / 0.6 * FRAC_PI_2).cos().powi(2)
                } else {
                    0.0
                }
            }
            (HymnStyle::Jupiter, _) => 1.0,
            (HymnStyle::Cathedral, 0) => 0.3,
            (HymnStyle::Cathedral, 1) => 0.3 + 0.7 * progress,
            (HymnStyle::Cathedral, _) => 1.0,
        }
    }

    pub fn reverb(self) -> ReverbParams {
        match self {
            HymnStyle::Jupiter => ReverbParams {
                room_size: 1.4,
                damping: 0.4,
                decay: 0.84,
                mix: 0.45,
                pre_delay: 0.03,
                comb_tuning: CombTuning::Standard,
            },
            HymnStyle::Cathedral => ReverbParams {
                room_size: 2.2,
                damping: 0.35,
                decay: 0.88,
                mix: 0.55,
                pre_delay: 0.04,
                comb_tuning: CombTuning::Standard,
            },
        }
    }
}

/// Chime gain for a trigger landing in `section` at `progress`.
pub fn chime_section_gain(section: usize, progress: f64) -> f32 {
    match section {
        0 | 1 => CHIME_DISTANT,
        2 => 0.6,
        3 | 4 => 0.8,
        _ if progress < 0.8 => 1.0,
        _ => {
            let fade = ((progress - 0.8) / 0.2 * FRAC_PI_2).cos().powi(2) as f32;
            CHIME_DISTANT + (1.0 - CHIME_DISTANT) * fade
        }
    }
}

/// Maps elapsed real time to a position in the score.
#[derive(Debug, Clone)]
pub struct HymnClock {
    style: HymnStyle,
    /// Starts after the intro rest.
    skipped: TempoMap,
    /// Starts at the top of bar 1.
    full: TempoMap,
    sections: SectionMap,
}

impl HymnClock {
    pub fn new(style: HymnStyle) -> Self {
        let (skipped, full) = match style {
            HymnStyle::Jupiter => {
                let tail = |map: TempoMap| {
                    map.constant(12.0, 1.0)
                        .constant(12.0, 1.1)
                        .constant(24.0, 1.2)
                        .ramp(15.0, 1.2, 1.0)
                };
                (
                    tail(TempoMap::starting_at(INTRO_REST).constant(12.0 - INTRO_REST, 0.8)),
                    tail(TempoMap::starting_at(0.0).constant(12.0, 0.8)),
                )
            }
            HymnStyle::Cathedral => {
                let tail = |map: TempoMap| {
                    map.constant(12.0, 1.0)
                        .constant(12.0, 1.1)
                        .constant(39.0, 1.2)
                };
                (
                    tail(TempoMap::starting_at(INTRO_REST).constant(12.0 - INTRO_REST, 0.8)),
                    tail(TempoMap::starting_at(0.0).constant(12.0, 0.8)),
                )
            }
        };
        let meter = Meter::new(BEAT_SECS, 3.0);
        Self {
            style,
            skipped,
            full,
            sections: SectionMap::new(meter.bar_secs(), TOTAL_BARS, SECTION_BARS.to_vec()),
        }
    }

    pub fn style(&self) -> HymnStyle {
        self.style
    }

    pub fn sections(&self) -> &SectionMap {
        &self.sections
    }

    /// Length of the first pass through the loop.
    pub fn first_cycle(&self) -> f64 {
        match self.style {
            HymnStyle::Jupiter => self.cycle(),
            HymnStyle::Cathedral => self.skipped.real_duration(),
        }
    }

    /// Length of every later pass.
    pub fn cycle(&self) -> f64 {
        match self.style {
            HymnStyle::Jupiter => LEAD_IN + self.skipped.real_duration() + TAIL,
            HymnStyle::Cathedral => self.full.real_duration(),
        }
    }

    /// Real seconds into the current pass, and whether it is the first.
    pub fn locate(&self, t: f64) -> (f64, bool) {
        let first = self.first_cycle();
        if t < first {
            (t.max(0.0), true)
        } else {
            ((t - first).rem_euclid(self.cycle()), false)
        }
    }

    /// Musical position `real` seconds into a pass.
    pub fn musical_in_pass(&self, real: f64, first_pass: bool) -> f64 {
        match self.style {
            HymnStyle::Jupiter => {
                if real < LEAD_IN {
                    INTRO_REST + (real - LEAD_IN)
                } else {
                    self.skipped.to_musical(real - LEAD_IN)
                }
            }
            HymnStyle::Cathedral if first_pass => self.skipped.to_musical(real),
            HymnStyle::Cathedral => self.full.to_musical(real),
        }
    }

    pub fn musical_at(&self, t: f64) -> f64 {
        let (real, first) = self.locate(t);
        self.musical_in_pass(real, first)
    }
}

/// The melody line: a detuned "gymnopédie" voice that cross-fades into an
/// organ at bar 2, turns to trumpet at bar 17 and clarinet at bar 21.
#[derive(Debug, Clone)]
pub struct HymnMelody {
    clock: HymnClock,
    notes: Vec<ScheduledNote>,
    gymno: Envelope,
    crossfade: Crossfade,
    trumpet_from: f64,
    clarinet_from: f64,
    taper: HighFreqTaper,
}

impl HymnMelody {
    pub fn new(style: HymnStyle) -> Self {
        let meter = Meter::new(BEAT_SECS, 3.0);
        let notes = schedule(MELODY, &meter, ATTACK)
            .into_iter()
            .map(|note| note.transposed(TRANSPOSE))
            .collect();
        Self {
            clock: HymnClock::new(style),
            notes,
            gymno: Envelope::adr(GYMNO_ATTACK, GYMNO_DECAY, GYMNO_RELEASE),
            crossfade: Crossfade::new(meter.position(2, 1.0), 2.0 * BEAT_SECS),
            trumpet_from: meter.position(17, 2.0),
            clarinet_from: meter.position(21, 2.0),
            taper: HighFreqTaper::new(600.0, C6, 0.35),
        }
    }

    pub fn clock(&self) -> &HymnClock {
        &self.clock
    }

    pub fn notes(&self) -> &[ScheduledNote] {
        &self.notes
    }

    /// Voice used once the organ has fully faded in.
    fn solo_timbre(&self, note: &ScheduledNote) -> Timbre {
        if note.start < self.trumpet_from {
            Timbre::harmonic(ORGAN, VIBRATO_RATE, VIBRATO_DEPTH)
        } else if note.start < self.clarinet_from {
            Timbre::harmonic(TRUMPET, VIBRATO_RATE, VIBRATO_DEPTH * 1.5)
        } else {
            Timbre::harmonic(CLARINET, VIBRATO_RATE, VIBRATO_DEPTH)
        }
    }

    fn clarinet_gain(&self, progress: f64) -> f32 {
        let (from, span) = self.clock.style.clarinet_fade();
        if progress < from {
            CLARINET_CLIMAX
        } else {
            let fade = ((progress - from) / span * FRAC_PI_2).cos().powi(2);
            CLARINET_CLIMAX * fade as f32
        }
    }

    /// Melody at score position `local`; `t` drives the oscillator phase.
    pub fn render(&self, local: f64, t: f64, section_progress: f64) -> f32 {
        let blend = self.crossfade.blend(local);
        let release = if blend < 1.0 { GYMNO_RELEASE } else { RELEASE };
        let voice = Envelope::asr(ATTACK, release);
        let gymno_voice = Timbre::Detuned { spread: GYMNO_DETUNE };

        let upto = self.notes.partition_point(|n| n.start <= local);
        let mut value = 0.0;
        for note in &self.notes[..upto] {
            let dt = local - note.start;
            if dt >= note.duration + release {
                continue;
            }
            let taper = self.taper.gain(note.freq);

            if blend < 1.0 {
                let gymno_env = self.gymno.gain(dt, note.duration);
                let gymno = gymno_voice.sample(note.freq, t, dt) * gymno_env * GYMNO_GAIN;
                value += gymno * (1.0 - blend) as f32;
                if blend > 0.0 {
                    let organ = Timbre::harmonic(ORGAN, VIBRATO_RATE, VIBRATO_DEPTH);
                    let env = voice.gain(dt, note.duration);
                    value += organ.sample(note.freq, t, dt) * env * taper * VOICE_GAIN * blend as f32;
                }
                continue;
            }

            let mut gain = taper * VOICE_GAIN;
            if note.start >= self.clarinet_from {
                gain *= self.clarinet_gain(section_progress);
            }
            let env = voice.gain(dt, note.duration);
            value += self.solo_timbre(note).sample(note.freq, t, dt) * env * gain;
        }
        soft_clip(value, MELODY_CLIP)
    }
}

impl Signal for HymnMelody {
    fn sample(&mut self, t: f64) -> f32 {
        let musical = self.clock.musical_at(t);
        let (_, progress) = self.clock.sections.locate(musical);
        self.render(musical.rem_euclid(SCORE_SECS), t, progress)
    }
}

/// The Jupiter melody alone on a plucked guitar, following the Jupiter
/// clock. Notes end at their breath with no release tail.
#[derive(Debug, Clone)]
pub struct AcousticHymn {
    clock: HymnClock,
    layer: MelodicLayer,
}

impl AcousticHymn {
    pub fn new() -> Self {
        let meter = Meter::new(BEAT_SECS, 3.0);
        let notes = schedule(MELODY, &meter, PLUCK_ATTACK)
            .into_iter()
            .map(|note| {
                let mut note = note.transposed(TRANSPOSE);
                let high = if note.freq > PLUCK_HIGH_HZ { PLUCK_HIGH_GAIN } else { 1.0 };
                note.gain = Some(PLUCK_GAIN * high);
                note
            })
            .collect();
        let envelope = Envelope::adr(PLUCK_ATTACK, PLUCK_DECAY, 0.0)
            .with_curve(AttackCurve::Pluck)
            .with_end_fade(PLUCK_END_FADE);
        let guitar = Timbre::Plucked {
            brightness: 1.0,
            noise: 0.025,
        };
        Self {
            clock: HymnClock::new(HymnStyle::Jupiter),
            layer: MelodicLayer::new(notes, guitar, envelope, SCORE_SECS),
        }
    }

    pub fn clock(&self) -> &HymnClock {
        &self.clock
    }

    pub fn notes(&self) -> &[ScheduledNote] {
        self.layer.notes()
    }
}

impl Default for AcousticHymn {
    fn default() -> Self {
        Self::new()
    }
}

impl Signal for AcousticHymn {
    fn sample(&mut self, t: f64) -> f32 {
        let musical = self.clock.musical_at(t).rem_euclid(SCORE_SECS);
        tanh_saturate(self.layer.render_at(musical), 1.0, 0.9)
    }
}

/// Root-and-fifth organ drone breathing on a 50 s LFO, shaped by section.
#[derive(Debug, Clone)]
pub struct HymnDrone {
    clock: HymnClock,
}

impl HymnDrone {
    pub fn new(style: HymnStyle) -> Self {
        Self {
            clock: HymnClock::new(style),
        }
    }

    pub fn volume_at(&self, t: f64) -> f64 {
        let (section, progress) = self.clock.sections.locate(self.clock.musical_at(t));
        self.clock.style.drone_volume(section, progress)
    }
}

impl Signal for HymnDrone {
    fn sample(&mut self, t: f64) -> f32 {
        let volume = self.volume_at(t);
        if volume <= 0.0 {
            return 0.0;
        }
        let breath = 0.6 + 0.2 * phase_wrapped_sine(DRONE_LFO_HZ, t, 0.0) as f64;
        let tone: f64 = DRONE_PARTIALS
            .iter()
            .map(|&(h, amp)| {
                amp * 0.5 * phase_wrapped_sine(DRONE_ROOT * h, t, 0.0) as f64
                    + amp * 0.35 * phase_wrapped_sine(DRONE_FIFTH * h, t, 0.0) as f64
            })
            .sum();
        (tone * breath * DRONE_LEVEL * volume) as f32
    }
}

/// Tree-chime accents at fixed points of each pass, quiet early on and
/// brightest in the last section.
#[derive(Debug, Clone)]
pub struct HymnChimes {
    clock: HymnClock,
    strikes: [ChimeStrike; CHIME_TIMES.len()],
}

impl HymnChimes {
    pub fn new(style: HymnStyle, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let strikes = std::array::from_fn(|_| ChimeStrike::new(CHIME_BASE_HZ, &mut rng));
        Self {
            clock: HymnClock::new(style),
            strikes,
        }
    }

    /// Gain of the chime struck `at` seconds into a pass.
    pub fn trigger_gain(&self, at: f64, first_pass: bool) -> f32 {
        let musical = self.clock.musical_in_pass(at, first_pass);
        let (section, progress) = self.clock.sections.locate(musical);
        chime_section_gain(section, progress)
    }
}

impl Signal for HymnChimes {
    fn sample(&mut self, t: f64) -> f32 {
        let (real, first) = self.clock.locate(t);
        let mut value = 0.0;
        for (&at, strike) in CHIME_TIMES.iter().zip(self.strikes.iter()) {
            let since = real - at;
            if (0.0..ChimeStrike::RING_SECS).contains(&since) {
                value += strike.sample(since) * self.trigger_gain(at, first);
            }
        }
        value * CHIME_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_jupiter_cycle_length() {
        let clock = HymnClock::new(HymnStyle::Jupiter);
        let music = 10.0 / 0.8 + 12.0 + 12.0 / 1.1 + 24.0 / 1.2 + 15.0 / 1.1;
        assert_relative_eq!(clock.cycle(), LEAD_IN + music + TAIL, epsilon = 1e-9);
        assert_relative_eq!(clock.first_cycle(), clock.cycle());
    }

    #[test]
    fn test_jupiter_lead_in_and_tail() {
        let clock = HymnClock::new(HymnStyle::Jupiter);
        assert_relative_eq!(clock.musical_at(0.0), 1.5);
        assert_relative_eq!(clock.musical_at(LEAD_IN), INTRO_REST);
        assert_relative_eq!(clock.musical_at(clock.cycle() - 0.1), SCORE_SECS);
        assert_relative_eq!(clock.musical_at(clock.cycle()), 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_cathedral_skips_intro_once() {
        let clock = HymnClock::new(HymnStyle::Cathedral);
        let first = clock.first_cycle();
        assert_relative_eq!(first, 10.0 / 0.8 + 12.0 + 12.0 / 1.1 + 39.0 / 1.2, epsilon = 1e-9);
        assert_relative_eq!(clock.cycle(), first + 2.0 / 0.8, epsilon = 1e-9);
        assert_relative_eq!(clock.musical_at(0.0), INTRO_REST);
        assert_relative_eq!(clock.musical_at(first), 0.0);
        assert_relative_eq!(clock.musical_at(first + 2.5), INTRO_REST, epsilon = 1e-9);
    }

    #[test]
    fn test_drone_volumes() {
        assert_eq!(HymnStyle::Jupiter.drone_volume(0, 0.5), 0.0);
        assert_relative_eq!(HymnStyle::Jupiter.drone_volume(1, 0.5), 0.5, epsilon = 1e-12);
        assert_eq!(HymnStyle::Jupiter.drone_volume(5, 0.1), 1.0);
        assert_relative_eq!(HymnStyle::Jupiter.drone_volume(5, 0.5), 0.5, epsilon = 1e-12);
        assert_eq!(HymnStyle::Jupiter.drone_volume(5, 0.9), 0.0);
        assert_relative_eq!(HymnStyle::Cathedral.drone_volume(0, 0.0), 0.3);
        assert_relative_eq!(HymnStyle::Cathedral.drone_volume(1, 0.5), 0.65);
    }

    #[test]
    fn test_drone_silent_in_jupiter_opening() {
        let mut drone = HymnDrone::new(HymnStyle::Jupiter);
        for i in 0..1000 {
            assert_eq!(drone.sample(i as f64 * 0.01), 0.0);
        }
    }

    #[test]
    fn test_chime_section_gain() {
        assert_relative_eq!(chime_section_gain(0, 0.5), 0.1);
        assert_relative_eq!(chime_section_gain(2, 0.0), 0.6);
        assert_relative_eq!(chime_section_gain(4, 0.9), 0.8);
        assert_relative_eq!(chime_section_gain(5, 0.5), 1.0);
        assert_relative_eq!(chime_section_gain(5, 1.0), 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_first_chime_is_distant() {
        let chimes = HymnChimes::new(HymnStyle::Jupiter, 42);
        assert_relative_eq!(chimes.trigger_gain(15.0, true), 0.1);
        assert!(chimes.trigger_gain(48.0, true) >= 0.8);
    }

    #[test]
    fn test_melody_is_transposed_and_starts_after_rest() {
        let melody = HymnMelody::new(HymnStyle::Jupiter);
        let first = melody.notes()[0];
        assert_relative_eq!(first.start, INTRO_REST);
        assert_relative_eq!(first.freq, E4 * 2f64.powf(-2.0 / 12.0), epsilon = 1e-9);
        assert_eq!(melody.render(1.9, 1.9, 0.0), 0.0);
    }

    #[test]
    fn test_timbre_switch_points() {
        let melody = HymnMelody::new(HymnStyle::Jupiter);
        assert_relative_eq!(melody.trumpet_from, 50.0);
        assert_relative_eq!(melody.clarinet_from, 62.0);
        assert_relative_eq!(melody.crossfade.start, 4.0);
    }

    #[test]
    fn test_clarinet_fades_by_style() {
        let jupiter = HymnMelody::new(HymnStyle::Jupiter);
        let cathedral = HymnMelody::new(HymnStyle::Cathedral);
        assert_relative_eq!(jupiter.clarinet_gain(0.2), 1.1);
        assert!(jupiter.clarinet_gain(0.5) < 1.1);
        assert_relative_eq!(jupiter.clarinet_gain(1.0), 0.0, epsilon = 1e-6);
        assert_relative_eq!(cathedral.clarinet_gain(0.5), 1.1);
    }

    #[test]
    fn test_melody_bounded_over_a_pass() {
        let mut melody = HymnMelody::new(HymnStyle::Cathedral);
        let mut t = 0.0;
        while t < 80.0 {
            let v = melody.sample(t);
            assert!(v.is_finite() && v.abs() < 1.0);
            t += 0.003;
        }
    }

    #[test]
    fn test_acoustic_hymn_softens_high_notes() {
        let hymn = AcousticHymn::new();
        assert_eq!(hymn.notes().len(), MELODY.len());
        for note in hymn.notes() {
            let expected = if note.freq > 600.0 { 0.35 * 0.85 } else { 0.35 };
            assert_relative_eq!(note.gain.unwrap(), expected, epsilon = 1e-6);
        }
        assert!(hymn.notes().iter().any(|n| n.freq > 600.0));
    }

    #[test]
    fn test_acoustic_hymn_follows_jupiter_clock() {
        let mut hymn = AcousticHymn::new();
        assert_eq!(hymn.clock().cycle(), HymnClock::new(HymnStyle::Jupiter).cycle());
        // Silent through the lead-in, sounding once the first note lands.
        assert_eq!(hymn.sample(0.25), 0.0);
        let onset = (0..4800)
            .map(|i| hymn.sample(LEAD_IN + 0.01 + i as f64 / 48000.0).abs())
            .fold(0.0f32, f32::max);
        assert!(onset > 0.01, "onset {onset}");
    }

    #[test]
    fn test_acoustic_hymn_bounded_over_a_pass() {
        let mut hymn = AcousticHymn::new();
        let mut t = 0.0;
        while t < 80.0 {
            let v = hymn.sample(t);
            assert!(v.is_finite() && v.abs() < 0.9);
            t += 0.003;
        }
    }
}
