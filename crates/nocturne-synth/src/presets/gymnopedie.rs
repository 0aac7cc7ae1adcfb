//! Satie's first Gymnopédie over a two-chord waltz, 41 bars, voiced either
//! as detuned sines (moonlit) or as a plucked guitar (acoustic).

use crate::layer::MelodicLayer;
use crate::note::{schedule, Meter, Note};
use crate::timbre::{HighFreqTaper, Timbre};
use nocturne_core::Signal;
use nocturne_dsp::{tanh_saturate, AttackCurve, Envelope};

const D3: f64 = 146.83;
const E3: f64 = 164.81;
const G3: f64 = 196.00;
const A3: f64 = 220.00;
const B3: f64 = 246.94;
const CS4: f64 = 277.18;
const D4: f64 = 293.66;
const E4: f64 = 329.63;
const FS4: f64 = 369.99;
const G4: f64 = 392.00;
const A4: f64 = 440.00;
const B4: f64 = 493.88;
const C5: f64 = 523.25;
const CS5: f64 = 554.37;
const D5: f64 = 587.33;
const E5: f64 = 659.25;
const F5: f64 = 698.46;
const FS5: f64 = 739.99;
const G5: f64 = 783.99;
const A5: f64 = 880.00;
const E6: f64 = 1318.51;

const BEAT_SECS: f64 = 0.682;
const TOTAL_BARS: u32 = 41;
const CLIMAX_BAR: u32 = 39;
const DETUNE_HZ: f64 = 0.2;
/// Gap between successive tones of a strummed chord.
const STRUM_SECS: f64 = 0.015;

/// Instrumentation of the piece. Both voices play the same score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GymnopedieVoice {
    /// Detuned sines over a sine bass.
    Moonlit,
    /// Plucked guitar with strummed chords.
    Acoustic,
}

/// Sound of one layer.
#[derive(Debug, Clone, Copy)]
struct Voicing {
    timbre: Timbre,
    attack: f64,
    decay: f64,
    gain: f32,
}

const fn guitar(brightness: f32) -> Timbre {
    Timbre::Plucked {
        brightness,
        noise: 0.03,
    }
}

impl GymnopedieVoice {
    fn melody(self) -> Voicing {
        match self {
            GymnopedieVoice::Moonlit => Voicing {
                timbre: Timbre::Detuned { spread: DETUNE_HZ },
                attack: 0.15,
                decay: 4.5,
                gain: 0.28,
            },
            GymnopedieVoice::Acoustic => Voicing {
                timbre: guitar(1.0),
                attack: 0.008,
                decay: 3.0,
                gain: 0.30,
            },
        }
    }

    fn bass(self) -> Voicing {
        match self {
            GymnopedieVoice::Moonlit => Voicing {
                timbre: Timbre::Sine,
                attack: 0.2,
                decay: 3.5,
                gain: 0.16,
            },
            GymnopedieVoice::Acoustic => Voicing {
                timbre: guitar(0.7),
                attack: 0.012,
                decay: 2.5,
                gain: 0.22,
            },
        }
    }

    /// `gain` is shared by the two chord tones.
    fn chords(self) -> Voicing {
        match self {
            GymnopedieVoice::Moonlit => Voicing {
                timbre: Timbre::Detuned { spread: DETUNE_HZ },
                attack: 0.08,
                decay: 2.5,
                gain: 0.03,
            },
            GymnopedieVoice::Acoustic => Voicing {
                timbre: guitar(0.8),
                attack: 0.006,
                decay: 2.0,
                gain: 0.08,
            },
        }
    }

    fn curve(self) -> AttackCurve {
        match self {
            GymnopedieVoice::Moonlit => AttackCurve::SineSquared,
            GymnopedieVoice::Acoustic => AttackCurve::Pluck,
        }
    }

    fn end_fade(self) -> f64 {
        match self {
            GymnopedieVoice::Moonlit => 0.05,
            GymnopedieVoice::Acoustic => 0.06,
        }
    }

    /// Decay stretch for notes from the climax bar on.
    fn climax_decay(self) -> f64 {
        match self {
            GymnopedieVoice::Moonlit => 2.0,
            GymnopedieVoice::Acoustic => 1.5,
        }
    }

    fn taper(self) -> HighFreqTaper {
        let depth = match self {
            GymnopedieVoice::Moonlit => 0.35,
            GymnopedieVoice::Acoustic => 0.25,
        };
        HighFreqTaper::new(600.0, E6, depth)
    }

    /// Levels of the seven staggered closing tones.
    fn final_chord_gains(self) -> [f32; 7] {
        match self {
            GymnopedieVoice::Moonlit => [0.14, 0.10, 0.09, 0.16, 0.10, 0.12, 0.08],
            GymnopedieVoice::Acoustic => [0.18, 0.14, 0.12, 0.20, 0.14, 0.16, 0.12],
        }
    }

    fn strum_beats(self) -> f64 {
        match self {
            GymnopedieVoice::Moonlit => 0.0,
            GymnopedieVoice::Acoustic => STRUM_SECS / BEAT_SECS,
        }
    }

    fn envelope(self, voicing: Voicing) -> Envelope {
        Envelope::adr(voicing.attack, voicing.decay, 0.0)
            .with_curve(self.curve())
            .with_end_fade(self.end_fade())
    }
}

#[rustfmt::skip]
const MELODY: &[Note] = &[
    Note::new(FS5, 5, 1.0, 1.0), Note::new(A5, 5, 2.0, 1.0),
    Note::new(G5, 6, 0.0, 1.0), Note::new(FS5, 6, 1.0, 1.0), Note::new(CS5, 6, 2.0, 1.0),
    Note::new(B4, 7, 0.0, 1.0), Note::new(CS5, 7, 1.0, 1.0), Note::new(D5, 7, 2.0, 1.0),
    Note::new(A4, 8, 0.0, 3.0),
    Note::new(FS4, 9, 0.0, 12.0).fading(),

    Note::new(FS5, 13, 1.0, 1.0), Note::new(A5, 13, 2.0, 1.0),
    Note::new(G5, 14, 0.0, 1.0), Note::new(FS5, 14, 1.0, 1.0), Note::new(CS5, 14, 2.0, 1.0),
    Note::new(B4, 15, 0.0, 1.0), Note::new(CS5, 15, 1.0, 1.0), Note::new(D5, 15, 2.0, 1.0),
    Note::new(A4, 16, 0.0, 3.0),
    Note::new(CS5, 17, 0.0, 3.0),
    Note::new(FS5, 18, 0.0, 3.0),
    Note::new(E5, 19, 0.0, 9.0).fading(),

    Note::new(A4, 22, 0.0, 1.0), Note::new(B4, 22, 1.0, 1.0), Note::new(C5, 22, 2.0, 1.0),
    Note::new(E5, 23, 0.0, 1.0), Note::new(D5, 23, 1.0, 1.0), Note::new(B4, 23, 2.0, 1.0),
    Note::new(D5, 24, 0.0, 1.0), Note::new(C5, 24, 1.0, 1.0), Note::new(B4, 24, 2.0, 1.0),
    Note::new(E4, 24, 1.0, 2.0),
    Note::new(D5, 25, 0.0, 5.0), Note::new(D4, 25, 1.0, 2.0),
    Note::new(D5, 26, 2.0, 1.0), Note::new(D4, 26, 1.0, 2.0),
    Note::new(E5, 27, 0.0, 1.0), Note::new(F5, 27, 1.0, 1.0), Note::new(G5, 27, 2.0, 1.0),
    Note::new(A5, 28, 0.0, 1.0), Note::new(C5, 28, 1.0, 1.0), Note::new(D5, 28, 2.0, 1.0),
    Note::new(E5, 29, 0.0, 1.0), Note::new(D5, 29, 1.0, 1.0), Note::new(B4, 29, 2.0, 1.0),
    Note::new(E4, 29, 1.0, 2.0),
    Note::new(D5, 30, 0.0, 5.0), Note::new(D4, 30, 1.0, 2.0),
    Note::new(D5, 31, 2.0, 1.0), Note::new(D4, 31, 1.0, 2.0),

    Note::new(G5, 32, 0.0, 3.0),
    Note::new(FS5, 33, 0.0, 3.0),
    Note::new(B4, 34, 0.0, 1.0), Note::new(A4, 34, 1.0, 1.0), Note::new(B4, 34, 2.0, 1.0),
    Note::new(CS5, 35, 0.0, 1.0), Note::new(D5, 35, 1.0, 1.0), Note::new(E5, 35, 2.0, 1.0),
    Note::new(CS5, 36, 0.0, 1.0), Note::new(D5, 36, 1.0, 1.0), Note::new(E5, 36, 2.0, 1.0),
    Note::new(FS4, 37, 0.0, 3.0), Note::new(D4, 37, 1.0, 1.0), Note::new(G4, 37, 2.0, 1.0),

];

/// Staggered closing chords over bars 38 and 39.
fn final_chord(gains: [f32; 7]) -> [Note; 7] {
    [
        Note::new(A3, 38, 0.0, 3.5).gain(gains[0]),
        Note::new(E4, 38, 0.12, 3.3).gain(gains[1]),
        Note::new(A4, 38, 0.24, 3.1).gain(gains[2]),
        Note::new(D3, 39, 0.0, 6.0).gain(gains[3]),
        Note::new(D4, 39, 0.12, 5.8).gain(gains[4]),
        Note::new(A4, 39, 0.21, 5.5).gain(gains[5]),
        Note::new(D5, 39, 0.30, 5.2).gain(gains[6]),
    ]
}

fn melody_notes(voice: GymnopedieVoice) -> Vec<Note> {
    MELODY
        .iter()
        .copied()
        .chain(final_chord(voice.final_chord_gains()))
        .map(|note| {
            if note.bar >= CLIMAX_BAR {
                note.decay_scale(voice.climax_decay())
            } else {
                note
            }
        })
        .collect()
}

/// Bass note and the two chord tones for `bar`.
pub fn harmony(bar: u32) -> (f64, [f64; 2]) {
    match bar {
        9..=12 | 19..=21 => (E3, [B3, D4]),
        b if b % 2 == 1 => (G3, [B3, D4]),
        _ => (D3, [A3, CS4]),
    }
}

fn bass_notes() -> Vec<Note> {
    (1..=TOTAL_BARS)
        .map(|bar| Note::new(harmony(bar).0, bar, 0.0, 3.0))
        .collect()
}

/// Chord tones on beats two and three. A strum delays each tone after the
/// first; all of them still end with the bar.
fn chord_notes(strum_beats: f64) -> Vec<Note> {
    (1..=TOTAL_BARS)
        .flat_map(|bar| {
            let (_, tones) = harmony(bar);
            let mut offset = 0.0;
            tones.map(|freq| {
                let note = Note::new(freq, bar, 1.0 + offset, 2.0 - offset);
                offset += strum_beats;
                note
            })
        })
        .collect()
}

/// Melody, bass and chord layers summed and softly saturated.
#[derive(Debug, Clone)]
pub struct Gymnopedie {
    voice: GymnopedieVoice,
    melody: MelodicLayer,
    bass: MelodicLayer,
    chords: MelodicLayer,
}

impl Gymnopedie {
    pub fn meter() -> Meter {
        Meter::new(BEAT_SECS, 3.0)
    }

    pub fn cycle() -> f64 {
        Self::meter().bars(TOTAL_BARS)
    }

    pub fn new(voice: GymnopedieVoice) -> Self {
        let meter = Self::meter();
        let cycle = Self::cycle();
        let layer = |notes: Vec<Note>, voicing: Voicing| {
            MelodicLayer::new(
                schedule(&notes, &meter, voicing.attack),
                voicing.timbre,
                voice.envelope(voicing),
                cycle,
            )
        };

        let melody = voice.melody();
        let bass = voice.bass();
        let chords = voice.chords();
        Self {
            voice,
            melody: layer(melody_notes(voice), melody)
                .with_gain(melody.gain)
                .with_taper(voice.taper()),
            bass: layer(bass_notes(), bass).with_gain(bass.gain),
            chords: layer(chord_notes(voice.strum_beats()), chords).with_gain(chords.gain / 2.0),
        }
    }

    pub fn voice(&self) -> GymnopedieVoice {
        self.voice
    }
}

impl Default for Gymnopedie {
    fn default() -> Self {
        Self::new(GymnopedieVoice::Moonlit)
    }
}

impl Signal for Gymnopedie {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        let mix = self.melody.sample(t) + self.bass.sample(t) + self.chords.sample(t);
        tanh_saturate(mix, 1.0, 0.9)
    }
}
