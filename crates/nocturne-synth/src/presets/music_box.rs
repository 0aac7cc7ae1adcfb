//! Music-box lullaby in F major, 60 BPM 3/4, 32 bars.

use crate::layer::MelodicLayer;
use crate::note::{schedule, Meter, Note};
use crate::timbre::Timbre;
use nocturne_core::Signal;
use nocturne_dsp::{tanh_saturate, AttackCurve, Envelope};

const C4: f64 = 261.63;
const E4: f64 = 329.63;
const F4: f64 = 349.23;
const G4: f64 = 392.00;
const A4: f64 = 440.00;
const BB4: f64 = 466.16;
const C5: f64 = 523.25;
const D5: f64 = 587.33;
const F5: f64 = 698.46;
const G5: f64 = 783.99;
const A5: f64 = 880.00;
const BB5: f64 = 932.33;
const C6: f64 = 1046.50;
const D6: f64 = 1174.66;
const E6: f64 = 1318.51;
const F6: f64 = 1396.91;

const TOTAL_BARS: u32 = 32;
const BELL_DECAY: f64 = 2.5;
const END_FADE: f64 = 0.05;

const MELODY_ATTACK: f64 = 0.005;
const MELODY_DECAY: f64 = 2.5;
const MELODY_GAIN: f32 = 0.35;

const ACC_ATTACK: f64 = 0.008;
const ACC_DECAY: f64 = 1.8;
const ACC_GAIN: f32 = 0.15;

#[rustfmt::skip]
const MELODY: &[Note] = &[
    Note::new(A5, 1, 2.0, 1.0),
    Note::new(A5, 2, 0.0, 1.0), Note::new(C6, 2, 1.0, 2.0),
    Note::new(A5, 3, 0.0, 1.0), Note::new(C6, 3, 1.0, 1.0), Note::new(F6, 3, 2.0, 1.0),
    Note::new(E6, 4, 0.0, 3.0),
    Note::new(G5, 5, 2.0, 1.0),
    Note::new(G5, 6, 0.0, 1.0), Note::new(BB5, 6, 1.0, 2.0),
    Note::new(G5, 7, 0.0, 1.0), Note::new(BB5, 7, 1.0, 1.0), Note::new(E6, 7, 2.0, 1.0),
    Note::new(F6, 8, 0.0, 3.0),

    Note::new(A5, 9, 2.0, 1.0),
    Note::new(A5, 10, 0.0, 1.0), Note::new(C6, 10, 1.0, 2.0),
    Note::new(A5, 11, 0.0, 1.0), Note::new(C6, 11, 1.0, 1.0), Note::new(F6, 11, 2.0, 1.0),
    Note::new(E6, 12, 0.0, 2.0), Note::new(D6, 12, 2.0, 1.0),
    Note::new(C6, 13, 0.0, 1.0), Note::new(D6, 13, 1.0, 1.0), Note::new(E6, 13, 2.0, 1.0),
    Note::new(F6, 14, 0.0, 2.0), Note::new(E6, 14, 2.0, 1.0),
    Note::new(D6, 15, 0.0, 1.0), Note::new(C6, 15, 1.0, 1.0), Note::new(BB5, 15, 2.0, 1.0),
    Note::new(A5, 16, 0.0, 3.0),

    Note::new(D6, 17, 1.0, 1.0), Note::new(D6, 17, 2.0, 1.0),
    Note::new(D6, 18, 0.0, 1.0), Note::new(E6, 18, 1.0, 2.0),
    Note::new(C6, 19, 0.0, 1.0), Note::new(C6, 19, 1.0, 1.0), Note::new(C6, 19, 2.0, 1.0),
    Note::new(C6, 20, 0.0, 1.0), Note::new(D6, 20, 1.0, 2.0),
    Note::new(BB5, 21, 0.0, 1.0), Note::new(BB5, 21, 1.0, 1.0), Note::new(BB5, 21, 2.0, 1.0),
    Note::new(BB5, 22, 0.0, 1.0), Note::new(C6, 22, 1.0, 1.0), Note::new(D6, 22, 2.0, 1.0),
    Note::new(C6, 23, 0.0, 2.0), Note::new(BB5, 23, 2.0, 1.0),
    Note::new(A5, 24, 0.0, 3.0),

    Note::new(A5, 25, 2.0, 1.0),
    Note::new(A5, 26, 0.0, 1.0), Note::new(C6, 26, 1.0, 2.0),
    Note::new(A5, 27, 0.0, 1.0), Note::new(C6, 27, 1.0, 1.0), Note::new(F6, 27, 2.0, 1.0),
    Note::new(E6, 28, 0.0, 3.0),
    Note::new(D6, 29, 0.0, 1.0), Note::new(C6, 29, 1.0, 1.0), Note::new(BB5, 29, 2.0, 1.0),
    Note::new(A5, 30, 0.0, 2.0), Note::new(G5, 30, 2.0, 1.0),
    Note::new(F5, 31, 0.0, 3.0),
    Note::new(F5, 32, 0.0, 3.0).gain(0.2),
];

/// `(bars, bass, [chord tone on beat 2, chord tone on beat 3])`.
#[rustfmt::skip]
const ACCOMPANIMENT: &[(&[u32], f64, [f64; 2])] = &[
    (&[1, 2, 3, 4], F4, [A4, C5]),
    (&[5, 6], BB4, [D5, F5]),
    (&[7, 8], F4, [A4, C5]),
    (&[9, 10, 11, 12], F4, [A4, C5]),
    (&[13, 14], C4, [E4, BB4]),
    (&[15, 16], F4, [A4, C5]),
    (&[17, 18], BB4, [D5, F5]),
    (&[19, 20], C4, [E4, G4]),
    (&[21, 22], BB4, [D5, F5]),
    (&[23, 24], F4, [A4, C5]),
    (&[25, 26, 27, 28], F4, [A4, C5]),
    (&[29, 30], BB4, [D5, F5]),
    (&[31, 32], F4, [A4, C5]),
];

fn accompaniment_notes() -> Vec<Note> {
    ACCOMPANIMENT
        .iter()
        .flat_map(|&(bars, bass, [first, second])| {
            bars.iter().flat_map(move |&bar| {
                [
                    Note::new(bass, bar, 0.0, 1.0),
                    Note::new(first, bar, 1.0, 0.8),
                    Note::new(second, bar, 2.0, 0.8),
                ]
            })
        })
        .collect()
}

fn struck(attack: f64, decay: f64) -> Envelope {
    Envelope::adr(attack, decay, 0.0)
        .with_curve(AttackCurve::Linear)
        .with_end_fade(END_FADE)
}

/// Bright melody over a softer accompaniment, saturated gently before
/// the reverb.
#[derive(Debug, Clone)]
pub struct MusicBox {
    melody: MelodicLayer,
    accompaniment: MelodicLayer,
}

impl MusicBox {
    pub fn meter() -> Meter {
        Meter::waltz(60.0)
    }

    pub fn cycle() -> f64 {
        Self::meter().bars(TOTAL_BARS)
    }

    pub fn new() -> Self {
        let meter = Self::meter();
        let cycle = Self::cycle();
        let melody = MelodicLayer::new(
            schedule(MELODY, &meter, MELODY_ATTACK),
            Timbre::Bell {
                brightness: 1.0,
                decay: BELL_DECAY,
            },
            struck(MELODY_ATTACK, MELODY_DECAY),
            cycle,
        )
        .with_gain(MELODY_GAIN);
        let accompaniment = MelodicLayer::new(
            schedule(&accompaniment_notes(), &meter, ACC_ATTACK),
            Timbre::Bell {
                brightness: 0.5,
                decay: BELL_DECAY,
            },
            struck(ACC_ATTACK, ACC_DECAY),
            cycle,
        )
        .with_gain(ACC_GAIN);
        Self {
            melody,
            accompaniment,
        }
    }
}

impl Default for MusicBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Signal for MusicBox {
    #[inline]
    fn sample(&mut self, t: f64) -> f32 {
        let mix = self.melody.sample(t) + self.accompaniment.sample(t);
        tanh_saturate(mix, 1.0, 0.9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cycle_is_96_seconds() {
        assert_relative_eq!(MusicBox::cycle(), 96.0);
    }

    #[test]
    fn test_accompaniment_covers_every_bar() {
        let notes = accompaniment_notes();
        assert_eq!(notes.len(), TOTAL_BARS as usize * 3);
    }

    #[test]
    fn test_pickup_is_first_sound() {
        let mut music_box = MusicBox::new();
        // Bar 1 beat 1 has only the bass F4; the melody enters on beat 3.
        assert!(music_box.melody.render_at(1.5) == 0.0);
        assert!(music_box.melody.render_at(2.5).abs() > 0.0);
        assert!(music_box.sample(0.5).abs() > 0.0);
    }

    #[test]
    fn test_notes_end_silently() {
        let music_box = MusicBox::new();
        // The first bass note lasts exactly one beat.
        assert_eq!(music_box.accompaniment.active_count(0.999), 1);
        assert_eq!(music_box.accompaniment.active_count(1.0), 1);
        assert_relative_eq!(music_box.accompaniment.render_at(0.99999), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_bounded_output() {
        let mut music_box = MusicBox::new();
        for i in 0..96_000 {
            assert!(music_box.sample(i as f64 / 1000.0).abs() < 0.9);
        }
    }
}
