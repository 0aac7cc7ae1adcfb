//! Note envelopes: pure functions of (time since trigger, note duration).

use std::f64::consts::FRAC_PI_2;

/// Shape of the rise from silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttackCurve {
    /// `sin²` rise, for bowed and blown timbres.
    #[default]
    SineSquared,
    /// Straight line, for struck timbres.
    Linear,
    /// `x^0.7`, fast off the mark, for plucked strings.
    Pluck,
}

/// What happens between the end of the attack and the release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sustain {
    Flat,
    /// `exp(-(dt - attack) / tau)`.
    Exponential { tau: f64 },
    /// `(1 - p)^exponent` with `p = (dt - attack) / time` clamped to `[0, 1]`.
    Power { time: f64, exponent: f64 },
}

/// Attack, sustain shape, and a `cos²` release anchored at the level
/// reached when the note ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    pub attack: f64,
    pub release: f64,
    pub curve: AttackCurve,
    pub sustain: Sustain,
    /// Linear taper to silence over the last `end_fade` seconds of the note.
    pub end_fade: f64,
}

impl Envelope {
    /// Attack-sustain-release.
    pub fn asr(attack: f64, release: f64) -> Self {
        Self {
            attack,
            release,
            curve: AttackCurve::SineSquared,
            sustain: Sustain::Flat,
            end_fade: 0.0,
        }
    }

    /// Attack-decay-release with exponential decay during the sustain.
    pub fn adr(attack: f64, tau: f64, release: f64) -> Self {
        Self {
            attack,
            release,
            curve: AttackCurve::SineSquared,
            sustain: Sustain::Exponential { tau },
            end_fade: 0.0,
        }
    }

    /// Power-curve decay reaching silence `time` seconds after the attack.
    pub fn power(attack: f64, time: f64, exponent: f64, release: f64) -> Self {
        Self {
            attack,
            release,
            curve: AttackCurve::SineSquared,
            sustain: Sustain::Power { time, exponent },
            end_fade: 0.0,
        }
    }

    pub fn with_curve(mut self, curve: AttackCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn with_end_fade(mut self, secs: f64) -> Self {
        self.end_fade = secs.max(0.0);
        self
    }

    /// Scale the sustain decay time.
    pub fn with_decay_scale(mut self, scale: f64) -> Self {
        self.sustain = match self.sustain {
            Sustain::Flat => Sustain::Flat,
            Sustain::Exponential { tau } => Sustain::Exponential { tau: tau * scale },
            Sustain::Power { time, exponent } => Sustain::Power {
                time: time * scale,
                exponent,
            },
        };
        self
    }

    /// Gain before any release.
    fn level(&self, dt: f64) -> f64 {
        if dt < self.attack {
            let x = dt / self.attack;
            return match self.curve {
                AttackCurve::SineSquared => (FRAC_PI_2 * x).sin().powi(2),
                AttackCurve::Linear => x,
                AttackCurve::Pluck => x.powf(0.7),
            };
        }

        let held = dt - self.attack;
        match self.sustain {
            Sustain::Flat => 1.0,
            Sustain::Exponential { tau } => (-held / tau).exp(),
            Sustain::Power { time, exponent } => {
                let p = if time > 0.0 {
                    (held / time).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                (1.0 - p).powf(exponent)
            }
        }
    }

    /// Gain at `dt` seconds after the trigger for a note lasting `duration`.
    pub fn gain(&self, dt: f64, duration: f64) -> f32 {
        if dt < 0.0 {
            return 0.0;
        }
        if dt < duration {
            let level = self.level(dt);
            let fade_from = duration - self.end_fade;
            if self.end_fade > 0.0 && dt >= fade_from {
                let taper = (1.0 - (dt - fade_from) / self.end_fade).clamp(0.0, 1.0);
                return (level * taper) as f32;
            }
            return level as f32;
        }

        if self.release <= 0.0 || self.end_fade > 0.0 || dt >= self.active_until(duration) {
            return 0.0;
        }
        let into_release = dt - duration;
        let fall = (FRAC_PI_2 * into_release / self.release).cos().powi(2);
        (self.level(duration) * fall) as f32
    }

    /// End of the audible window for a note lasting `duration`.
    #[inline]
    pub fn active_until(&self, duration: f64) -> f64 {
        duration + self.release
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_asr_shape() {
        let env = Envelope::asr(0.1, 0.2);
        assert_eq!(env.gain(0.0, 1.0), 0.0);
        assert_relative_eq!(env.gain(0.05, 1.0), 0.5, epsilon = 1e-6);
        assert_relative_eq!(env.gain(0.5, 1.0), 1.0);
        assert_relative_eq!(env.gain(1.1, 1.0), 0.5, epsilon = 1e-6);
        assert_eq!(env.gain(1.25, 1.0), 0.0);
        assert_relative_eq!(env.active_until(1.0), 1.2);
    }

    #[test]
    fn test_adr_release_continues_from_decayed_level() {
        let env = Envelope::adr(0.0, 1.0, 0.4);
        let at_end = (-2.0f64).exp() as f32;
        assert_relative_eq!(env.gain(1.999_999, 2.0), at_end, epsilon = 1e-5);
        assert_relative_eq!(env.gain(2.0, 2.0), at_end, epsilon = 1e-6);
        assert_relative_eq!(env.gain(2.2, 2.0), at_end * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_power_decay_reaches_silence() {
        let env = Envelope::power(0.0, 2.0, 3.0, 0.1);
        assert_relative_eq!(env.gain(1.0, 10.0), 0.125, epsilon = 1e-6);
        assert_eq!(env.gain(3.0, 10.0), 0.0);
    }

    #[test]
    fn test_linear_attack() {
        let env = Envelope::adr(0.01, 2.0, 0.1).with_curve(AttackCurve::Linear);
        assert_relative_eq!(env.gain(0.0025, 1.0), 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_pluck_attack_leads_linear() {
        let env = Envelope::adr(0.008, 3.0, 0.0).with_curve(AttackCurve::Pluck);
        assert_relative_eq!(env.gain(0.002, 1.0), 0.25f32.powf(0.7), epsilon = 1e-6);
        assert!(env.gain(0.002, 1.0) > 0.25);
        assert_relative_eq!(env.gain(0.008, 1.0), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_release_anchors_mid_attack() {
        let env = Envelope::asr(1.0, 0.5);
        let at_cut = env.gain(0.5, 0.5);
        assert_relative_eq!(at_cut, 0.5, epsilon = 1e-6);
        assert!(env.gain(0.6, 0.5) < at_cut);
    }

    #[test]
    fn test_end_fade_tapers_inside_note() {
        let env = Envelope::adr(0.005, 2.5, 0.0)
            .with_curve(AttackCurve::Linear)
            .with_end_fade(0.05);
        let full = (-(0.975 - 0.005) / 2.5f64).exp() as f32;
        assert_relative_eq!(env.gain(0.975, 1.0), full * 0.5, epsilon = 1e-5);
        assert_eq!(env.gain(1.0, 1.0), 0.0);
        assert_relative_eq!(env.active_until(1.0), 1.0);
    }

    proptest! {
        #[test]
        fn gain_stays_in_unit_range(
            attack in 0.001f64..1.0,
            tau in 0.1f64..10.0,
            release in 0.0f64..2.0,
            duration in 0.0f64..10.0,
            dt in -1.0f64..15.0,
        ) {
            let g = Envelope::adr(attack, tau, release).gain(dt, duration);
            prop_assert!((0.0..=1.0).contains(&g));
        }

        #[test]
        fn silent_after_active_window(
            attack in 0.001f64..1.0,
            release in 0.0f64..2.0,
            duration in 0.0f64..10.0,
            extra in 0.0f64..5.0,
        ) {
            let env = Envelope::asr(attack, release);
            prop_assert_eq!(env.gain(env.active_until(duration) + extra, duration), 0.0);
        }
    }
}
