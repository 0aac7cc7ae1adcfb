//! Value descriptions of presets.
//!
//! A [`Recipe`] says which layers make up each source, at which gains, and
//! which effects follow the mix. It is a plain value: building one touches
//! no shared state, and [`Recipe::instantiate`] produces fresh signals with
//! deterministic seeds every time it is called.

use crate::preset::PresetId;
use crate::presets::{
    brown_bed, ocean_waves, sub_bass_fundamental, AcousticHymn, Bubbles, ForestBirds, ForestWind,
    Gymnopedie, GymnopedieVoice, HymnChimes, HymnDrone, HymnMelody, HymnStyle, Leaves, MusicBox,
    PinkBed, Rain, SubBass, TreeChime,
};
use crate::{Error, Result};
use nocturne_core::{BoxedSignal, OutputRoute, Source};
use nocturne_dsp::{
    CombTuning, EffectsChain, Mixer, ProcessedSignal, ReverbParams, SchroederReverb, SineOscillator,
    SoftLimiter,
};

/// One generator inside a source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerSpec {
    PinkBed,
    OceanWaves,
    Rain,
    ForestWind,
    Leaves,
    ForestBirds,
    Bubbles,
    TreeChime,
    MusicBox,
    Gymnopedie(GymnopedieVoice),
    AcousticHymn,
    HymnDrone(HymnStyle),
    HymnMelody(HymnStyle),
    HymnChimes(HymnStyle),
    SubBass { fundamental: f64 },
    BrownBed,
    Sine { freq: f64 },
}

impl LayerSpec {
    pub fn instantiate(&self, seed: u64, sample_rate: f64) -> Result<BoxedSignal> {
        let signal: BoxedSignal = match *self {
            LayerSpec::PinkBed => Box::new(PinkBed::new(seed)),
            LayerSpec::OceanWaves => Box::new(ocean_waves(seed, sample_rate)?),
            LayerSpec::Rain => Box::new(Rain::new(seed, sample_rate)?),
            LayerSpec::ForestWind => Box::new(ForestWind::new(seed, sample_rate)?),
            LayerSpec::Leaves => Box::new(Leaves::new(seed, sample_rate)?),
            LayerSpec::ForestBirds => Box::new(ForestBirds::new(seed)),
            LayerSpec::Bubbles => Box::new(Bubbles::new(seed)),
            LayerSpec::TreeChime => Box::new(TreeChime::new(seed)),
            LayerSpec::MusicBox => Box::new(MusicBox::new()),
            LayerSpec::Gymnopedie(voice) => Box::new(Gymnopedie::new(voice)),
            LayerSpec::AcousticHymn => Box::new(AcousticHymn::new()),
            LayerSpec::HymnDrone(style) => Box::new(HymnDrone::new(style)),
            LayerSpec::HymnMelody(style) => Box::new(HymnMelody::new(style)),
            LayerSpec::HymnChimes(style) => Box::new(HymnChimes::new(style, seed)),
            LayerSpec::SubBass { fundamental } => Box::new(SubBass::new(fundamental, seed)),
            LayerSpec::BrownBed => Box::new(brown_bed(seed, sample_rate)?),
            LayerSpec::Sine { freq } => Box::new(SineOscillator::new(freq)),
        };
        Ok(signal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimiterSpec {
    pub drive: f32,
    pub ceiling: f32,
}

impl Default for LimiterSpec {
    fn default() -> Self {
        Self {
            drive: 1.0,
            ceiling: 0.95,
        }
    }
}

/// Reverb first, limiter last; either may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectsSpec {
    pub reverb: Option<ReverbParams>,
    pub limiter: Option<LimiterSpec>,
}

impl EffectsSpec {
    pub fn limited() -> Self {
        Self {
            reverb: None,
            limiter: Some(LimiterSpec::default()),
        }
    }

    pub fn with_reverb(mut self, params: ReverbParams) -> Self {
        self.reverb = Some(params);
        self
    }

    pub fn with_limiter(mut self, drive: f32, ceiling: f32) -> Self {
        self.limiter = Some(LimiterSpec { drive, ceiling });
        self
    }

    pub fn instantiate(&self, sample_rate: f64) -> Result<EffectsChain> {
        let mut chain = EffectsChain::new();
        if let Some(params) = self.reverb {
            chain = chain.with_reverb(SchroederReverb::new(params, sample_rate)?);
        }
        if let Some(limiter) = self.limiter {
            chain = chain.with_limiter(SoftLimiter::new(limiter.drive, limiter.ceiling)?);
        }
        Ok(chain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceKind {
    /// Mixed layers through an effects chain.
    Processed(EffectsSpec),
    /// A single raw layer at a fixed level.
    Dry { level: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceSpec {
    pub label: &'static str,
    pub kind: SourceKind,
    pub layers: Vec<(LayerSpec, f32)>,
}

impl SourceSpec {
    fn processed(label: &'static str, effects: EffectsSpec, layers: Vec<(LayerSpec, f32)>) -> Self {
        Self {
            label,
            kind: SourceKind::Processed(effects),
            layers,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub id: PresetId,
    pub route: OutputRoute,
    pub sources: Vec<SourceSpec>,
}

fn music_box_reverb() -> ReverbParams {
    ReverbParams {
        room_size: 1.5,
        damping: 0.55,
        decay: 0.45,
        mix: 0.22,
        pre_delay: 0.012,
        comb_tuning: CombTuning::Short,
    }
}

fn gymnopedie_reverb() -> ReverbParams {
    ReverbParams {
        room_size: 2.2,
        damping: 0.40,
        decay: 0.85,
        mix: 0.45,
        pre_delay: 0.030,
        comb_tuning: CombTuning::Standard,
    }
}

/// Small wooden room for the guitar pieces.
fn warm_reverb(room_size: f32, decay: f32, mix: f32, pre_delay: f32) -> ReverbParams {
    ReverbParams {
        room_size,
        damping: 0.50,
        decay,
        mix,
        pre_delay,
        comb_tuning: CombTuning::Standard,
    }
}

fn birds_reverb() -> ReverbParams {
    ReverbParams {
        room_size: 1.0,
        damping: 0.45,
        decay: 0.5,
        mix: 0.2,
        pre_delay: 0.015,
        comb_tuning: CombTuning::Short,
    }
}

fn bubbles_reverb() -> ReverbParams {
    ReverbParams {
        room_size: 0.8,
        damping: 0.5,
        decay: 0.5,
        mix: 0.25,
        pre_delay: 0.01,
        comb_tuning: CombTuning::Short,
    }
}

fn chime_reverb() -> ReverbParams {
    ReverbParams {
        room_size: 1.2,
        damping: 0.3,
        decay: 0.7,
        mix: 0.35,
        pre_delay: 0.02,
        comb_tuning: CombTuning::Standard,
    }
}

impl Recipe {
    /// The fixed recipe for `id` on `route`. Only `MidnightHum` looks at the
    /// route.
    pub fn for_preset(id: PresetId, route: OutputRoute) -> Recipe {
        use LayerSpec as L;

        let sources = match id {
            PresetId::PinkNoise => vec![SourceSpec::processed(
                "bed",
                EffectsSpec::limited(),
                vec![(L::PinkBed, 0.25)],
            )],
            PresetId::OceanWaves => vec![SourceSpec::processed(
                "surf",
                EffectsSpec::limited(),
                vec![(L::OceanWaves, 0.6)],
            )],
            PresetId::Rain => vec![SourceSpec::processed(
                "rain",
                EffectsSpec::limited(),
                vec![(L::Rain, 0.8)],
            )],
            PresetId::ForestWind => vec![
                SourceSpec::processed("wind", EffectsSpec::limited(), vec![(L::ForestWind, 0.22)]),
                SourceSpec::processed("leaves", EffectsSpec::limited(), vec![(L::Leaves, 1.0)]),
            ],
            PresetId::ForestBirds => vec![SourceSpec::processed(
                "birds",
                EffectsSpec::limited().with_reverb(birds_reverb()),
                vec![(L::ForestBirds, 0.6)],
            )],
            PresetId::Bubbles => vec![SourceSpec::processed(
                "bubbles",
                EffectsSpec::limited().with_reverb(bubbles_reverb()),
                vec![(L::Bubbles, 1.0)],
            )],
            PresetId::TreeChime => vec![SourceSpec::processed(
                "chimes",
                EffectsSpec::limited().with_reverb(chime_reverb()),
                vec![(L::TreeChime, 0.5)],
            )],
            PresetId::MusicBox => vec![SourceSpec::processed(
                "music_box",
                EffectsSpec::default()
                    .with_reverb(music_box_reverb())
                    .with_limiter(1.05, 0.95),
                vec![(L::MusicBox, 1.0)],
            )],
            PresetId::MoonlitGymnopedie => vec![SourceSpec::processed(
                "gymnopedie",
                EffectsSpec::default()
                    .with_reverb(gymnopedie_reverb())
                    .with_limiter(1.05, 0.95),
                vec![(L::Gymnopedie(GymnopedieVoice::Moonlit), 1.0)],
            )],
            PresetId::AcousticGymnopedie => vec![SourceSpec::processed(
                "gymnopedie",
                EffectsSpec::default()
                    .with_reverb(warm_reverb(1.8, 0.55, 0.28, 0.018))
                    .with_limiter(1.05, 0.95),
                vec![(L::Gymnopedie(GymnopedieVoice::Acoustic), 1.0)],
            )],
            PresetId::AcousticJupiter => vec![SourceSpec::processed(
                "guitar",
                EffectsSpec::default()
                    .with_reverb(warm_reverb(2.0, 0.58, 0.32, 0.022))
                    .with_limiter(1.05, 0.95),
                vec![(L::AcousticHymn, 1.0)],
            )],
            PresetId::JupiterHymn => {
                let style = HymnStyle::Jupiter;
                vec![SourceSpec::processed(
                    "hymn",
                    EffectsSpec::default()
                        .with_reverb(style.reverb())
                        .with_limiter(1.0, 0.89),
                    vec![
                        (L::HymnDrone(style), 1.0),
                        (L::HymnMelody(style), 0.7),
                        (L::HymnChimes(style), 0.8),
                    ],
                )]
            }
            PresetId::CathedralStillness => {
                let style = HymnStyle::Cathedral;
                let effects = EffectsSpec::limited().with_reverb(style.reverb());
                vec![
                    SourceSpec::processed(
                        "hymn",
                        effects,
                        vec![(L::HymnDrone(style), 1.0), (L::HymnMelody(style), 0.7)],
                    ),
                    SourceSpec::processed("chimes", effects, vec![(L::HymnChimes(style), 0.8)]),
                ]
            }
            PresetId::MidnightHum => vec![SourceSpec::processed(
                "hum",
                EffectsSpec::limited(),
                vec![
                    (
                        L::SubBass {
                            fundamental: sub_bass_fundamental(route),
                        },
                        0.35,
                    ),
                    (L::BrownBed, 0.1),
                ],
            )],
            PresetId::TestTone => vec![SourceSpec {
                label: "tone",
                kind: SourceKind::Dry { level: 0.5 },
                layers: vec![(L::Sine { freq: 440.0 }, 1.0)],
            }],
        };

        Recipe { id, route, sources }
    }

    /// Seed for layer `layer` of source `source`; fixed per preset.
    pub fn seed(&self, source: usize, layer: usize) -> u64 {
        (self.id as u64 + 1) * 1000 + source as u64 * 10 + layer as u64
    }

    /// Fresh, unregistered sources.
    pub fn instantiate(&self, sample_rate: f64) -> Result<Vec<Source>> {
        let label_prefix = self.id.name();
        self.sources
            .iter()
            .enumerate()
            .map(|(s, spec)| {
                let label = format!("{label_prefix}/{}", spec.label);
                match spec.kind {
                    SourceKind::Processed(effects) => {
                        let mut mixer = Mixer::new();
                        for (l, (layer, gain)) in spec.layers.iter().enumerate() {
                            mixer.push(layer.instantiate(self.seed(s, l), sample_rate)?, *gain);
                        }
                        let chain = effects.instantiate(sample_rate)?;
                        Ok(Source::processed(label, Box::new(ProcessedSignal::new(mixer, chain))))
                    }
                    SourceKind::Dry { level } => match spec.layers.as_slice() {
                        [(layer, gain)] => {
                            let signal = layer.instantiate(self.seed(s, 0), sample_rate)?;
                            Ok(Source::dry(label, signal, level * gain))
                        }
                        layers => Err(Error::InvalidConfig(format!(
                            "dry source {label} needs exactly one layer, got {}",
                            layers.len()
                        ))),
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_has_sources() {
        for &id in PresetId::all() {
            let recipe = Recipe::for_preset(id, OutputRoute::Speaker);
            assert!(!recipe.sources.is_empty(), "{id}");
            assert!(recipe.sources.iter().all(|s| !s.layers.is_empty()));
        }
    }

    #[test]
    fn test_recipe_is_pure() {
        let a = Recipe::for_preset(PresetId::JupiterHymn, OutputRoute::Headphones);
        let b = Recipe::for_preset(PresetId::JupiterHymn, OutputRoute::Headphones);
        assert_eq!(a, b);
    }

    #[test]
    fn test_midnight_hum_follows_route() {
        let fundamental = |route| match Recipe::for_preset(PresetId::MidnightHum, route).sources[0]
            .layers[0]
            .0
        {
            LayerSpec::SubBass { fundamental } => fundamental,
            other => panic!("unexpected layer {other:?}"),
        };
        assert_eq!(fundamental(OutputRoute::Speaker), 110.0);
        assert_eq!(fundamental(OutputRoute::Bluetooth), 73.42);
        assert_eq!(fundamental(OutputRoute::Headphones), 55.0);
        assert_eq!(fundamental(OutputRoute::Unknown), 110.0);
    }

    #[test]
    fn test_cathedral_has_separate_chime_source() {
        let recipe = Recipe::for_preset(PresetId::CathedralStillness, OutputRoute::Speaker);
        assert_eq!(recipe.sources.len(), 2);
        assert_eq!(recipe.sources[1].label, "chimes");
    }

    #[test]
    fn test_test_tone_is_dry() {
        let sources = Recipe::for_preset(PresetId::TestTone, OutputRoute::Speaker)
            .instantiate(48_000.0)
            .unwrap();
        assert_eq!(sources.len(), 1);
        assert!(matches!(sources[0], Source::Dry(_)));
    }

    #[test]
    fn test_dry_source_rejects_multiple_layers() {
        let recipe = Recipe {
            id: PresetId::TestTone,
            route: OutputRoute::Speaker,
            sources: vec![SourceSpec {
                label: "tone",
                kind: SourceKind::Dry { level: 0.5 },
                layers: vec![
                    (LayerSpec::Sine { freq: 440.0 }, 1.0),
                    (LayerSpec::Sine { freq: 660.0 }, 1.0),
                ],
            }],
        };
        assert!(matches!(
            recipe.instantiate(48_000.0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_acoustic_presets_use_warm_room() {
        for (id, room) in [(PresetId::AcousticGymnopedie, 1.8), (PresetId::AcousticJupiter, 2.0)] {
            let recipe = Recipe::for_preset(id, OutputRoute::Headphones);
            let SourceKind::Processed(effects) = recipe.sources[0].kind else {
                panic!("{id} should be processed");
            };
            let reverb = effects.reverb.unwrap();
            assert_eq!(reverb.room_size, room);
            assert_eq!(reverb.damping, 0.50);
            assert_eq!(
                effects.limiter,
                Some(LimiterSpec {
                    drive: 1.05,
                    ceiling: 0.95
                })
            );
        }
        let recipe = Recipe::for_preset(PresetId::AcousticGymnopedie, OutputRoute::Speaker);
        assert_eq!(
            recipe.sources[0].layers[0].0,
            LayerSpec::Gymnopedie(GymnopedieVoice::Acoustic)
        );
    }

    #[test]
    fn test_seeds_distinct_within_preset() {
        let recipe = Recipe::for_preset(PresetId::ForestWind, OutputRoute::Speaker);
        assert_ne!(recipe.seed(0, 0), recipe.seed(1, 0));
    }
}
