//! Preset identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresetId {
    PinkNoise,
    OceanWaves,
    Rain,
    ForestWind,
    ForestBirds,
    Bubbles,
    TreeChime,
    MusicBox,
    MoonlitGymnopedie,
    AcousticGymnopedie,
    JupiterHymn,
    AcousticJupiter,
    CathedralStillness,
    MidnightHum,
    TestTone,
}

impl PresetId {
    pub fn all() -> &'static [PresetId] {
        &[
            PresetId::PinkNoise,
            PresetId::OceanWaves,
            PresetId::Rain,
            PresetId::ForestWind,
            PresetId::ForestBirds,
            PresetId::Bubbles,
            PresetId::TreeChime,
            PresetId::MusicBox,
            PresetId::MoonlitGymnopedie,
            PresetId::AcousticGymnopedie,
            PresetId::JupiterHymn,
            PresetId::AcousticJupiter,
            PresetId::CathedralStillness,
            PresetId::MidnightHum,
            PresetId::TestTone,
        ]
    }

    /// Stable identifier, used for logging and persisted settings.
    pub fn name(self) -> &'static str {
        match self {
            PresetId::PinkNoise => "pink_noise",
            PresetId::OceanWaves => "ocean_waves",
            PresetId::Rain => "rain",
            PresetId::ForestWind => "forest_wind",
            PresetId::ForestBirds => "forest_birds",
            PresetId::Bubbles => "bubbles",
            PresetId::TreeChime => "tree_chime",
            PresetId::MusicBox => "music_box",
            PresetId::MoonlitGymnopedie => "moonlit_gymnopedie",
            PresetId::AcousticGymnopedie => "acoustic_gymnopedie",
            PresetId::JupiterHymn => "jupiter_hymn",
            PresetId::AcousticJupiter => "acoustic_jupiter",
            PresetId::CathedralStillness => "cathedral_stillness",
            PresetId::MidnightHum => "midnight_hum",
            PresetId::TestTone => "test_tone",
        }
    }

    /// Display title for now-playing surfaces.
    pub fn title(self) -> &'static str {
        match self {
            PresetId::PinkNoise => "Pink Noise",
            PresetId::OceanWaves => "Ocean Waves",
            PresetId::Rain => "Rain",
            PresetId::ForestWind => "Forest Wind",
            PresetId::ForestBirds => "Forest Birds",
            PresetId::Bubbles => "Bubbles",
            PresetId::TreeChime => "Tree Chime",
            PresetId::MusicBox => "Music Box",
            PresetId::MoonlitGymnopedie => "Moonlit Gymnopédie",
            PresetId::AcousticGymnopedie => "Acoustic Gymnopédie",
            PresetId::JupiterHymn => "Jupiter",
            PresetId::AcousticJupiter => "Acoustic Jupiter",
            PresetId::CathedralStillness => "Cathedral Stillness",
            PresetId::MidnightHum => "Midnight Hum",
            PresetId::TestTone => "Test Tone",
        }
    }

    pub fn from_name(name: &str) -> Option<PresetId> {
        Self::all().iter().copied().find(|id| id.name() == name)
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
