//! Concrete soundscapes. Each type here is a [`nocturne_core::Signal`];
//! [`crate::Recipe`] decides how they are mixed and processed.

pub mod ambient;
pub mod birds;
pub mod bubbles;
pub mod chime;
pub mod drone;
pub mod gymnopedie;
pub mod hymn;
pub mod music_box;

pub use ambient::{ocean_waves, swell, ForestWind, Leaves, OceanWaves, PinkBed, Rain, Surf};
pub use birds::ForestBirds;
pub use bubbles::Bubbles;
pub use chime::{ChimeStrike, TreeChime};
pub use drone::{brown_bed, sub_bass_fundamental, BrownBed, SubBass};
pub use gymnopedie::{Gymnopedie, GymnopedieVoice};
pub use hymn::{AcousticHymn, HymnChimes, HymnClock, HymnDrone, HymnMelody, HymnStyle};
pub use music_box::MusicBox;
