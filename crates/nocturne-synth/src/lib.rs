//! Composite soundscapes for Nocturne.
//!
//! Builds on the primitives in `nocturne-dsp`:
//!
//! - **[`note`]**: bar/beat note tables, the breath rule, scheduling
//! - **[`tempo`]**: piecewise real-to-musical time maps and section lookup
//! - **[`timbre`]**: harmonic, detuned, bell and plucked-string voices
//! - **[`layer`]**: looping melodic layers and cross-fades
//! - **[`presets`]**: noise beds, birdsong, chimes, bubbles, the music box,
//!   the Gymnopédie and the hymn in synth and guitar voicings, and the
//!   midnight hum
//! - **[`Recipe`]** / **[`PresetBuilder`]**: what a preset is made of, and
//!   turning that into [`nocturne_core::Source`]s
//!
//! # Example
//!
//! ```
//! use nocturne_core::OutputRoute;
//! use nocturne_synth::{PresetBuilder, PresetId};
//!
//! let builder = PresetBuilder::new(48_000.0).unwrap();
//! let sources = builder.build(PresetId::MusicBox, OutputRoute::Headphones).unwrap();
//! assert_eq!(sources.len(), 1);
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod note;
pub use note::{Breath, Meter, Note, ScheduledNote};

pub mod tempo;
pub use tempo::{SectionMap, TempoMap, TempoSegment};

pub mod timbre;
pub use timbre::{HighFreqTaper, Timbre};

pub mod layer;
pub use layer::{Crossfade, MelodicLayer};

pub mod presets;

mod preset;
pub use preset::PresetId;

mod recipe;
pub use recipe::{EffectsSpec, LayerSpec, LimiterSpec, Recipe, SourceKind, SourceSpec};

mod builder;
pub use builder::PresetBuilder;
