//! # Nocturne - Ambient Soundscape Engine
//!
//! Synthesized sleep and focus soundscapes with playback that stays safe
//! around headphones, interruptions and system volume.
//!
//! ## Architecture
//!
//! Nocturne is an umbrella crate that coordinates:
//! - **nocturne-core** - Sources, render graph, output devices, routes, audio sessions
//! - **nocturne-dsp** - Oscillators, noise, LFOs, envelopes, filters, reverb, limiter, mixer
//! - **nocturne-synth** - Note scheduling, tempo maps, timbres, preset recipes and the preset builder
//! - **nocturne-session** - Playback controller, fades, scheduling, gain compensation, runtime thread
//!
//! ## Quick Start
//!
//! ```
//! use nocturne::prelude::*;
//!
//! let engine = NocturneEngine::builder()
//!     .route_monitor(StaticRouteMonitor::new(OutputRoute::Headphones))
//!     .build()?;
//!
//! engine.play(PresetId::Rain)?;
//! engine.switch_to(PresetId::MusicBox);
//!
//! let controller = engine.shutdown()?;
//! assert!(!controller.is_playing());
//! # Ok::<(), nocturne::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Offline output device, no hardware
//! - `cpal-output` - Default output through CPAL

/// Re-export of nocturne-core for direct access
pub use nocturne_core as core;

pub use nocturne_dsp as dsp;

pub use nocturne_synth as synth;

pub use nocturne_session as session;

// Core types
pub use nocturne_core::{
    AudioSession, EngineConfig, NullSession, OfflineDevice, OfflineHandle, OutputDevice,
    OutputRoute, SessionCategory, Source, SourceState,
};

#[cfg(feature = "cpal-output")]
pub use nocturne_core::CpalDevice;

// Presets
pub use nocturne_synth::{PresetBuilder, PresetId};

// Session control
pub use nocturne_session::{
    ControlHandle, MemorySettingsStore, NowPlaying, NullNowPlaying, PauseReason, RouteMonitor,
    SessionConfig, SessionController, SessionSnapshot, SessionState, Settings, SettingsStore,
    StaticRouteMonitor, Subscription,
};

pub mod error;
pub use error::{Error, Result};

mod builder;
mod engine;

pub use builder::NocturneEngineBuilder;
pub use engine::NocturneEngine;

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{NocturneEngine, NocturneEngineBuilder};

    pub use crate::{Error, Result};

    pub use crate::{OutputRoute, PauseReason, PresetId, SessionSnapshot, SessionState, Settings};

    // Collaborators
    pub use crate::{
        AudioSession, MemorySettingsStore, NowPlaying, NullSession, OutputDevice, RouteMonitor,
        SettingsStore, StaticRouteMonitor,
    };
}
