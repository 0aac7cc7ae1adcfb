//! Core runtime for Nocturne: signals, sources, output devices.
//!
//! # Primary API
//!
//! - [`Signal`]: time in, sample out. Everything audible implements it.
//! - [`Source`]: a signal ready to be attached to a device, in one of two
//!   closed kinds (processed or dry).
//! - [`OutputDevice`]: register, start, stop, master volume, and bulk
//!   source lifecycle.
//! - [`OfflineDevice`]: headless device for tests and offline rendering.
//!
//! # Feature-gated APIs
//!
//! - `"cpal-output"`: [`CpalDevice`] for hardware playback
//!
//! # Example
//!
//! ```
//! use nocturne_core::{EngineConfig, FnSignal, OfflineDevice, OutputDevice, Source};
//!
//! let mut device = OfflineDevice::new(EngineConfig::default()).unwrap();
//! let handle = device.handle();
//!
//! let mut tone = Source::dry(
//!     "tone",
//!     Box::new(FnSignal(|t: f64| (t * 440.0 * std::f64::consts::TAU).sin() as f32)),
//!     0.5,
//! );
//! device.register(&mut tone).unwrap();
//! device.start().unwrap();
//! tone.apply_fade_in(0.0);
//!
//! let block = handle.render(480);
//! assert!(block.iter().any(|s| *s != 0.0));
//! ```

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::EngineConfig;

pub(crate) mod lockfree;
pub use lockfree::{AtomicFloat, Sequence};

mod smooth;
pub use smooth::SmoothedValue;

mod signal;
pub use signal::{BoxedSignal, FnSignal, Signal, Silence};

mod source;
pub use source::{
    DrySource, ProcessedSource, Source, SourceControl, SourceId, SourceState, SourceVoice,
};

mod render;
pub use render::RenderGraph;

mod device;
pub use device::OutputDevice;

mod offline;
pub use offline::{OfflineDevice, OfflineHandle, MASTER_HISTORY_CAP};

#[cfg(feature = "cpal-output")]
mod output;
#[cfg(feature = "cpal-output")]
pub use output::CpalDevice;

mod route;
pub use route::OutputRoute;

mod session;
pub use session::{AudioSession, NullSession, SessionCategory};

/// Convenient re-exports.
pub mod prelude {
    pub use crate::{
        AudioSession, BoxedSignal, EngineConfig, OfflineDevice, OutputDevice, OutputRoute,
        SessionCategory, Signal, Source, SourceState,
    };
}
