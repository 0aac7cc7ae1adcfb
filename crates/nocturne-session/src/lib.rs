//! Playback session control for Nocturne.
//!
//! A single [`SessionController`] decides what is audible. It builds preset
//! sources, starts and fades them, pauses for interruptions, breaks and
//! unsafe routes, and keeps `system volume × master volume` under a cap.
//!
//! # Control context
//!
//! All state changes run on one thread. [`SessionRuntime`] owns the
//! controller there and hands out [`ControlHandle`]s. Fades and delayed
//! teardown are deadline entries in a [`Scheduler`], each stamped with the
//! playback generation so that work left over from an older `play` does
//! nothing when it fires.
//!
//! # Example
//!
//! ```
//! use nocturne_core::{EngineConfig, OfflineDevice};
//! use nocturne_session::{SessionController, SessionRuntime};
//! use nocturne_synth::PresetId;
//!
//! let device = OfflineDevice::new(EngineConfig::default()).unwrap();
//! let controller = SessionController::builder().build(Box::new(device)).unwrap();
//! let runtime = SessionRuntime::spawn(controller).unwrap();
//!
//! let control = runtime.handle();
//! control.play(PresetId::Rain).unwrap();
//! assert!(control.snapshot().is_playing);
//!
//! let controller = runtime.shutdown().unwrap();
//! assert!(!controller.is_playing());
//! ```

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::{SessionConfig, Settings};

mod state;
pub use state::{PauseReason, SessionEvent, SessionFsm, SessionState, Transition};

mod gain;
pub use gain::GainCompensation;

mod fade;
pub use fade::{FadeDirection, FadeOp};

mod scheduler;
pub use scheduler::{Clock, ManualClock, Scheduler, SystemClock, TaskHandle};

mod collaborators;
pub use collaborators::{
    MemorySettingsStore, NowPlaying, NullNowPlaying, RouteMonitor, SettingsStore,
    StaticRouteMonitor,
};

mod observer;
pub use observer::{Notifier, SessionSnapshot, Subscription};

mod controller;
pub use controller::{Completion, SessionController, SessionControllerBuilder};

mod runtime;
pub use runtime::{ControlHandle, SessionRuntime};
