//! Builder for configuring and constructing a `NocturneEngine`.

use crate::{NocturneEngine, Result};
use nocturne_core::{AudioSession, EngineConfig, OutputDevice};
use nocturne_session::{
    NowPlaying, RouteMonitor, SessionConfig, SessionController, SessionRuntime, SessionSnapshot,
    SettingsStore, StaticRouteMonitor, Subscription,
};
use std::sync::Arc;
use tracing::{debug, info};

type StateCallback = Box<dyn Fn(&SessionSnapshot) + Send + Sync>;

/// Collaborators default to the host-less implementations: no audio-session
/// management, a fixed route, no now-playing display and in-memory settings.
///
/// Without an explicit [`device`](Self::device) the engine renders to an
/// `OfflineDevice`, or to the default CPAL output when the `cpal-output`
/// feature is enabled.
///
/// # Init order
///
/// `build()` loads settings, wires the output device into the session
/// controller and spawns its control thread, registers state callbacks, and
/// only then starts the route monitor. [`NocturneEngine::shutdown`] undoes
/// these steps in reverse.
///
/// # Example
///
/// ```
/// use nocturne::prelude::*;
///
/// let engine = NocturneEngine::builder()
///     .sample_rate(44100.0)
///     .route_monitor(StaticRouteMonitor::new(OutputRoute::Headphones))
///     .build()?;
///
/// engine.play(PresetId::OceanWaves)?;
/// assert!(engine.is_playing());
/// engine.shutdown()?;
/// # Ok::<(), nocturne::Error>(())
/// ```
pub struct NocturneEngineBuilder {
    engine_config: EngineConfig,
    session_config: SessionConfig,
    device: Option<Box<dyn OutputDevice>>,
    audio_session: Option<Box<dyn AudioSession>>,
    route_monitor: Option<Arc<dyn RouteMonitor>>,
    now_playing: Option<Box<dyn NowPlaying>>,
    settings_store: Option<Box<dyn SettingsStore>>,
    callbacks: Vec<StateCallback>,
}

impl Default for NocturneEngineBuilder {
    fn default() -> Self {
        Self {
            engine_config: EngineConfig::default(),
            session_config: SessionConfig::default(),
            device: None,
            audio_session: None,
            route_monitor: None,
            now_playing: None,
            settings_store: None,
            callbacks: Vec::new(),
        }
    }
}

impl NocturneEngineBuilder {
    /// Default: 48000. Ignored when a [`device`](Self::device) is supplied.
    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.engine_config.sample_rate = sample_rate;
        self
    }

    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = config;
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn device(mut self, device: Box<dyn OutputDevice>) -> Self {
        self.device = Some(device);
        self
    }

    pub fn audio_session(mut self, session: impl AudioSession + 'static) -> Self {
        self.audio_session = Some(Box::new(session));
        self
    }

    /// Default: a [`StaticRouteMonitor`] reporting an unknown route.
    pub fn route_monitor(mut self, monitor: impl RouteMonitor + 'static) -> Self {
        self.route_monitor = Some(Arc::new(monitor));
        self
    }

    pub fn now_playing(mut self, now_playing: impl NowPlaying + 'static) -> Self {
        self.now_playing = Some(Box::new(now_playing));
        self
    }

    pub fn settings_store(mut self, store: impl SettingsStore + 'static) -> Self {
        self.settings_store = Some(Box::new(store));
        self
    }

    /// Called from the control thread with every published state change.
    pub fn on_state_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(callback));
        self
    }

    pub fn build(self) -> Result<NocturneEngine> {
        self.engine_config.validate()?;

        let device = match self.device {
            Some(device) => device,
            None => default_device(self.engine_config)?,
        };
        let sample_rate = device.sample_rate();

        let route_monitor: Arc<dyn RouteMonitor> = self
            .route_monitor
            .unwrap_or_else(|| Arc::new(StaticRouteMonitor::default()));

        // Settings are loaded inside the controller build.
        let mut controller = SessionController::builder()
            .config(self.session_config)
            .route_monitor(Arc::clone(&route_monitor));
        if let Some(session) = self.audio_session {
            controller = controller.audio_session(session);
        }
        if let Some(now_playing) = self.now_playing {
            controller = controller.now_playing(now_playing);
        }
        if let Some(store) = self.settings_store {
            controller = controller.settings_store(store);
        }
        let controller = controller.build(device)?;
        let runtime = SessionRuntime::spawn(controller)?;
        let control = runtime.handle();

        let subscriptions: Vec<Subscription> = self
            .callbacks
            .into_iter()
            .map(|callback| control.subscribe(move |snapshot| callback(snapshot)))
            .collect();
        debug!(callbacks = subscriptions.len(), "State callbacks registered");

        route_monitor.start(control.clone());
        info!(sample_rate, route = ?route_monitor.current_route(), "Nocturne engine ready");

        Ok(NocturneEngine::new(
            runtime,
            control,
            route_monitor,
            subscriptions,
            sample_rate,
        ))
    }
}

#[cfg(feature = "cpal-output")]
fn default_device(config: EngineConfig) -> Result<Box<dyn OutputDevice>> {
    Ok(Box::new(nocturne_core::CpalDevice::new(None, config)?))
}

#[cfg(not(feature = "cpal-output"))]
fn default_device(config: EngineConfig) -> Result<Box<dyn OutputDevice>> {
    Ok(Box::new(nocturne_core::OfflineDevice::new(config)?))
}
