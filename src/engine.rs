//! NocturneEngine that owns the session control thread and its collaborators.

use crate::{NocturneEngineBuilder, Result};
use nocturne_core::OutputRoute;
use nocturne_session::{
    ControlHandle, PauseReason, RouteMonitor, SessionController, SessionRuntime, SessionSnapshot,
    SessionState, Settings, Subscription,
};
use nocturne_synth::PresetId;
use std::sync::Arc;
use tracing::info;

/// Single playback engine for an application.
///
/// Wraps a [`SessionRuntime`] and forwards the public playback operations
/// through its [`ControlHandle`]. Platform callbacks (route changes,
/// interruptions, system volume, breaks) go through [`handle`](Self::handle).
///
/// # Example
///
/// ```
/// use nocturne::prelude::*;
///
/// let engine = NocturneEngine::builder().build()?;
/// engine.play(PresetId::Rain)?;
/// engine.pause(PauseReason::User);
/// engine.resume()?;
/// engine.stop();
/// # Ok::<(), nocturne::Error>(())
/// ```
pub struct NocturneEngine {
    runtime: Option<SessionRuntime>,
    control: ControlHandle,
    route_monitor: Arc<dyn RouteMonitor>,
    subscriptions: Vec<Subscription>,
    sample_rate: f64,
}

impl NocturneEngine {
    pub fn builder() -> NocturneEngineBuilder {
        NocturneEngineBuilder::default()
    }

    pub(crate) fn new(
        runtime: SessionRuntime,
        control: ControlHandle,
        route_monitor: Arc<dyn RouteMonitor>,
        subscriptions: Vec<Subscription>,
        sample_rate: f64,
    ) -> Self {
        Self {
            runtime: Some(runtime),
            control,
            route_monitor,
            subscriptions,
            sample_rate,
        }
    }

    // =========================================================================
    // Playback
    // =========================================================================

    /// Start `preset`, replacing whatever is playing. Blocks until the
    /// preset is audible or has failed.
    pub fn play(&self, preset: PresetId) -> Result<()> {
        Ok(self.control.play(preset)?)
    }

    /// Fade out over the configured default and stop.
    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn stop_with_fade(&self, fade_out_secs: f32) {
        self.control.stop_with_fade(fade_out_secs);
    }

    /// Run `completion` on the control thread once the fade-out finishes.
    pub fn stop_and_wait<F>(&self, fade_out_secs: Option<f32>, completion: F)
    where
        F: FnOnce(&mut SessionController) + Send + 'static,
    {
        self.control.stop_and_wait(fade_out_secs, completion);
    }

    /// Fade out the current preset, then play `preset`.
    pub fn switch_to(&self, preset: PresetId) {
        self.control.switch_to(preset);
    }

    pub fn pause(&self, reason: PauseReason) {
        self.control.pause(reason);
    }

    pub fn resume(&self) -> Result<()> {
        Ok(self.control.resume()?)
    }

    pub fn update_settings(&self, settings: Settings) {
        self.control.update_settings(settings);
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.control.snapshot()
    }

    pub fn state(&self) -> SessionState {
        self.snapshot().state
    }

    pub fn is_playing(&self) -> bool {
        self.snapshot().is_playing
    }

    pub fn current_preset(&self) -> Option<PresetId> {
        self.snapshot().current_preset
    }

    pub fn output_route(&self) -> OutputRoute {
        self.snapshot().output_route
    }

    /// Why playback is paused, if it is.
    pub fn pause_reason(&self) -> Option<PauseReason> {
        self.snapshot().pause_reason
    }

    /// Last system volume reported through the control handle.
    pub fn system_volume(&self) -> f32 {
        self.snapshot().system_volume
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        self.control.subscribe(listener)
    }

    /// Handle for platform callbacks and other threads.
    pub fn handle(&self) -> ControlHandle {
        self.control.clone()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Stop the route monitor, drop state callbacks, then stop the control
    /// thread. The controller releases its sources and deactivates the audio
    /// session on the way out.
    pub fn shutdown(mut self) -> Result<SessionController> {
        let controller = self.teardown()?;
        info!("Nocturne engine shut down");
        Ok(controller)
    }

    fn teardown(&mut self) -> Result<SessionController> {
        self.route_monitor.stop();
        self.subscriptions.clear();
        match self.runtime.take() {
            Some(runtime) => Ok(runtime.shutdown()?),
            None => Err(nocturne_session::Error::RuntimeUnavailable.into()),
        }
    }
}

impl Drop for NocturneEngine {
    fn drop(&mut self) {
        if self.runtime.is_some() {
            let _ = self.teardown();
        }
    }
}
