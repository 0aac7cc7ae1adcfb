//! The playback session controller.
//!
//! One controller owns the output device, the audio session and the sources
//! of the preset that is meant to be audible. Every operation runs on the
//! control context (see [`SessionRuntime`](crate::SessionRuntime)); delayed
//! work goes through the [`Scheduler`] stamped with the current generation,
//! and is dropped on its next run if a newer `play` has happened since.

use crate::collaborators::{
    MemorySettingsStore, NowPlaying, NullNowPlaying, RouteMonitor, SettingsStore,
    StaticRouteMonitor,
};
use crate::fade::{FadeDirection, FadeOp};
use crate::gain::GainCompensation;
use crate::observer::{Notifier, SessionSnapshot};
use crate::scheduler::{Clock, Scheduler, SystemClock, TaskHandle};
use crate::state::{PauseReason, SessionEvent, SessionFsm, SessionState, Transition};
use crate::{Error, Result, SessionConfig, Settings};
use nocturne_core::{AudioSession, NullSession, OutputDevice, OutputRoute, SessionCategory, Source};
use nocturne_synth::{PresetBuilder, PresetId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Runs once a stop has fully torn down, with the controller available so
/// that it can start the next preset.
pub type Completion = Box<dyn FnOnce(&mut SessionController) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    FadeTick,
    FinishStop,
    FinishPause,
}

struct ActiveFade {
    op: FadeOp,
    tick: TaskHandle,
}

pub struct SessionController {
    config: SessionConfig,
    gain: GainCompensation,
    fsm: SessionFsm,

    device: Box<dyn OutputDevice>,
    audio_session: Box<dyn AudioSession>,
    route_monitor: Arc<dyn RouteMonitor>,
    now_playing: Box<dyn NowPlaying>,
    settings_store: Box<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    builder: PresetBuilder,

    scheduler: Scheduler<Task>,
    generation: u64,
    current_preset: Option<PresetId>,
    sources: Vec<Source>,
    route: OutputRoute,
    system_volume: f32,
    /// Master volume to return to after a fade-out: the current app gain.
    target_volume: f32,
    fade: Option<ActiveFade>,
    pending_pause: Option<TaskHandle>,
    /// A teardown is in flight; further stop requests queue here.
    stopping: bool,
    completions: Vec<Completion>,
    /// Route at the start of the current interruption, and whether it has
    /// since turned public.
    interruption: Option<(OutputRoute, bool)>,

    settings: Settings,
    notifier: Notifier,
}

/// Wires a [`SessionController`] to its collaborators.
pub struct SessionControllerBuilder {
    config: SessionConfig,
    audio_session: Box<dyn AudioSession>,
    route_monitor: Arc<dyn RouteMonitor>,
    now_playing: Box<dyn NowPlaying>,
    settings_store: Box<dyn SettingsStore>,
    clock: Arc<dyn Clock>,
    notifier: Notifier,
}

impl Default for SessionControllerBuilder {
    fn default() -> Self {
        Self {
            config: SessionConfig::default(),
            audio_session: Box::new(NullSession::new()),
            route_monitor: Arc::new(StaticRouteMonitor::default()),
            now_playing: Box::new(NullNowPlaying),
            settings_store: Box::new(MemorySettingsStore::default()),
            clock: Arc::new(SystemClock::new()),
            notifier: Notifier::new(),
        }
    }
}

impl SessionControllerBuilder {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn audio_session(mut self, session: Box<dyn AudioSession>) -> Self {
        self.audio_session = session;
        self
    }

    pub fn route_monitor(mut self, monitor: Arc<dyn RouteMonitor>) -> Self {
        self.route_monitor = monitor;
        self
    }

    pub fn now_playing(mut self, now_playing: Box<dyn NowPlaying>) -> Self {
        self.now_playing = now_playing;
        self
    }

    pub fn settings_store(mut self, store: Box<dyn SettingsStore>) -> Self {
        self.settings_store = store;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Publish through an existing notifier instead of a fresh one.
    pub fn notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// Loads settings, then takes ownership of `device`.
    pub fn build(mut self, device: Box<dyn OutputDevice>) -> Result<SessionController> {
        self.config.validate()?;

        let settings = match self.settings_store.load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            }
        };

        let builder = PresetBuilder::new(device.sample_rate())?;
        let route = self.route_monitor.current_route();
        let gain = GainCompensation::from_config(&self.config);

        let mut controller = SessionController {
            gain,
            fsm: SessionFsm::new(),
            device,
            audio_session: self.audio_session,
            route_monitor: self.route_monitor,
            now_playing: self.now_playing,
            settings_store: self.settings_store,
            clock: self.clock,
            builder,
            scheduler: Scheduler::new(),
            generation: 0,
            current_preset: None,
            sources: Vec::new(),
            route,
            system_volume: 1.0,
            target_volume: gain.app_gain(1.0),
            fade: None,
            pending_pause: None,
            stopping: false,
            completions: Vec::new(),
            interruption: None,
            settings,
            notifier: self.notifier,
            config: self.config,
        };
        // The device may start from unity; hold it to the cap before anything plays.
        controller.device.set_master_volume(controller.target_volume);
        controller.publish();
        Ok(controller)
    }
}

impl SessionController {
    pub fn builder() -> SessionControllerBuilder {
        SessionControllerBuilder::default()
    }

    // =========================================================================
    // Observable state
    // =========================================================================

    pub fn state(&self) -> SessionState {
        self.fsm.state()
    }

    pub fn is_playing(&self) -> bool {
        self.state().is_playing()
    }

    pub fn current_preset(&self) -> Option<PresetId> {
        self.current_preset
    }

    pub fn output_route(&self) -> OutputRoute {
        self.route
    }

    pub fn pause_reason(&self) -> Option<PauseReason> {
        self.state().pause_reason()
    }

    pub fn system_volume(&self) -> f32 {
        self.system_volume
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state(),
            is_playing: self.is_playing(),
            current_preset: self.current_preset,
            output_route: self.route,
            pause_reason: self.pause_reason(),
            system_volume: self.system_volume,
            generation: self.generation,
        }
    }

    /// Sources of the current preset, in build order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn device(&self) -> &dyn OutputDevice {
        self.device.as_ref()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Replace whatever is playing with `preset`.
    ///
    /// On failure the session is left idle with nothing attached.
    pub fn play(&mut self, preset: PresetId) -> Result<()> {
        self.cancel_pending();
        self.generation += 1;
        info!(preset = %preset, generation = self.generation, route = self.route.name(), "Play");

        let result = self.start_preset(preset);
        if let Err(e) = &result {
            warn!(preset = %preset, error = %e, "Play failed, cleaning up");
            self.cleanup_after_failure();
        }
        self.publish();
        result
    }

    fn start_preset(&mut self, preset: PresetId) -> Result<()> {
        self.ensure_session_active()?;
        self.release_sources();

        let mut sources = self.builder.build(preset, self.route)?;
        for source in sources.iter_mut() {
            self.device
                .register(source)
                .map_err(Error::EngineStartFailed)?;
        }
        self.sources = sources;

        self.target_volume = self.gain.app_gain(self.system_volume);
        self.device.set_master_volume(self.target_volume);
        self.device.enable_sources();
        if !self.device.is_running() {
            self.device.start().map_err(Error::EngineStartFailed)?;
        }
        for source in &self.sources {
            source.apply_fade_in(self.config.fade_in_secs);
        }

        self.current_preset = Some(preset);
        self.apply(SessionEvent::Started);
        self.now_playing.update(preset.title(), true);
        Ok(())
    }

    fn ensure_session_active(&mut self) -> Result<()> {
        if self.audio_session.is_active() {
            return Ok(());
        }
        match self.audio_session.activate(SessionCategory::Playback) {
            Ok(()) => Ok(()),
            Err(primary) => {
                warn!(error = %primary, "Playback session refused, trying ambient");
                self.audio_session
                    .activate(SessionCategory::Ambient)
                    .map_err(Error::SessionActivationFailed)
            }
        }
    }

    /// Fade out over the default stop duration and tear down.
    pub fn stop_default(&mut self) {
        self.stop(self.config.default_stop_fade_secs);
    }

    /// Fade out over `fade_out_secs`, then stop and detach every source.
    /// No-op unless playing.
    pub fn stop(&mut self, fade_out_secs: f32) {
        if !self.is_playing() {
            debug!(state = ?self.state(), "Stop ignored");
            return;
        }
        self.begin_stop(fade_out_secs);
        self.publish();
    }

    /// Like [`stop`](Self::stop), then run `completion` once teardown is
    /// done. Runs it immediately when nothing is playing. While a teardown
    /// is in flight, further completions join it rather than starting
    /// another.
    ///
    /// A `play` before teardown finishes drops queued completions.
    pub fn stop_and_wait<F>(&mut self, fade_out_secs: f32, completion: F)
    where
        F: FnOnce(&mut SessionController) + Send + 'static,
    {
        if self.stopping {
            debug!("Stop already in flight, queueing completion");
            self.completions.push(Box::new(completion));
            return;
        }
        if !self.is_playing() {
            completion(self);
            return;
        }
        self.completions.push(Box::new(completion));
        self.begin_stop(fade_out_secs);
        self.publish();
    }

    fn begin_stop(&mut self, fade_out_secs: f32) {
        let secs = fade_out_secs.max(0.0);
        info!(preset = ?self.current_preset, fade_out_secs = secs, "Stop");

        self.apply(SessionEvent::StopRequested);
        self.stopping = true;
        self.cancel_pause_task();

        if secs == 0.0 {
            self.finish_stop();
            return;
        }

        for source in &self.sources {
            source.apply_fade_out(secs);
        }
        self.start_fade(0.0, secs);
        let deadline = self.clock.now() + Duration::from_secs_f32(secs);
        self.scheduler
            .schedule(deadline, self.generation, Task::FinishStop);
    }

    fn finish_stop(&mut self) {
        self.complete_fade();
        self.device.stop();
        self.release_sources();
        self.current_preset = None;
        self.stopping = false;
        self.apply(SessionEvent::StopFinished);
        self.now_playing.clear();
        debug!(generation = self.generation, "Teardown finished");
        self.publish();

        let generation = self.generation;
        let completions = std::mem::take(&mut self.completions);
        for completion in completions {
            // A completion that plays supersedes the rest.
            if self.generation != generation {
                debug!("Dropping superseded stop completion");
                continue;
            }
            completion(self);
        }
    }

    /// Fade out and stop the engine, keeping sources attached.
    pub fn pause(&mut self, reason: PauseReason) {
        let was_playing = self.is_playing();
        if self.apply(SessionEvent::Pause(reason)) == Transition::None {
            debug!(?reason, state = ?self.state(), "Pause ignored");
            return;
        }
        info!(?reason, "Pause");

        if was_playing {
            self.start_fade(0.0, self.config.pause_fade_secs);
            let deadline = self.clock.now() + Duration::from_secs_f32(self.config.pause_fade_secs);
            self.pending_pause = Some(
                self.scheduler
                    .schedule(deadline, self.generation, Task::FinishPause),
            );
        }
        if let Some(preset) = self.current_preset {
            self.now_playing.update(preset.title(), false);
        }
        self.publish();
    }

    fn finish_pause(&mut self) {
        self.pending_pause = None;
        self.complete_fade();
        self.device.stop();
        self.device.disable_sources();
        for source in &self.sources {
            source.reset_effects_state();
        }
        debug!("Engine stopped for pause");
    }

    /// Restart a paused session. Paused for route safety, the route must be
    /// private again. Does nothing unless paused.
    pub fn resume(&mut self) -> Result<()> {
        let Some(reason) = self.pause_reason() else {
            debug!(state = ?self.state(), "Resume ignored");
            return Ok(());
        };

        if reason == PauseReason::RouteSafety {
            self.route = self.route_monitor.current_route();
            if !self.route.is_private() {
                info!(route = self.route.name(), "Resume refused on public route");
                self.publish();
                return Err(Error::UnsafeToResume);
            }
        }
        info!(?reason, "Resume");

        self.cancel_pause_task();
        if !self.device.is_running() {
            if let Err(e) = self.device.start() {
                warn!(error = %e, "Engine failed to restart");
                self.cleanup_after_failure();
                self.publish();
                return Err(Error::EngineStartFailed(e));
            }
        }
        self.device.enable_sources();
        self.start_fade(self.target_volume, self.config.fade_in_secs);

        self.apply(SessionEvent::Resumed);
        if let Some(preset) = self.current_preset {
            self.now_playing.update(preset.title(), true);
        }
        self.publish();
        Ok(())
    }

    pub fn update_settings(&mut self, settings: Settings) {
        if let Err(e) = self.settings_store.save(&settings) {
            warn!(error = %e, "Failed to save settings");
        }
        self.settings = settings;
    }

    /// Tear everything down immediately and release the audio session.
    pub fn shutdown(&mut self) {
        info!("Session shutdown");
        self.cancel_pending();
        self.generation += 1;
        self.cleanup_after_failure();
        self.audio_session.deactivate();
        self.publish();
    }

    // =========================================================================
    // Collaborator callbacks
    // =========================================================================

    pub fn on_route_changed(&mut self, route: OutputRoute) {
        debug!(from = self.route.name(), to = route.name(), "Route changed");
        if let Some((start, turned_public)) = &mut self.interruption {
            if start.is_private() && !route.is_private() {
                *turned_public = true;
            }
        }
        self.route = route;
        self.publish();
    }

    pub fn on_unsafe_route(&mut self) {
        self.pause(PauseReason::RouteSafety);
    }

    pub fn on_interruption_began(&mut self) {
        self.interruption = Some((self.route, false));
        self.pause(PauseReason::SystemInterruption);
    }

    pub fn on_interruption_ended(&mut self, should_resume: bool) {
        let turned_public = self
            .interruption
            .take()
            .map(|(_, turned)| turned)
            .unwrap_or(false);

        if !(should_resume && self.settings.auto_resume_after_interruption) {
            debug!(should_resume, "Interruption ended, staying paused");
            return;
        }
        if turned_public {
            debug!("Route turned public during interruption, staying paused");
            return;
        }
        if self.pause_reason() != Some(PauseReason::SystemInterruption) {
            return;
        }
        if let Err(e) = self.resume() {
            warn!(error = %e, "Auto-resume after interruption failed");
        }
    }

    pub fn on_system_volume_changed(&mut self, volume: f32) {
        self.system_volume = volume;
        self.target_volume = self.gain.app_gain(volume);
        debug!(volume, app_gain = self.target_volume, "System volume changed");

        let target = self.target_volume;
        if let Some(fade) = &mut self.fade {
            // A fade-out keeps running to silence, but never above the new
            // app gain; its own target is picked up again on resume.
            if fade.op.direction() == FadeDirection::In {
                fade.op.retarget(target);
            }
            fade.op.limit(target);
        } else if self.is_playing() {
            self.device.set_master_volume(target);
        }
        if self.device.master_volume() > target {
            self.device.set_master_volume(target);
        }
        self.publish();
    }

    pub fn on_break_started(&mut self) {
        self.pause(PauseReason::ScheduledBreak);
    }

    pub fn on_break_ended(&mut self) {
        if self.pause_reason() != Some(PauseReason::ScheduledBreak)
            || !self.settings.resume_after_break
        {
            return;
        }
        if let Err(e) = self.resume() {
            warn!(error = %e, "Resume after break failed");
        }
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Run every continuation that is due.
    pub fn poll(&mut self) {
        let now = self.clock.now();
        while let Some((handle, task)) = self.scheduler.pop_due(now) {
            self.run_task(handle, task);
        }
    }

    fn run_task(&mut self, handle: TaskHandle, task: Task) {
        if handle.generation() != self.generation {
            debug!(
                ?task,
                scheduled = handle.generation(),
                current = self.generation,
                "Dropping stale task"
            );
            return;
        }
        match task {
            Task::FadeTick => self.fade_tick(),
            Task::FinishStop => {
                if self.state() == SessionState::Stopping {
                    self.finish_stop();
                }
            }
            Task::FinishPause => {
                if self.pause_reason().is_some() {
                    self.finish_pause();
                    self.publish();
                }
            }
        }
    }

    fn start_fade(&mut self, target: f32, secs: f32) {
        self.cancel_fade();
        let op = FadeOp::new(
            self.device.master_volume(),
            target,
            Duration::from_secs_f32(secs.max(0.0)),
            self.config.control_tick,
            self.generation,
        );
        let tick = self.schedule_tick();
        self.fade = Some(ActiveFade { op, tick });
    }

    fn schedule_tick(&mut self) -> TaskHandle {
        let deadline = self.clock.now() + self.config.control_tick;
        self.scheduler
            .schedule(deadline, self.generation, Task::FadeTick)
    }

    fn fade_tick(&mut self) {
        let Some(fade) = &mut self.fade else {
            return;
        };
        if fade.op.generation() != self.generation {
            self.fade = None;
            return;
        }
        let value = fade.op.advance();
        let done = fade.op.is_done();
        self.device.set_master_volume(value);

        if done {
            self.fade = None;
        } else {
            let tick = self.schedule_tick();
            if let Some(fade) = &mut self.fade {
                fade.tick = tick;
            }
        }
    }

    /// Jump a running fade to its target.
    fn complete_fade(&mut self) {
        if let Some(fade) = self.fade.take() {
            self.scheduler.cancel(fade.tick);
            self.device.set_master_volume(fade.op.target());
        }
    }

    fn cancel_fade(&mut self) {
        if let Some(fade) = self.fade.take() {
            self.scheduler.cancel(fade.tick);
        }
    }

    fn cancel_pause_task(&mut self) {
        if let Some(handle) = self.pending_pause.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Cancel every continuation and drop queued stop completions.
    fn cancel_pending(&mut self) {
        self.fade = None;
        self.pending_pause = None;
        let cancelled = self.scheduler.cancel_all();
        let superseded = self.completions.len();
        self.completions.clear();
        self.stopping = false;
        if cancelled + superseded > 0 {
            debug!(cancelled, superseded, "Cancelled pending work");
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Reset effect tails and detach every source.
    fn release_sources(&mut self) {
        for source in &self.sources {
            source.reset_effects_state();
        }
        self.device.clear_sources();
        self.sources.clear();
    }

    fn cleanup_after_failure(&mut self) {
        self.cancel_pending();
        self.current_preset = None;
        self.interruption = None;
        if self.device.is_running() {
            self.device.stop();
        }
        self.release_sources();
        self.apply(SessionEvent::Reset);
        self.now_playing.clear();
    }

    fn apply(&mut self, event: SessionEvent) -> Transition {
        let from = self.fsm.state();
        let transition = self.fsm.transition(event);
        if let Transition::Changed(to) = transition {
            debug!(?event, ?from, ?to, "Session transition");
        }
        transition
    }

    fn publish(&self) {
        self.notifier.publish(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualClock;
    use nocturne_core::{EngineConfig, OfflineDevice, OfflineHandle, SourceState};

    fn controller(route: OutputRoute) -> (SessionController, OfflineHandle, ManualClock) {
        let device = OfflineDevice::new(EngineConfig::default()).unwrap();
        let handle = device.handle();
        let clock = ManualClock::new();
        let controller = SessionController::builder()
            .route_monitor(Arc::new(StaticRouteMonitor::new(route)))
            .clock(Arc::new(clock.clone()))
            .build(Box::new(device))
            .unwrap();
        (controller, handle, clock)
    }

    fn run_for(controller: &mut SessionController, clock: &ManualClock, secs: f64) {
        let tick = controller.config().control_tick;
        let ticks = (secs / tick.as_secs_f64()).ceil() as u32;
        for _ in 0..ticks {
            clock.advance(tick);
            controller.poll();
        }
    }

    #[test]
    fn test_play_starts_sources() {
        let (mut c, device, _clock) = controller(OutputRoute::Headphones);
        c.play(PresetId::Rain).unwrap();

        assert!(c.is_playing());
        assert_eq!(c.current_preset(), Some(PresetId::Rain));
        assert_eq!(c.generation(), 1);
        assert!(device.is_running());
        assert!(c
            .sources()
            .iter()
            .all(|s| s.state() == Some(SourceState::Started)));
    }

    #[test]
    fn test_stale_stop_is_dropped() {
        let (mut c, _device, clock) = controller(OutputRoute::Headphones);
        c.play(PresetId::Rain).unwrap();
        let stale = c.generation();
        c.play(PresetId::OceanWaves).unwrap();

        // A teardown left over from the first attempt.
        c.scheduler.schedule(clock.now(), stale, Task::FinishStop);
        c.poll();

        assert!(c.is_playing());
        assert_eq!(c.current_preset(), Some(PresetId::OceanWaves));
    }

    #[test]
    fn test_stale_fade_tick_is_dropped() {
        let (mut c, device, clock) = controller(OutputRoute::Headphones);
        c.play(PresetId::Rain).unwrap();
        let stale = c.generation();
        c.play(PresetId::Rain).unwrap();
        let before = device.master_history().len();

        c.fade = Some(ActiveFade {
            op: FadeOp::new(1.0, 0.0, Duration::from_millis(100), Duration::from_millis(20), stale),
            tick: c.scheduler.schedule(clock.now(), stale, Task::FadeTick),
        });
        c.poll();
        assert_eq!(device.master_history().len(), before);
    }

    #[test]
    fn test_zero_fade_stop_is_synchronous() {
        let (mut c, device, _clock) = controller(OutputRoute::Speaker);
        c.play(PresetId::PinkNoise).unwrap();
        c.stop(0.0);

        assert_eq!(c.state(), SessionState::Idle);
        assert_eq!(c.current_preset(), None);
        assert_eq!(device.source_count(), 0);
        assert!(!device.is_running());
    }

    #[test]
    fn test_stop_flips_playing_immediately() {
        let (mut c, device, clock) = controller(OutputRoute::Speaker);
        c.play(PresetId::PinkNoise).unwrap();
        c.stop_default();

        assert!(!c.is_playing());
        assert_eq!(c.state(), SessionState::Stopping);
        assert_eq!(device.source_count(), 1);

        run_for(&mut c, &clock, 0.5);
        assert_eq!(c.state(), SessionState::Idle);
        assert_eq!(device.source_count(), 0);
        assert_eq!(device.master_history().last().copied(), Some(0.0));
    }

    #[test]
    fn test_play_during_pause_fade_cancels_it() {
        let (mut c, device, clock) = controller(OutputRoute::Headphones);
        c.play(PresetId::Rain).unwrap();
        c.pause(PauseReason::User);
        run_for(&mut c, &clock, 0.2);
        c.play(PresetId::MidnightHum).unwrap();
        run_for(&mut c, &clock, 1.0);

        assert!(c.is_playing());
        assert!(device.is_running());
        assert_eq!(c.pause_reason(), None);
    }

    #[test]
    fn test_resume_during_pause_fade_keeps_engine_running() {
        let (mut c, device, clock) = controller(OutputRoute::Headphones);
        c.play(PresetId::Rain).unwrap();
        c.pause(PauseReason::User);
        run_for(&mut c, &clock, 0.2);
        c.resume().unwrap();
        run_for(&mut c, &clock, 2.0);

        assert!(c.is_playing());
        assert!(device.is_running());
        assert_eq!(device.stops(), 0);
    }

    #[test]
    fn test_settings_pass_through() {
        let store = MemorySettingsStore::default();
        let device = OfflineDevice::new(EngineConfig::default()).unwrap();
        let mut c = SessionController::builder()
            .settings_store(Box::new(store.clone()))
            .build(Box::new(device))
            .unwrap();

        let settings = Settings {
            auto_resume_after_interruption: false,
            ..Default::default()
        };
        c.update_settings(settings.clone());
        assert_eq!(c.settings(), &settings);
        assert_eq!(store.settings(), settings);
    }
}
