//! Test harness for session controller scenarios.
//!
//! Drives a [`SessionController`] against an [`OfflineDevice`] with a manual
//! clock, so fades and delayed teardown advance only when a test says so.

#![allow(dead_code)]

use nocturne_core::{
    AudioSession, EngineConfig, Error as CoreError, NullSession, OfflineDevice, OfflineHandle,
    OutputRoute, SessionCategory, SourceControl, SourceState,
};
use nocturne_session::{
    ManualClock, MemorySettingsStore, NowPlaying, SessionController, Settings, StaticRouteMonitor,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Route controller logs to the test writer. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Values within this of each other are treated as equal volumes.
pub const VOLUME_EPSILON: f32 = 1e-5;

/// Last thing the presenter was told. `None` after `clear`.
#[derive(Clone, Default)]
pub struct RecordingNowPlaying {
    last: Arc<Mutex<Option<(String, bool)>>>,
}

impl RecordingNowPlaying {
    pub fn last(&self) -> Option<(String, bool)> {
        self.last.lock().clone()
    }
}

impl NowPlaying for RecordingNowPlaying {
    fn update(&mut self, title: &str, is_playing: bool) {
        *self.last.lock() = Some((title.to_string(), is_playing));
    }

    fn clear(&mut self) {
        *self.last.lock() = None;
    }
}

/// Refuses the categories it is told to refuse.
pub struct PickySession {
    refuse: Vec<SessionCategory>,
    inner: NullSession,
}

impl PickySession {
    pub fn refusing(refuse: &[SessionCategory]) -> Self {
        Self {
            refuse: refuse.to_vec(),
            inner: NullSession::new(),
        }
    }
}

impl AudioSession for PickySession {
    fn activate(&mut self, category: SessionCategory) -> nocturne_core::Result<()> {
        if self.refuse.contains(&category) {
            return Err(CoreError::SessionUnavailable {
                category,
                reason: "refused by test".into(),
            });
        }
        self.inner.activate(category)
    }

    fn deactivate(&mut self) {
        self.inner.deactivate();
    }

    fn is_active(&self) -> bool {
        self.inner.is_active()
    }
}

pub struct Harness {
    pub controller: SessionController,
    pub device: OfflineHandle,
    pub clock: ManualClock,
    pub route: StaticRouteMonitor,
    pub now_playing: RecordingNowPlaying,
    pub settings: MemorySettingsStore,
}

impl Harness {
    pub fn new(route: OutputRoute) -> Self {
        Self::build(route, Box::new(NullSession::new()), Settings::default())
    }

    pub fn with_session(route: OutputRoute, session: Box<dyn AudioSession>) -> Self {
        Self::build(route, session, Settings::default())
    }

    pub fn with_settings(route: OutputRoute, settings: Settings) -> Self {
        Self::build(route, Box::new(NullSession::new()), settings)
    }

    fn build(route: OutputRoute, session: Box<dyn AudioSession>, settings: Settings) -> Self {
        init_tracing();
        let device = OfflineDevice::new(EngineConfig::default()).expect("offline device");
        let handle = device.handle();
        let clock = ManualClock::new();
        let monitor = StaticRouteMonitor::new(route);
        let now_playing = RecordingNowPlaying::default();
        let store = MemorySettingsStore::new(settings);

        let controller = SessionController::builder()
            .audio_session(session)
            .route_monitor(Arc::new(monitor.clone()))
            .now_playing(Box::new(now_playing.clone()))
            .settings_store(Box::new(store.clone()))
            .clock(Arc::new(clock.clone()))
            .build(Box::new(device))
            .expect("controller");

        Self {
            controller,
            device: handle,
            clock,
            route: monitor,
            now_playing,
            settings: store,
        }
    }

    /// One control tick.
    pub fn tick(&mut self) {
        self.clock.advance(self.controller.config().control_tick);
        self.controller.poll();
    }

    /// Tick until at least `secs` have passed.
    pub fn advance(&mut self, secs: f64) {
        let tick = self.controller.config().control_tick.as_secs_f64();
        let ticks = (secs / tick - 1e-9).ceil() as usize;
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Control blocks of the current sources.
    pub fn source_controls(&self) -> Vec<Arc<SourceControl>> {
        self.controller
            .sources()
            .iter()
            .filter_map(|s| s.control().cloned())
            .collect()
    }

    pub fn master(&self) -> f32 {
        self.device.master_history().last().copied().unwrap_or(1.0)
    }
}

pub fn any_started(controls: &[Arc<SourceControl>]) -> bool {
    controls.iter().any(|c| c.state() == SourceState::Started)
}

pub fn all_in(controls: &[Arc<SourceControl>], state: SourceState) -> bool {
    controls.iter().all(|c| c.state() == state)
}
