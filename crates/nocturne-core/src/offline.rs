//! Headless output device. Renders on demand and records what the control
//! side did to it, for tests and offline bouncing.

use crate::device::{DeviceCore, OutputDevice};
use crate::render::RenderGraph;
use crate::source::{Source, SourceId};
use crate::{EngineConfig, Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Master-volume writes kept per device; older entries are dropped.
pub const MASTER_HISTORY_CAP: usize = 4096;

#[derive(Debug, Default)]
struct DeviceLog {
    master_history: VecDeque<f32>,
    starts: usize,
    stops: usize,
    registrations: usize,
    clears: usize,
    running: bool,
    sources: usize,
    fail_start: bool,
}

/// Output device without hardware.
pub struct OfflineDevice {
    core: DeviceCore,
    graph: Arc<Mutex<RenderGraph>>,
    log: Arc<Mutex<DeviceLog>>,
}

/// Cloneable view of an [`OfflineDevice`] that stays usable after the
/// device has been boxed and handed to a controller.
#[derive(Clone)]
pub struct OfflineHandle {
    graph: Arc<Mutex<RenderGraph>>,
    log: Arc<Mutex<DeviceLog>>,
}

impl OfflineDevice {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let (core, graph) = DeviceCore::new(&config);
        Ok(Self {
            core,
            graph: Arc::new(Mutex::new(graph)),
            log: Arc::new(Mutex::new(DeviceLog::default())),
        })
    }

    pub fn handle(&self) -> OfflineHandle {
        OfflineHandle {
            graph: Arc::clone(&self.graph),
            log: Arc::clone(&self.log),
        }
    }

    fn sync_log(&self) {
        let mut log = self.log.lock();
        log.running = self.core.is_running();
        log.sources = self.core.source_count();
    }
}

impl OutputDevice for OfflineDevice {
    fn sample_rate(&self) -> f64 {
        self.core.sample_rate()
    }

    fn register(&mut self, source: &mut Source) -> Result<SourceId> {
        let id = self.core.register(source)?;
        self.log.lock().registrations += 1;
        self.sync_log();
        Ok(id)
    }

    fn start(&mut self) -> Result<()> {
        if self.log.lock().fail_start {
            return Err(Error::InvalidDevice("offline device refused to start".into()));
        }
        self.core.start();
        self.log.lock().starts += 1;
        self.sync_log();
        Ok(())
    }

    fn stop(&mut self) {
        self.core.stop();
        self.log.lock().stops += 1;
        self.sync_log();
    }

    fn is_running(&self) -> bool {
        self.core.is_running()
    }

    fn set_master_volume(&mut self, volume: f32) {
        self.core.set_master_volume(volume);
        let mut log = self.log.lock();
        if log.master_history.len() == MASTER_HISTORY_CAP {
            log.master_history.pop_front();
        }
        log.master_history.push_back(self.core.master_volume());
    }

    fn master_volume(&self) -> f32 {
        self.core.master_volume()
    }

    fn clear_sources(&mut self) {
        self.core.clear_sources();
        self.log.lock().clears += 1;
        self.sync_log();
    }

    fn disable_sources(&mut self) {
        self.core.disable_sources();
    }

    fn enable_sources(&mut self) {
        self.core.enable_sources();
    }

    fn source_count(&self) -> usize {
        self.core.source_count()
    }
}

impl OfflineHandle {
    /// Render `frames` mono samples.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; frames];
        self.graph.lock().process(&mut out);
        out
    }

    pub fn sample_rate(&self) -> f64 {
        self.graph.lock().sample_rate()
    }

    /// The last [`MASTER_HISTORY_CAP`] values passed to
    /// `set_master_volume`, oldest first, after clamping.
    pub fn master_history(&self) -> Vec<f32> {
        self.log.lock().master_history.iter().copied().collect()
    }

    pub fn starts(&self) -> usize {
        self.log.lock().starts
    }

    pub fn stops(&self) -> usize {
        self.log.lock().stops
    }

    pub fn registrations(&self) -> usize {
        self.log.lock().registrations
    }

    pub fn clears(&self) -> usize {
        self.log.lock().clears
    }

    pub fn is_running(&self) -> bool {
        self.log.lock().running
    }

    /// Attached, non-detached sources as of the last lifecycle call.
    pub fn source_count(&self) -> usize {
        self.log.lock().sources
    }

    /// Make subsequent `start` calls fail.
    pub fn fail_start(&self, fail: bool) {
        self.log.lock().fail_start = fail;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::FnSignal;
    use crate::source::SourceState;

    fn device() -> OfflineDevice {
        OfflineDevice::new(EngineConfig::default()).unwrap()
    }

    fn constant(value: f32) -> Source {
        Source::processed("const", Box::new(FnSignal(move |_t: f64| value)))
    }

    #[test]
    fn test_register_then_start_plays() {
        let mut dev = device();
        let handle = dev.handle();
        let mut source = constant(0.5);
        dev.register(&mut source).unwrap();
        assert_eq!(source.state(), Some(SourceState::Registered));

        dev.start().unwrap();
        source.apply_fade_in(0.0);
        assert_eq!(source.state(), Some(SourceState::Started));

        let out = handle.render(32);
        assert!(out.iter().all(|s| (*s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_stop_suspends_and_start_resumes() {
        let mut dev = device();
        let mut source = constant(0.5);
        dev.register(&mut source).unwrap();
        dev.start().unwrap();

        dev.stop();
        assert_eq!(source.state(), Some(SourceState::Suspended));
        assert!(!dev.is_running());

        dev.start().unwrap();
        assert_eq!(source.state(), Some(SourceState::Started));
    }

    #[test]
    fn test_disabled_sources_stay_suspended_on_start() {
        let mut dev = device();
        let mut source = constant(0.5);
        dev.register(&mut source).unwrap();
        dev.disable_sources();
        dev.start().unwrap();
        assert_eq!(source.state(), Some(SourceState::Registered));

        dev.enable_sources();
        assert_eq!(source.state(), Some(SourceState::Started));
    }

    #[test]
    fn test_clear_detaches_for_good() {
        let mut dev = device();
        let handle = dev.handle();
        let mut source = constant(0.5);
        dev.register(&mut source).unwrap();
        dev.start().unwrap();

        dev.clear_sources();
        assert_eq!(source.state(), Some(SourceState::Detached));
        assert_eq!(dev.source_count(), 0);

        dev.enable_sources();
        assert_eq!(source.state(), Some(SourceState::Detached));
        assert!(handle.render(8).iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_master_volume_is_clamped_and_logged() {
        let mut dev = device();
        let handle = dev.handle();
        dev.set_master_volume(1.5);
        dev.set_master_volume(0.3);
        assert_eq!(handle.master_history(), vec![1.0, 0.3]);
        assert_eq!(dev.master_volume(), 0.3);
    }

    #[test]
    fn test_master_history_is_bounded() {
        let mut dev = device();
        let handle = dev.handle();
        for i in 0..MASTER_HISTORY_CAP + 10 {
            dev.set_master_volume(if i % 2 == 0 { 0.25 } else { 0.5 });
        }
        let history = handle.master_history();
        assert_eq!(history.len(), MASTER_HISTORY_CAP);
        // The ten oldest writes are gone, so the log now opens on an even index.
        assert_eq!(history[0], 0.25);
        assert_eq!(history.last().copied(), Some(0.5));
    }

    #[test]
    fn test_fail_start() {
        let mut dev = device();
        dev.handle().fail_start(true);
        assert!(dev.start().is_err());
        assert!(!dev.is_running());
    }
}
