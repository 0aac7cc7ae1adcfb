//! The `OutputDevice` abstraction and the bookkeeping shared by every device.

use crate::render::{RenderCommand, RenderGraph, RenderLink};
use crate::source::{Source, SourceControl, SourceId, SourceState};
use crate::{EngineConfig, Result};
use std::sync::Arc;
use tracing::{debug, trace};

/// A place sources can be registered and played.
///
/// Semantics common to all devices:
/// - `start` marks the device running and starts every attached source
///   while sources are enabled.
/// - `stop` and `disable_sources` suspend started sources.
/// - `enable_sources` restarts suspended and registered sources if running.
/// - `clear_sources` detaches everything. Detached sources never come back.
pub trait OutputDevice: Send {
    fn sample_rate(&self) -> f64;

    /// Attach `source`, moving its signal to the render thread.
    fn register(&mut self, source: &mut Source) -> Result<SourceId>;

    fn start(&mut self) -> Result<()>;
    fn stop(&mut self);
    fn is_running(&self) -> bool;

    fn set_master_volume(&mut self, volume: f32);
    fn master_volume(&self) -> f32;

    fn clear_sources(&mut self);
    fn disable_sources(&mut self);
    fn enable_sources(&mut self);

    /// Number of sources attached and not detached.
    fn source_count(&self) -> usize;
}

/// Source registry and running state, reused by concrete devices.
pub(crate) struct DeviceCore {
    link: RenderLink,
    controls: Vec<Arc<SourceControl>>,
    running: bool,
    sources_enabled: bool,
    next_id: u64,
    master_volume: f32,
    sample_rate: f64,
}

impl DeviceCore {
    pub(crate) fn new(config: &EngineConfig) -> (Self, RenderGraph) {
        let (graph, link) = RenderGraph::new(config);
        let core = Self {
            link,
            controls: Vec::new(),
            running: false,
            sources_enabled: true,
            next_id: 1,
            master_volume: 1.0,
            sample_rate: config.sample_rate,
        };
        (core, graph)
    }

    pub(crate) fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Free voices the render thread has retired.
    fn collect_garbage(&self) {
        let freed = self.link.graveyard.try_iter().count();
        if freed > 0 {
            trace!(freed, "Dropped retired voices");
        }
    }

    fn set_all(&self, from: &[SourceState], to: SourceState) {
        for control in &self.controls {
            if from.contains(&control.state()) {
                control.set_state(to);
            }
        }
    }

    pub(crate) fn register(&mut self, source: &mut Source) -> Result<SourceId> {
        self.collect_garbage();

        let id = SourceId(self.next_id);
        let voice = source.attach(id)?;
        self.next_id += 1;

        let control = Arc::clone(voice_control(source)?);
        if self.running && self.sources_enabled {
            control.set_state(SourceState::Started);
        }
        self.controls.push(control);

        // The graph outlives every device handle, so a send only fails
        // during teardown.
        let _ = self.link.commands.send(RenderCommand::Add(voice));
        debug!(%id, label = source.label(), "Registered source");
        Ok(id)
    }

    pub(crate) fn start(&mut self) {
        self.running = true;
        if self.sources_enabled {
            self.set_all(
                &[SourceState::Registered, SourceState::Suspended],
                SourceState::Started,
            );
        }
    }

    pub(crate) fn stop(&mut self) {
        self.running = false;
        self.set_all(&[SourceState::Started], SourceState::Suspended);
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
        self.link.master_target.set(self.master_volume);
    }

    pub(crate) fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub(crate) fn clear_sources(&mut self) {
        self.set_all(
            &[
                SourceState::Registered,
                SourceState::Started,
                SourceState::Suspended,
            ],
            SourceState::Detached,
        );
        self.controls.clear();
        let _ = self.link.commands.send(RenderCommand::Clear);
        self.collect_garbage();
        debug!("Cleared sources");
    }

    pub(crate) fn disable_sources(&mut self) {
        self.sources_enabled = false;
        self.set_all(&[SourceState::Started], SourceState::Suspended);
    }

    pub(crate) fn enable_sources(&mut self) {
        self.sources_enabled = true;
        if self.running {
            self.set_all(
                &[SourceState::Registered, SourceState::Suspended],
                SourceState::Started,
            );
        }
    }

    pub(crate) fn source_count(&self) -> usize {
        self.controls
            .iter()
            .filter(|c| c.state() != SourceState::Detached)
            .count()
    }
}

fn voice_control(source: &Source) -> Result<&Arc<SourceControl>> {
    source
        .control()
        .ok_or_else(|| crate::Error::InvalidDevice("source has no control block".into()))
}
