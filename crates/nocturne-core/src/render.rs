//! Render graph: the audio-thread side of an output device.
//!
//! The control side talks to the graph through a lock-free command queue.
//! Voices removed from the graph are sent back over a second channel so
//! their signal trees are freed off the audio thread.

use crate::lockfree::AtomicFloat;
use crate::smooth::SmoothedValue;
use crate::source::{SourceState, SourceVoice};
use crate::EngineConfig;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::Arc;

/// Initial voice capacity. A preset instantiates at most a handful.
const VOICE_CAPACITY: usize = 16;
const GRAVEYARD_CAPACITY: usize = 64;

pub(crate) enum RenderCommand {
    Add(SourceVoice),
    Clear,
}

/// Mono mix of every started voice followed by a smoothed master gain.
pub struct RenderGraph {
    commands: Receiver<RenderCommand>,
    graveyard: Sender<SourceVoice>,
    voices: Vec<SourceVoice>,
    master: SmoothedValue,
    master_target: Arc<AtomicFloat>,
    sample_rate: f64,
}

/// Control-side endpoints for a [`RenderGraph`].
pub(crate) struct RenderLink {
    pub(crate) commands: Sender<RenderCommand>,
    pub(crate) graveyard: Receiver<SourceVoice>,
    pub(crate) master_target: Arc<AtomicFloat>,
}

impl RenderGraph {
    pub(crate) fn new(config: &EngineConfig) -> (Self, RenderLink) {
        let (command_tx, command_rx) = unbounded();
        let (grave_tx, grave_rx) = bounded(GRAVEYARD_CAPACITY);
        let master_target = Arc::new(AtomicFloat::new(1.0));

        let graph = Self {
            commands: command_rx,
            graveyard: grave_tx,
            voices: Vec::with_capacity(VOICE_CAPACITY),
            master: SmoothedValue::new(
                1.0,
                config.master_smoothing_secs,
                config.sample_rate as f32,
            ),
            master_target: Arc::clone(&master_target),
            sample_rate: config.sample_rate,
        };
        let link = RenderLink {
            commands: command_tx,
            graveyard: grave_rx,
            master_target,
        };
        (graph, link)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Master gain currently applied, after smoothing.
    pub fn master_gain(&self) -> f32 {
        self.master.current()
    }

    fn retire(&self, voice: SourceVoice) {
        // A full graveyard drops inline rather than blocking the callback.
        let _ = self.graveyard.try_send(voice);
    }

    /// Drain pending commands (call from the audio thread).
    fn process_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                RenderCommand::Add(voice) => self.voices.push(voice),
                RenderCommand::Clear => {
                    while let Some(voice) = self.voices.pop() {
                        self.retire(voice);
                    }
                }
            }
        }

        let mut i = 0;
        while i < self.voices.len() {
            if self.voices[i].state() == SourceState::Detached {
                let voice = self.voices.swap_remove(i);
                self.retire(voice);
            } else {
                i += 1;
            }
        }
    }

    /// Fill `output` with mono samples.
    #[inline]
    pub fn process(&mut self, output: &mut [f32]) {
        self.process_commands();

        output.fill(0.0);
        for voice in self.voices.iter_mut() {
            voice.render_into(output, self.sample_rate);
        }

        self.master.set_target(self.master_target.get());
        self.master.apply_gain(output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::FnSignal;
    use crate::source::{Source, SourceId};

    fn started_source(value: f32, id: u64) -> (Source, SourceVoice) {
        let mut source = Source::processed("test", Box::new(FnSignal(move |_t: f64| value)));
        let voice = source.attach(SourceId(id)).unwrap();
        source.control().unwrap().set_state(SourceState::Started);
        source.apply_fade_in(0.0);
        (source, voice)
    }

    #[test]
    fn test_mixes_started_voices() {
        let (mut graph, link) = RenderGraph::new(&EngineConfig::default());
        let (_a, va) = started_source(0.25, 1);
        let (_b, vb) = started_source(0.5, 2);
        link.commands.send(RenderCommand::Add(va)).unwrap();
        link.commands.send(RenderCommand::Add(vb)).unwrap();

        let mut out = [0.0f32; 16];
        graph.process(&mut out);
        assert_eq!(graph.voice_count(), 2);
        assert!(out.iter().all(|s| (*s - 0.75).abs() < 1e-6));
    }

    #[test]
    fn test_clear_retires_voices_off_thread() {
        let (mut graph, link) = RenderGraph::new(&EngineConfig::default());
        let (_a, va) = started_source(0.25, 1);
        link.commands.send(RenderCommand::Add(va)).unwrap();
        link.commands.send(RenderCommand::Clear).unwrap();

        let mut out = [0.0f32; 4];
        graph.process(&mut out);
        assert_eq!(graph.voice_count(), 0);
        assert_eq!(link.graveyard.try_iter().count(), 1);
    }

    #[test]
    fn test_detached_voices_are_removed() {
        let (mut graph, link) = RenderGraph::new(&EngineConfig::default());
        let (a, va) = started_source(0.25, 1);
        link.commands.send(RenderCommand::Add(va)).unwrap();
        a.control().unwrap().set_state(SourceState::Detached);

        let mut out = [1.0f32; 4];
        graph.process(&mut out);
        assert_eq!(graph.voice_count(), 0);
        assert_eq!(out, [0.0; 4]);
    }

    #[test]
    fn test_master_gain_is_smoothed() {
        let (mut graph, link) = RenderGraph::new(&EngineConfig::default());
        let (_a, va) = started_source(1.0, 1);
        link.commands.send(RenderCommand::Add(va)).unwrap();
        link.master_target.set(0.0);

        let mut out = vec![0.0f32; 960];
        graph.process(&mut out);
        assert!(out[0] > 0.9);
        assert_eq!(*out.last().unwrap(), 0.0);
    }
}
