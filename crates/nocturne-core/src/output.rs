//! CPAL hardware output.

use crate::device::{DeviceCore, OutputDevice};
use crate::render::RenderGraph;
use crate::source::{Source, SourceId};
use crate::{EngineConfig, Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// Largest callback buffer rendered without a second pass.
const MAX_BLOCK: usize = 4096;

/// Wrapper to hold `cpal::Stream` in a `Send` context.
///
/// # Safety
/// `cpal::Stream` is `!Send` due to platform internals. The stream is only
/// touched through `&mut CpalDevice`, which the session controller owns.
struct StreamHandle(#[allow(dead_code)] cpal::Stream);

unsafe impl Send for StreamHandle {}

/// Output device backed by the system's default (or indexed) output.
pub struct CpalDevice {
    core: DeviceCore,
    graph: Arc<Mutex<RenderGraph>>,
    device_index: Option<usize>,
    stream: Option<StreamHandle>,
}

impl CpalDevice {
    /// Open the device. The engine sample rate follows the hardware default.
    pub fn new(device_index: Option<usize>, mut config: EngineConfig) -> Result<Self> {
        let device = get_device(device_index)?;
        let output = device.default_output_config()?;
        config.sample_rate = output.sample_rate().0 as f64;
        config.validate()?;

        let (core, graph) = DeviceCore::new(&config);
        Ok(Self {
            core,
            graph: Arc::new(Mutex::new(graph)),
            device_index,
            stream: None,
        })
    }

    pub fn device_name(&self) -> Result<String> {
        Ok(get_device(self.device_index)?.name()?)
    }

    pub fn list_devices() -> Result<Vec<String>> {
        cpal::default_host()
            .output_devices()?
            .enumerate()
            .map(|(i, d)| Ok(format!("{i}: {}", d.name()?)))
            .collect()
    }

    fn open_stream(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let device = get_device(self.device_index)?;
        let config = device.default_output_config()?;
        let graph = Arc::clone(&self.graph);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config.into(), graph)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config.into(), graph)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config.into(), graph)?,
            format => {
                return Err(Error::InvalidConfig(format!(
                    "Unsupported sample format: {format:?}"
                )));
            }
        };

        stream.play()?;
        self.stream = Some(StreamHandle(stream));
        info!(device = ?self.device_index, "Output stream started");
        Ok(())
    }
}

impl OutputDevice for CpalDevice {
    fn sample_rate(&self) -> f64 {
        self.core.sample_rate()
    }

    fn register(&mut self, source: &mut Source) -> Result<SourceId> {
        self.core.register(source)
    }

    fn start(&mut self) -> Result<()> {
        self.open_stream()?;
        self.core.start();
        Ok(())
    }

    fn stop(&mut self) {
        self.core.stop();
        if self.stream.take().is_some() {
            info!("Output stream stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.core.is_running()
    }

    fn set_master_volume(&mut self, volume: f32) {
        self.core.set_master_volume(volume);
    }

    fn master_volume(&self) -> f32 {
        self.core.master_volume()
    }

    fn clear_sources(&mut self) {
        self.core.clear_sources();
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

fn get_device(index: Option<usize>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match index {
        Some(i) => {
            let devices: Vec<_> = host.output_devices()?.collect();
            let count = devices.len();
            devices.into_iter().nth(i).ok_or_else(|| {
                Error::InvalidDevice(format!("Device index {i} out of range ({count} available)"))
            })
        }
        None => host
            .default_output_device()
            .ok_or_else(|| Error::InvalidDevice("No output device available".into())),
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    graph: Arc<Mutex<RenderGraph>>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut mono = vec![0.0f32; MAX_BLOCK];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                // Contention only happens while the control side swaps the
                // graph; a block of silence is acceptable there.
                let Some(mut graph) = graph.try_lock() else {
                    for sample in data.iter_mut() {
                        *sample = T::from_sample(0.0);
                    }
                    return;
                };

                for chunk in data.chunks_mut(MAX_BLOCK * channels) {
                    let frames = chunk.len() / channels;
                    let block = &mut mono[..frames];
                    graph.process(block);

                    for (frame, out) in chunk.chunks_mut(channels).enumerate() {
                        let value = T::from_sample(block[frame]);
                        for sample in out.iter_mut() {
                            *sample = value;
                        }
                    }
                }
            }));

            if result.is_err() {
                // Panic in callback - output silence
                for sample in data.iter_mut() {
                    *sample = T::from_sample(0.0);
                }
            }
        },
        |err| warn!(%err, "Output stream error"),
        None,
    )?;

    Ok(stream)
}
