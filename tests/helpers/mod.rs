//! Test helpers and fixtures for Nocturne integration tests
//!
//! Engines here render to an [`OfflineDevice`] so no audio hardware is
//! touched. The device's [`OfflineHandle`] pulls samples on demand.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact gain products
//! - `SILENCE_THRESHOLD` (0.0001): Silence detection (-80dB)

#![allow(dead_code)]

pub mod tolerances;

use nocturne::prelude::*;
use nocturne::{OfflineDevice, OfflineHandle, SessionCategory};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default test sample rate (matches common hardware)
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Offline device plus the handle that renders and inspects it.
pub fn offline_device() -> (Box<dyn OutputDevice>, OfflineHandle) {
    let device = OfflineDevice::new(nocturne::EngineConfig {
        sample_rate: TEST_SAMPLE_RATE,
        ..Default::default()
    })
    .expect("Failed to create offline device");
    let handle = device.handle();
    (Box::new(device), handle)
}

/// Engine on headphones with an offline device.
pub fn test_engine() -> (NocturneEngine, OfflineHandle, StaticRouteMonitor) {
    init_tracing();
    let (device, handle) = offline_device();
    let monitor = StaticRouteMonitor::new(OutputRoute::Headphones);
    let engine = NocturneEngine::builder()
        .device(device)
        .route_monitor(monitor.clone())
        .build()
        .expect("Failed to create test engine");
    (engine, handle, monitor)
}

/// Poll `check` until it holds or two seconds pass.
pub fn wait_for(check: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

/// Audio session whose activity is visible after it moves into the engine.
#[derive(Clone, Default)]
pub struct SharedSession {
    active: Arc<AtomicBool>,
    activated_once: Arc<AtomicBool>,
}

impl SharedSession {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn was_activated(&self) -> bool {
        self.activated_once.load(Ordering::SeqCst)
    }
}

impl AudioSession for SharedSession {
    fn activate(&mut self, _category: SessionCategory) -> nocturne::core::Result<()> {
        self.active.store(true, Ordering::SeqCst);
        self.activated_once.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn deactivate(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
