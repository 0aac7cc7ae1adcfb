//! The session runtime on a real thread and wall clock.

use nocturne_core::{EngineConfig, OfflineDevice, OutputRoute};
use nocturne_session::{
    Error, PauseReason, RouteMonitor, SessionController, SessionRuntime, SessionSnapshot,
    SessionState, StaticRouteMonitor,
};
use nocturne_synth::PresetId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn runtime(route: OutputRoute) -> (SessionRuntime, StaticRouteMonitor) {
    let monitor = StaticRouteMonitor::new(route);
    let device = OfflineDevice::new(EngineConfig::default()).unwrap();
    let controller = SessionController::builder()
        .route_monitor(Arc::new(monitor.clone()))
        .build(Box::new(device))
        .unwrap();
    (SessionRuntime::spawn(controller).unwrap(), monitor)
}

/// Poll the published snapshot until `check` holds or two seconds pass.
fn wait_for(runtime: &SessionRuntime, check: impl Fn(&SessionSnapshot) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if check(&runtime.handle().snapshot()) {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn test_play_replies_with_result() {
    let (runtime, _monitor) = runtime(OutputRoute::Headphones);
    let control = runtime.handle();

    control.play(PresetId::Bubbles).unwrap();
    let snap = control.snapshot();
    assert!(snap.is_playing);
    assert_eq!(snap.current_preset, Some(PresetId::Bubbles));
    assert_eq!(snap.generation, 1);
}

#[test]
fn test_delayed_stop_runs_on_its_own() {
    let (runtime, _monitor) = runtime(OutputRoute::Headphones);
    let control = runtime.handle();

    control.play(PresetId::Rain).unwrap();
    control.stop_with_fade(0.1);
    assert!(wait_for(&runtime, |s| s.state == SessionState::Idle));
    assert_eq!(control.snapshot().current_preset, None);
}

#[test]
fn test_switch_to_plays_next_preset() {
    let (runtime, _monitor) = runtime(OutputRoute::Headphones);
    let control = runtime.handle();

    control.play(PresetId::MusicBox).unwrap();
    control.switch_to(PresetId::MidnightHum);
    assert!(wait_for(&runtime, |s| {
        s.is_playing && s.current_preset == Some(PresetId::MidnightHum)
    }));
}

#[test]
fn test_route_monitor_drives_route_safety() {
    let (runtime, monitor) = runtime(OutputRoute::Headphones);
    let control = runtime.handle();
    monitor.start(control.clone());

    control.play(PresetId::Rain).unwrap();
    monitor.set_route(OutputRoute::Speaker);
    assert!(wait_for(&runtime, |s| {
        s.pause_reason == Some(PauseReason::RouteSafety) && s.output_route == OutputRoute::Speaker
    }));
    assert!(matches!(control.resume(), Err(Error::UnsafeToResume)));

    monitor.set_route(OutputRoute::Headphones);
    control.resume().unwrap();
    assert!(control.snapshot().is_playing);
    monitor.stop();
}

#[test]
fn test_subscribers_hear_changes() {
    let (runtime, _monitor) = runtime(OutputRoute::Headphones);
    let control = runtime.handle();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let _sub = control.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    control.play(PresetId::PinkNoise).unwrap();
    control.pause(PauseReason::User);
    assert!(wait_for(&runtime, |s| s.pause_reason.is_some()));
    assert!(calls.load(Ordering::SeqCst) >= 2);
}

#[test]
fn test_shutdown_returns_idle_controller() {
    let (runtime, _monitor) = runtime(OutputRoute::Headphones);
    let control = runtime.handle();
    control.play(PresetId::OceanWaves).unwrap();

    let controller = runtime.shutdown().unwrap();
    assert_eq!(controller.state(), SessionState::Idle);
    assert!(controller.sources().is_empty());
    assert!(matches!(
        control.play(PresetId::Rain),
        Err(Error::RuntimeUnavailable)
    ));
}
