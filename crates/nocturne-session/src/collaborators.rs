//! Platform-side collaborators the controller talks to, with defaults for
//! hosts that have none.

use crate::runtime::ControlHandle;
use crate::{Result, Settings};
use nocturne_core::OutputRoute;
use parking_lot::Mutex;
use std::sync::Arc;

/// Reports the output route and pushes changes into the control context.
pub trait RouteMonitor: Send + Sync {
    fn current_route(&self) -> OutputRoute;

    /// Begin delivering `route_changed` and `unsafe_route` notifications.
    fn start(&self, handle: ControlHandle);
    fn stop(&self);
}

/// Lock-screen / now-playing presenter. Fire and forget.
pub trait NowPlaying: Send {
    fn update(&mut self, title: &str, is_playing: bool);
    fn clear(&mut self);
}

/// Persistence for [`Settings`].
pub trait SettingsStore: Send {
    fn load(&mut self) -> Result<Settings>;
    fn save(&mut self, settings: &Settings) -> Result<()>;
}

#[derive(Default)]
struct RouteState {
    route: OutputRoute,
    listener: Option<ControlHandle>,
}

/// Route monitor whose route is set by hand. Clones share state.
///
/// While started, [`set_route`](Self::set_route) forwards the change and, if
/// the new route is public, an unsafe-route notification.
#[derive(Clone, Default)]
pub struct StaticRouteMonitor {
    state: Arc<Mutex<RouteState>>,
}

impl StaticRouteMonitor {
    pub fn new(route: OutputRoute) -> Self {
        Self {
            state: Arc::new(Mutex::new(RouteState {
                route,
                listener: None,
            })),
        }
    }

    pub fn set_route(&self, route: OutputRoute) {
        let listener = {
            let mut state = self.state.lock();
            let previous = std::mem::replace(&mut state.route, route);
            if previous == route {
                return;
            }
            state.listener.clone()
        };

        if let Some(handle) = listener {
            handle.route_changed(route);
            if !route.is_private() {
                handle.unsafe_route();
            }
        }
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().listener.is_some()
    }
}

impl RouteMonitor for StaticRouteMonitor {
    fn current_route(&self) -> OutputRoute {
        self.state.lock().route
    }

    fn start(&self, handle: ControlHandle) {
        self.state.lock().listener = Some(handle);
    }

    fn stop(&self) {
        self.state.lock().listener = None;
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullNowPlaying;

impl NowPlaying for NullNowPlaying {
    fn update(&mut self, _title: &str, _is_playing: bool) {}
    fn clear(&mut self) {}
}

/// In-memory settings store. Clones share the stored value.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    settings: Settings,
    saves: usize,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryInner { settings, saves: 0 })),
        }
    }

    pub fn settings(&self) -> Settings {
        self.inner.lock().settings.clone()
    }

    pub fn saves(&self) -> usize {
        self.inner.lock().saves
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&mut self) -> Result<Settings> {
        Ok(self.settings())
    }

    fn save(&mut self, settings: &Settings) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.settings = settings.clone();
        inner.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_monitor_reports_route() {
        let monitor = StaticRouteMonitor::new(OutputRoute::Headphones);
        assert_eq!(monitor.current_route(), OutputRoute::Headphones);
        monitor.set_route(OutputRoute::Speaker);
        assert_eq!(monitor.current_route(), OutputRoute::Speaker);
        assert!(!monitor.is_started());
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemorySettingsStore::default();
        let view = store.clone();
        let settings = Settings {
            resume_after_break: false,
            ..Default::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(view.settings(), settings);
        assert_eq!(view.saves(), 1);
        assert_eq!(store.load().unwrap(), settings);
    }
}
