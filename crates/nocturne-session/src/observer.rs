//! Published session state.
//!
//! The controller publishes a [`SessionSnapshot`] after every operation.
//! Readers on any thread load the latest one lock-free; listeners registered
//! with [`Notifier::subscribe`] are called when it changes and are removed
//! when their [`Subscription`] drops.

use crate::state::{PauseReason, SessionState};
use arc_swap::ArcSwap;
use nocturne_core::OutputRoute;
use nocturne_synth::PresetId;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub is_playing: bool,
    pub current_preset: Option<PresetId>,
    pub output_route: OutputRoute,
    pub pause_reason: Option<PauseReason>,
    pub system_volume: f32,
    pub generation: u64,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            is_playing: false,
            current_preset: None,
            output_route: OutputRoute::Unknown,
            pause_reason: None,
            system_volume: 1.0,
            generation: 0,
        }
    }
}

type Listener = Arc<dyn Fn(&SessionSnapshot) + Send + Sync>;

#[derive(Default)]
struct Registry {
    listeners: Vec<(u64, Listener)>,
    next_id: u64,
}

/// Cloneable publisher/reader of session snapshots.
#[derive(Clone)]
pub struct Notifier {
    current: Arc<ArcSwap<SessionSnapshot>>,
    registry: Arc<Mutex<Registry>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(SessionSnapshot::default())),
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.current.load_full()
    }

    /// Call `listener` with every changed snapshot until the returned
    /// subscription is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }

    /// Store `snapshot` and notify listeners if it differs from the last one.
    pub(crate) fn publish(&self, snapshot: SessionSnapshot) {
        if *self.current.load_full() == snapshot {
            return;
        }
        let snapshot = Arc::new(snapshot);
        self.current.store(Arc::clone(&snapshot));

        // Listeners may subscribe or unsubscribe from inside the callback.
        let listeners: Vec<Listener> = self
            .registry
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Disposes its listener on drop.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn playing(generation: u64) -> SessionSnapshot {
        SessionSnapshot {
            state: SessionState::Playing,
            is_playing: true,
            current_preset: Some(PresetId::Rain),
            generation,
            ..Default::default()
        }
    }

    #[test]
    fn test_listeners_see_changes_only() {
        let notifier = Notifier::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let _sub = notifier.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        notifier.publish(playing(1));
        notifier.publish(playing(1));
        notifier.publish(playing(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(notifier.snapshot().generation, 2);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let notifier = Notifier::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let sub = notifier.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(notifier.listener_count(), 1);

        drop(sub);
        assert_eq!(notifier.listener_count(), 0);
        notifier.publish(playing(1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_outlives_notifier() {
        let notifier = Notifier::new();
        let sub = notifier.subscribe(|_| {});
        drop(notifier);
        sub.unsubscribe();
    }
}
