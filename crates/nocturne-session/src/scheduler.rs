//! Deadline scheduling for control-context continuations.
//!
//! Nothing here sleeps. The owner asks for the next deadline, waits however
//! it likes (a channel timeout at runtime, a manual clock in tests), then
//! pops due entries. Every entry carries the generation that scheduled it so
//! the owner can drop work that belongs to an older playback attempt.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic time source for the control context.
pub trait Clock: Send + Sync {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn set(&self, to: Duration) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock()
    }
}

/// Cancellable reference to a scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    id: u64,
    generation: u64,
}

impl TaskHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
struct Entry<T> {
    handle: TaskHandle,
    deadline: Duration,
    task: T,
}

/// Pending continuations ordered by deadline, then by scheduling order.
#[derive(Debug)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub fn schedule(&mut self, deadline: Duration, generation: u64, task: T) -> TaskHandle {
        let handle = TaskHandle {
            id: self.next_id,
            generation,
        };
        self.next_id += 1;
        self.entries.push(Entry {
            handle,
            deadline,
            task,
        });
        handle
    }

    /// Returns whether the entry was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Drop everything. Returns how many entries were pending.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Remove and return the earliest entry due at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TaskHandle, T)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| (e.deadline, e.handle.id))
            .map(|(i, _)| i)?;
        let entry = self.entries.remove(index);
        Some((entry.handle, entry.task))
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_pops_in_deadline_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(40), 1, "b");
        scheduler.schedule(ms(20), 1, "a");
        scheduler.schedule(ms(40), 1, "c");

        assert_eq!(scheduler.next_deadline(), Some(ms(20)));
        assert!(scheduler.pop_due(ms(10)).is_none());
        assert_eq!(scheduler.pop_due(ms(50)).map(|(_, t)| t), Some("a"));
        // Equal deadlines keep scheduling order.
        assert_eq!(scheduler.pop_due(ms(50)).map(|(_, t)| t), Some("b"));
        assert_eq!(scheduler.pop_due(ms(50)).map(|(_, t)| t), Some("c"));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule(ms(10), 3, 1);
        let drop = scheduler.schedule(ms(5), 3, 2);

        assert!(scheduler.cancel(drop));
        assert!(!scheduler.cancel(drop));
        assert!(scheduler.is_pending(keep));

        let (handle, task) = scheduler.pop_due(ms(10)).unwrap();
        assert_eq!((handle, task), (keep, 1));
        assert_eq!(handle.generation(), 3);
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(1), 1, ());
        scheduler.schedule(ms(2), 2, ());
        assert_eq!(scheduler.cancel_all(), 2);
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.advance(ms(30));
        clock.advance(ms(20));
        assert_eq!(view.now(), ms(50));
        view.set(ms(5));
        assert_eq!(clock.now(), ms(5));
    }
}
