//! Lock-free primitives shared between the control context and the render thread.

use atomic_float::AtomicF32;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Cache-line aligned atomic f32.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicFloat {
    value: AtomicF32,
}

impl AtomicFloat {
    pub fn new(value: f32) -> Self {
        Self {
            value: AtomicF32::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.value.store(value, Ordering::Release);
    }
}

impl Default for AtomicFloat {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Monotonic sequence counter. Writers bump it, the render thread compares
/// against the last value it acted on.
#[derive(Debug, Default)]
pub struct Sequence {
    value: AtomicU64,
}

impl Sequence {
    #[inline]
    pub fn bump(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}

/// Atomic holder for a `#[repr(u8)]` enum.
#[derive(Debug)]
pub(crate) struct AtomicByte {
    value: AtomicU8,
}

impl AtomicByte {
    pub(crate) fn new(value: u8) -> Self {
        Self {
            value: AtomicU8::new(value),
        }
    }

    #[inline]
    pub(crate) fn get(&self) -> u8 {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn set(&self, value: u8) {
        self.value.store(value, Ordering::Release);
    }
}
