//! Master-volume fades stepped on the control clock.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    In,
    Out,
}

/// A linear ramp from `start` to `target`, advanced one control tick at a
/// time. Owned by the generation that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeOp {
    start: f32,
    target: f32,
    steps: u32,
    step: u32,
    direction: FadeDirection,
    generation: u64,
}

impl FadeOp {
    /// Steps are `ceil(duration / tick)`, at least one, so the ramp ends
    /// on the first tick at or after `duration`.
    pub fn new(start: f32, target: f32, duration: Duration, tick: Duration, generation: u64) -> Self {
        let tick_nanos = tick.as_nanos().max(1);
        let steps = duration.as_nanos().div_ceil(tick_nanos).clamp(1, u32::MAX as u128) as u32;
        let direction = if target < start {
            FadeDirection::Out
        } else {
            FadeDirection::In
        };
        Self {
            start,
            target,
            steps,
            step: 0,
            direction,
            generation,
        }
    }

    pub fn direction(&self) -> FadeDirection {
        self.direction
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn is_done(&self) -> bool {
        self.step >= self.steps
    }

    /// Value after `step` ticks.
    pub fn value(&self) -> f32 {
        if self.is_done() {
            return self.target;
        }
        let progress = self.step as f32 / self.steps as f32;
        self.start + (self.target - self.start) * progress
    }

    /// Move one tick forward and return the new value.
    pub fn advance(&mut self) -> f32 {
        self.step = (self.step + 1).min(self.steps);
        self.value()
    }

    /// Aim the remaining ticks at a new target, starting from where the fade
    /// is now.
    pub fn retarget(&mut self, target: f32) {
        let remaining = (self.steps - self.step).max(1);
        self.start = self.value();
        self.target = target;
        self.steps = remaining;
        self.step = 0;
    }

    /// Keep the rest of the ramp at or below `ceiling`. A fade currently
    /// above it restarts from the ceiling over the remaining ticks.
    pub fn limit(&mut self, ceiling: f32) {
        let value = self.value();
        if value <= ceiling && self.target <= ceiling {
            return;
        }
        let remaining = (self.steps - self.step).max(1);
        self.start = value.min(ceiling);
        self.target = self.target.min(ceiling);
        self.steps = remaining;
        self.step = 0;
    }
}
