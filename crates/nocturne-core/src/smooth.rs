//! Per-sample gain ramps for click-free fades.
//!
//! # Example
//!
//! ```
//! use nocturne_core::SmoothedValue;
//!
//! let mut gain = SmoothedValue::new(0.0, 0.010, 48000.0);
//! gain.ramp_to(1.0, 0.5, 48000.0);
//!
//! let mut buffer = [0.5f32; 256];
//! gain.apply_gain(&mut buffer);
//! assert!(buffer[255] > buffer[0]);
//! ```

/// Linearly ramped value. Call [`next_sample()`](SmoothedValue::next_sample)
/// once per sample on the render thread.
#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    samples_remaining: u32,
    smooth_samples: u32,
}

impl SmoothedValue {
    pub fn new(initial: f32, smooth_time_secs: f32, sample_rate: f32) -> Self {
        let smooth_samples = (smooth_time_secs * sample_rate).max(1.0) as u32;

        Self {
            current: initial,
            target: initial,
            step: 0.0,
            samples_remaining: 0,
            smooth_samples,
        }
    }

    /// Ramp toward `target` over the default smoothing time.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        if (target - self.target).abs() < f32::EPSILON {
            return;
        }
        let samples = self.smooth_samples;
        self.start_ramp(target, samples);
    }

    /// Ramp toward `target` over an explicit duration. A zero duration jumps.
    pub fn ramp_to(&mut self, target: f32, secs: f64, sample_rate: f64) {
        let samples = (secs * sample_rate).round().max(0.0) as u32;
        if samples == 0 {
            self.set_immediate(target);
        } else {
            self.start_ramp(target, samples);
        }
    }

    #[inline]
    fn start_ramp(&mut self, target: f32, samples: u32) {
        self.target = target;
        self.samples_remaining = samples.max(1);
        self.step = (self.target - self.current) / self.samples_remaining as f32;
    }

    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.samples_remaining = 0;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.step;
            self.samples_remaining -= 1;

            // Snap to avoid drift
            if self.samples_remaining == 0 {
                self.current = self.target;
            }
        }

        self.current
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.samples_remaining > 0
    }

    #[inline]
    pub fn apply_gain(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample *= self.next_sample();
        }
    }
}

impl Default for SmoothedValue {
    fn default() -> Self {
        Self::new(0.0, 0.005, 48000.0)
    }
}
