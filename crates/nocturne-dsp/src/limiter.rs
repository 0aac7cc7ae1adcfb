//! Saturating output stages.

use crate::{Error, Result};

/// `ceiling · tanh(drive · x / ceiling)`.
///
/// Monotonic, and for every finite input the output stays strictly inside
/// `(-ceiling, ceiling)`: values that saturate to the ceiling in `f32` are
/// held one ULP below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftLimiter {
    drive: f32,
    ceiling: f32,
    max_out: f32,
}

impl SoftLimiter {
    pub fn new(drive: f32, ceiling: f32) -> Result<Self> {
        if !(drive > 0.0 && drive.is_finite()) {
            return Err(Error::InvalidParameter(format!("drive {drive} must be > 0")));
        }
        if !(ceiling > 0.0 && ceiling.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "ceiling {ceiling} must be > 0"
            )));
        }
        Ok(Self {
            drive,
            ceiling,
            max_out: f32::from_bits(ceiling.to_bits() - 1),
        })
    }

    pub fn drive(&self) -> f32 {
        self.drive
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    #[inline]
    pub fn process(&self, x: f32) -> f32 {
        let y = self.ceiling * (self.drive * x / self.ceiling).tanh();
        y.clamp(-self.max_out, self.max_out)
    }
}

impl Default for SoftLimiter {
    fn default() -> Self {
        Self {
            drive: 1.0,
            ceiling: 0.95,
            max_out: f32::from_bits(0.95f32.to_bits() - 1),
        }
    }
}

/// Linear below `threshold`, tanh knee above it, approaching ±1.
#[inline]
pub fn soft_clip(x: f32, threshold: f32) -> f32 {
    let magnitude = x.abs();
    if magnitude <= threshold {
        return x;
    }
    let headroom = 1.0 - threshold;
    let shaped = threshold + headroom * ((magnitude - threshold) / headroom).tanh();
    shaped.copysign(x)
}

/// `ceiling · tanh(x · drive / ceiling)` without the ULP guard; the final
/// polish stage presets apply after their reverb.
#[inline]
pub fn tanh_saturate(x: f32, drive: f32, ceiling: f32) -> f32 {
    ceiling * (x * drive / ceiling).tanh()
}
