//! Engine configuration.

use crate::{Error, Result};

/// Configuration for output devices and the render graph.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub sample_rate: f64,
    /// Ramp time applied to master volume changes on the render thread.
    pub master_smoothing_secs: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000.0,
            master_smoothing_secs: 0.010,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate < 8000.0 || self.sample_rate > 384000.0 {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.master_smoothing_secs) {
            return Err(Error::InvalidConfig(format!(
                "master_smoothing_secs {} out of range (0-1 s)",
                self.master_smoothing_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.sample_rate, 48000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_sample_rate() {
        let config = EngineConfig {
            sample_rate: 100.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
