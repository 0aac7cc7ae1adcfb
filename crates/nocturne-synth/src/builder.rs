//! Turns preset identifiers into ready-to-register sources.

use crate::preset::PresetId;
use crate::recipe::Recipe;
use crate::{Error, Result};
use nocturne_core::{OutputRoute, Source};
use tracing::debug;

/// Builds sources for a preset at a fixed sample rate.
///
/// Holds nothing between calls: every [`build`](Self::build) returns new,
/// independent sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetBuilder {
    sample_rate: f64,
}

impl PresetBuilder {
    pub fn new(sample_rate: f64) -> Result<Self> {
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }
        Ok(Self { sample_rate })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn build(&self, id: PresetId, route: OutputRoute) -> Result<Vec<Source>> {
        let recipe = Recipe::for_preset(id, route);
        let sources = recipe.instantiate(self.sample_rate)?;
        debug!(
            preset = %id,
            route = route.name(),
            sources = sources.len(),
            "built preset"
        );
        Ok(sources)
    }
}
