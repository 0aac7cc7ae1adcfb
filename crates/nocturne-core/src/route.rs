//! Physical output route reported by the platform.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputRoute {
    Speaker,
    Headphones,
    Bluetooth,
    #[default]
    Unknown,
}

impl OutputRoute {
    pub fn all() -> &'static [OutputRoute] {
        &[
            OutputRoute::Speaker,
            OutputRoute::Headphones,
            OutputRoute::Bluetooth,
            OutputRoute::Unknown,
        ]
    }

    /// Headphones and bluetooth only reach the listener. Playback paused for
    /// route safety may only come back on one of these.
    pub fn is_private(self) -> bool {
        matches!(self, OutputRoute::Headphones | OutputRoute::Bluetooth)
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputRoute::Speaker => "Speaker",
            OutputRoute::Headphones => "Headphones",
            OutputRoute::Bluetooth => "Bluetooth",
            OutputRoute::Unknown => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_routes() {
        assert!(OutputRoute::Headphones.is_private());
        assert!(OutputRoute::Bluetooth.is_private());
        assert!(!OutputRoute::Speaker.is_private());
        assert!(!OutputRoute::Unknown.is_private());
    }

    #[test]
    fn test_all_routes_named() {
        for route in OutputRoute::all() {
            assert!(!route.name().is_empty());
        }
    }
}
