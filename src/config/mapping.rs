//! Threshold, counting, and loop-closure sections.

use serde::{Deserialize, Serialize};

use crate::grid::{CountingMode, ThresholdConfig};
use crate::mapper::LoopClosureStrategy;

use super::defaults;

/// Probability thresholds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSection {
    /// At or below: free
    #[serde(default = "defaults::free_threshold")]
    pub free: f32,

    /// At or above: occupied
    #[serde(default = "defaults::occupied_threshold")]
    pub occupied: f32,

    /// Cells with at most this many visits stay unknown
    #[serde(default)]
    pub visit_threshold: u32,

    /// Value reported for unknown cells
    #[serde(default = "defaults::unknown_value")]
    pub unknown_value: f32,
}

impl Default for ThresholdSection {
    fn default() -> Self {
        let resolved = ThresholdConfig::default();
        Self {
            free: resolved.free_threshold,
            occupied: resolved.occupied_threshold,
            visit_threshold: resolved.visit_threshold,
            unknown_value: resolved.unknown_value,
        }
    }
}

impl ThresholdSection {
    /// Convert to ThresholdConfig (unvalidated)
    pub fn to_threshold_config(&self) -> ThresholdConfig {
        ThresholdConfig {
            free_threshold: self.free,
            occupied_threshold: self.occupied,
            visit_threshold: self.visit_threshold,
            unknown_value: self.unknown_value,
        }
    }
}

/// Counter scoping
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CountingSection {
    /// Keep a per-batch local counter pair separate from the global one
    #[serde(default)]
    pub use_local_counter: bool,
}

impl CountingSection {
    /// Counting mode selected by this section
    pub fn mode(&self) -> CountingMode {
        if self.use_local_counter {
            CountingMode::Local
        } else {
            CountingMode::Mirrored
        }
    }
}

/// Loop-closure handling
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoopClosureSection {
    /// `hard_reset` or `ignore`
    #[serde(default)]
    pub strategy: LoopClosureStrategy,
}
