//! Default value functions for serde deserialization.

use crate::grid::ThresholdConfig;

pub fn extent_min() -> f32 {
    -10.0
}

pub fn extent_max() -> f32 {
    10.0
}

pub fn resolution() -> f32 {
    10.0
}

pub fn free_threshold() -> f32 {
    ThresholdConfig::default().free_threshold
}

pub fn occupied_threshold() -> f32 {
    ThresholdConfig::default().occupied_threshold
}

pub fn unknown_value() -> f32 {
    ThresholdConfig::default().unknown_value
}

pub fn min_observations() -> u32 {
    2
}

pub fn scale_factor() -> f32 {
    1.0
}
