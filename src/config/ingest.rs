//! Backend payload conversion section.

use serde::{Deserialize, Serialize};

use crate::core::FrameTransform;
use crate::error::{MapError, Result};

use super::defaults;

/// Frame convention of incoming points
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    /// Camera optical frame, converted to the navigation frame
    #[default]
    OrbToRos,
    /// Already in the navigation frame
    Identity,
}

/// Keyframe ingest settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IngestSection {
    /// Points with fewer observations are ignored
    #[serde(default = "defaults::min_observations")]
    pub min_observations: u32,

    /// Frame convention of incoming points
    #[serde(default)]
    pub transform: TransformKind,

    /// Backend units to grid units, applied after the frame conversion
    #[serde(default = "defaults::scale_factor")]
    pub scale_factor: f32,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            min_observations: defaults::min_observations(),
            transform: TransformKind::default(),
            scale_factor: defaults::scale_factor(),
        }
    }
}

impl IngestSection {
    /// Transform selected by this section, scale included
    pub fn frame_transform(&self) -> FrameTransform {
        let base = match self.transform {
            TransformKind::OrbToRos => FrameTransform::orb_to_ros(),
            TransformKind::Identity => FrameTransform::IDENTITY,
        };
        base.scaled(self.scale_factor)
    }

    /// Check the scale factor
    pub fn validate(&self) -> Result<()> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(MapError::config(format!(
                "scale_factor must be finite and positive, got {}",
                self.scale_factor
            )));
        }
        Ok(())
    }
}
