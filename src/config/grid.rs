//! Grid configuration section.

use serde::{Deserialize, Serialize};

use crate::core::WorldPoint;
use crate::error::Result;
use crate::grid::GridSpec;

use super::defaults;

/// Grid extent and resolution.
///
/// Resolution is in cells per world unit; `resolution_x`/`resolution_y`
/// override it per axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSection {
    /// Minimum X of the mapped area
    #[serde(default = "defaults::extent_min")]
    pub min_x: f32,

    /// Maximum X of the mapped area
    #[serde(default = "defaults::extent_max")]
    pub max_x: f32,

    /// Minimum Y of the mapped area
    #[serde(default = "defaults::extent_min")]
    pub min_y: f32,

    /// Maximum Y of the mapped area
    #[serde(default = "defaults::extent_max")]
    pub max_y: f32,

    /// Cells per world unit on both axes
    #[serde(default = "defaults::resolution")]
    pub resolution: f32,

    /// X override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_x: Option<f32>,

    /// Y override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_y: Option<f32>,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            min_x: defaults::extent_min(),
            max_x: defaults::extent_max(),
            min_y: defaults::extent_min(),
            max_y: defaults::extent_max(),
            resolution: defaults::resolution(),
            resolution_x: None,
            resolution_y: None,
        }
    }
}

impl GridSection {
    /// Build and validate the grid geometry.
    pub fn to_grid_spec(&self) -> Result<GridSpec> {
        GridSpec::new(
            WorldPoint::new(self.min_x, self.min_y),
            WorldPoint::new(self.max_x, self.max_y),
            self.resolution_x.unwrap_or(self.resolution),
            self.resolution_y.unwrap_or(self.resolution),
        )
    }
}
