//! Main ChitraConfig and conversion methods.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{FrameTransform, KeyframePoints, PointBatch};
use crate::mapper::MapperConfig;

use super::error::ConfigLoadError;
use super::grid::GridSection;
use super::ingest::IngestSection;
use super::mapping::{CountingSection, LoopClosureSection, ThresholdSection};

/// Default config file location
pub const DEFAULT_CONFIG_PATH: &str = "configs/chitra.yaml";

/// Full grid engine configuration loaded from YAML
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChitraConfig {
    /// Grid extent and resolution
    #[serde(default)]
    pub grid: GridSection,

    /// Probability thresholds
    #[serde(default)]
    pub thresholds: ThresholdSection,

    /// Local vs mirrored counters
    #[serde(default)]
    pub counting: CountingSection,

    /// Loop-closure strategy
    #[serde(default)]
    pub loop_closure: LoopClosureSection,

    /// Backend payload conversion
    #[serde(default)]
    pub ingest: IngestSection,
}

impl ChitraConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_yaml(&contents)?;
        log::info!("Loaded grid configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `configs/chitra.yaml`, falling back to defaults
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("{} not found, using defaults", DEFAULT_CONFIG_PATH);
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    /// Convert to a validated MapperConfig
    pub fn to_mapper_config(&self) -> Result<MapperConfig, ConfigLoadError> {
        let thresholds = self.thresholds.to_threshold_config();
        thresholds.validate()?;
        self.ingest.validate()?;

        Ok(MapperConfig::new(self.grid.to_grid_spec()?)
            .with_thresholds(thresholds)
            .with_counting(self.counting.mode())
            .with_loop_closure(self.loop_closure.strategy))
    }

    /// Transform applied to incoming keyframes
    pub fn frame_transform(&self) -> FrameTransform {
        self.ingest.frame_transform()
    }

    /// Convert a backend keyframe using the ingest settings
    pub fn keyframe_to_batch(&self, keyframe: &KeyframePoints) -> PointBatch {
        keyframe.to_batch(&self.frame_transform(), self.ingest.min_observations)
    }
}
