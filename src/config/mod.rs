//! Configuration loading for the grid engine.
//!
//! Loads everything from a single YAML file with defaults for every field.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chitra_grid::config::ChitraConfig;
//! use chitra_grid::OccupancyMapper;
//!
//! // configs/chitra.yaml, or built-in defaults when absent
//! let config = ChitraConfig::load_default()?;
//! let mut mapper = OccupancyMapper::new(config.to_mapper_config()?)?;
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`GridSection`] | Extent and resolution (cells per unit) |
//! | [`ThresholdSection`] | Free/occupied thresholds, visit threshold, unknown value |
//! | [`CountingSection`] | Local counter pair on/off |
//! | [`LoopClosureSection`] | `hard_reset` or `ignore` |
//! | [`IngestSection`] | Observation filter and frame transform |
//!
//! ## Example YAML
//!
//! ```yaml
//! grid:
//!   min_x: -10.0
//!   max_x: 10.0
//!   min_y: -10.0
//!   max_y: 10.0
//!   resolution: 10.0     # 10 cells per unit
//! thresholds:
//!   free: 0.45
//!   occupied: 0.5
//!   visit_threshold: 0
//! loop_closure:
//!   strategy: hard_reset
//! ```

mod chitra;
mod defaults;
mod error;
mod grid;
mod ingest;
mod mapping;

pub use chitra::{ChitraConfig, DEFAULT_CONFIG_PATH};
pub use error::ConfigLoadError;

pub use grid::GridSection;
pub use ingest::{IngestSection, TransformKind};
pub use mapping::{CountingSection, LoopClosureSection, ThresholdSection};
