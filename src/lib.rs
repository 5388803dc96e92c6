//! # Chitra Grid
//!
//! 2D occupancy grid built from sparse keyframe point clouds.
//!
//! ## Overview
//!
//! A visual SLAM backend emits keyframes: a camera position plus the map
//! points it observes. Each keyframe becomes a [`PointBatch`]. For every
//! point the engine walks a ray from the camera cell to the point cell:
//!
//! - **Ray cells** gain a *visited* count (evidence of free space)
//! - **Terminal cell** gains an *occupied* and a *visited* count
//!
//! Occupancy is resolved on demand as `occupied / visited`. Cells with no
//! visits report a configurable unknown value distinct from 0 and 1.
//!
//! ## Features
//!
//! - **Counter-based evidence**: global counters, optionally a per-batch
//!   local pair with deduplicated visits
//! - **Loop closure**: hard reset plus replay of corrected keyframes, or ignore
//! - **Single writer**: [`MapperWorker`] serializes mutations behind an
//!   ordered queue and discards batches made stale by a reset
//! - **Outputs**: probability, classified (free/occupied/unknown), and cost grids
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chitra_grid::{GridSpec, MapperConfig, OccupancyMapper, Point3, PointBatch, WorldPoint};
//!
//! let grid = GridSpec::uniform(WorldPoint::new(-10.0, -10.0), WorldPoint::new(10.0, 10.0), 10.0)?;
//! let mut mapper = OccupancyMapper::new(MapperConfig::new(grid))?;
//!
//! let batch = PointBatch::new(Point3::ZERO, vec![Point3::new(2.0, 0.5, 0.3)]);
//! let stats = mapper.process(&batch);
//! println!("Integrated {} points", stats.points_integrated);
//!
//! let grid = mapper.resolve_classified()?;
//! ```
//!
//! ## Coordinate System
//!
//! Navigation frame uses ROS REP-103 (X forward, Y left, Z up). Z is
//! discarded on projection. Columns run along X and rows along Y.

#![warn(missing_docs)]

// Core types
pub mod core;

// Grid geometry, counters, and resolution
pub mod grid;

// Unified configuration
pub mod config;

// Mapper facade and loop-closure handling
pub mod mapper;

// Background writer thread
pub mod threads;

// Error types
pub mod error;

// Re-export commonly used types
pub use core::{Cell, FrameTransform, KeyframePoints, MapPoint, Point3, PointBatch, WorldPoint};

pub use error::{MapError, Result};

pub use grid::{
    BatchStats, CellState, ClassifiedGrid, CostGrid, CountingMode, EvidenceAccumulator, GridSpec,
    ProbabilityGrid, ProbabilityResolver, ThresholdConfig,
};

pub use mapper::{
    KeyframeSource, LoopClosureOutcome, LoopClosureStrategy, MapperConfig, MapperStats,
    OccupancyMapper,
};

pub use config::{ChitraConfig, ConfigLoadError};

pub use threads::MapperWorker;
