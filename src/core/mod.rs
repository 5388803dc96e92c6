//! Core types for the chitra-grid library.
//!
//! All navigation-frame types follow the ROS REP-103 convention:
//! - **X-axis**: Forward
//! - **Y-axis**: Left
//! - **Z-axis**: Up (discarded when projecting onto the grid)
//!
//! ## Type Categories
//!
//! ### Coordinates
//! - [`Cell`]: Integer (row, col) indices into the grid
//! - [`WorldPoint`]: Planar navigation-frame coordinates
//! - [`Point3`]: 3D points as produced by the mapping backend
//!
//! ### Inputs
//! - [`PointBatch`]: Navigation-frame points plus the observing camera position
//! - [`KeyframePoints`]: Raw backend payload with per-point observation counts
//! - [`FrameTransform`]: Fixed camera-to-navigation linear transform

mod batch;
mod ingest;
mod point;

pub use batch::PointBatch;
pub use ingest::{FrameTransform, KeyframePoints, MapPoint};
pub use point::{Cell, Point3, WorldPoint};
