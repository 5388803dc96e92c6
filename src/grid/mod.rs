//! Counter-based occupancy grid engine.
//!
//! This module turns streamed keyframe point batches into per-cell evidence
//! counters and derives occupancy probabilities from them on demand.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            PointBatch (observer + points)                │
//! └────────────────────────────┬─────────────────────────────┘
//!                              ▼
//!                     ┌─────────────────┐
//!                     │  process_batch  │── GridSpec::index (drop OOB)
//!                     │                 │── RayMarker (free cells)
//!                     └────────┬────────┘
//!                              ▼
//!                ┌───────────────────────────┐
//!                │   EvidenceAccumulator     │
//!                │ global + local counters   │
//!                └─────────────┬─────────────┘
//!                              ▼ on demand
//!                ┌───────────────────────────┐
//!                │   ProbabilityResolver     │
//!                │ probability / class / cost│
//!                └───────────────────────────┘
//! ```
//!
//! ## Key Components
//!
//! - [`GridSpec`]: Immutable geometry and the world-to-cell indexer
//! - [`ray_marker`]: Bresenham walk from observer cell to point cell
//! - [`EvidenceAccumulator`]: Occupied/visited counters, global and local
//! - [`batch`]: Integrates one batch into the counters
//! - [`ProbabilityResolver`]: Counters to probability, classified, and cost grids
//!
//! ## Counting Model
//!
//! ```text
//! ray cells (excluding terminal)  → visited += 1
//! terminal cell                   → occupied += 1, visited += 1
//! P(occupied) = occupied / visited
//! ```

pub mod batch;
mod counters;
pub mod ray_marker;
mod resolver;
mod spec;

pub use batch::{BatchStats, process_batch};
pub use counters::{CellEvidence, CounterPair, CountingMode, EvidenceAccumulator};
pub use resolver::{
    CellState, ClassifiedGrid, CostGrid, GridSnapshot, ProbabilityGrid, ProbabilityResolver,
    ThresholdConfig,
};
pub use spec::GridSpec;
