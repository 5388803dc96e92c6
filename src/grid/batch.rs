//! Batch update: integrates one keyframe's points into the counters.
//!
//! For every point in the batch:
//! - Cells on the ray from the observer to the point receive a "visited"
//!   count (evidence of free space)
//! - The point's own cell receives a hit: "occupied" **and** "visited"
//!
//! Ray cells count once per batch on the local view (the global pair in
//! mirrored mode); the terminal hit is never deduplicated.
//! Counting the terminal cell as visited keeps `occupied <= visited` for the
//! global counters, so a cell seen only as an endpoint resolves to 1.0.
//! Points whose cell (or whose observer's cell) lies outside the grid are
//! dropped, never clamped.

use crate::core::PointBatch;

use super::counters::EvidenceAccumulator;
use super::ray_marker::RayMarker;
use super::spec::GridSpec;

/// Result of processing one batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Points that produced a hit
    pub points_integrated: usize,
    /// Points dropped because they (or the observer) fell outside the grid
    pub points_dropped: usize,
    /// Free-space cells marked along all rays
    pub cells_traversed: usize,
}

impl BatchStats {
    /// Merge another result into this one
    pub fn merge(&mut self, other: &BatchStats) {
        self.points_integrated += other.points_integrated;
        self.points_dropped += other.points_dropped;
        self.cells_traversed += other.cells_traversed;
    }
}

/// Integrate a batch into the accumulator.
///
/// Starts a new update epoch on the accumulator (clears the per-batch
/// visited mask and, in local mode, the local counters), then processes
/// points in insertion order.
pub fn process_batch(
    accumulator: &mut EvidenceAccumulator,
    spec: &GridSpec,
    batch: &PointBatch,
) -> BatchStats {
    let mut stats = BatchStats::default();

    accumulator.begin_batch();

    let observer = batch.observer.planar();
    let observer_cell = match spec.index_point(observer) {
        Ok(cell) => cell,
        Err(e) => {
            log::debug!("Dropping batch of {} points: observer {}", batch.len(), e);
            stats.points_dropped = batch.len();
            return stats;
        }
    };

    for point in &batch.points {
        let point_cell = match spec.index_point(point.planar()) {
            Ok(cell) => cell,
            Err(_) => {
                log::trace!("Dropping point ({:.3}, {:.3})", point.x, point.y);
                stats.points_dropped += 1;
                continue;
            }
        };

        for cell in RayMarker::new(observer_cell, point_cell) {
            accumulator.mark_visited(cell);
            stats.cells_traversed += 1;
        }
        accumulator.mark_hit(point_cell);
        stats.points_integrated += 1;
    }

    log::debug!(
        "Batch integrated: {} points, {} dropped, {} cells traversed",
        stats.points_integrated,
        stats.points_dropped,
        stats.cells_traversed
    );

    stats
}
