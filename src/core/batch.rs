//! Point batches consumed by the grid engine.

use serde::{Deserialize, Serialize};

use super::point::Point3;

/// One keyframe's worth of map points plus the observing camera position.
///
/// Points are expected in the navigation frame and already filtered by
/// observation count (see [`KeyframePoints::to_batch`](super::KeyframePoints::to_batch)).
/// Processing order is insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointBatch {
    /// Observer (camera) position for every ray in this batch.
    pub observer: Point3,
    /// Observed points.
    pub points: Vec<Point3>,
}

impl PointBatch {
    /// Create a new batch
    pub fn new(observer: Point3, points: Vec<Point3>) -> Self {
        Self { observer, points }
    }

    /// Number of points in the batch
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the batch holds no points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
