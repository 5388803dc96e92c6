//! Backend payloads and the camera-to-navigation frame conversion.
//!
//! The visual SLAM backend reports map points in the camera convention
//! (Z forward, X right, Y down). The navigation grid uses ROS REP-103
//! (X forward, Y left, Z up). The conversion is a fixed linear map applied
//! before points reach the grid engine:
//!
//! ```text
//! | x_ros |   |  0  0  1 |   | x_cam |
//! | y_ros | = | -1  0  0 | * | y_cam |
//! | z_ros |   |  0 -1  0 |   | z_cam |
//! ```

use serde::{Deserialize, Serialize};

use super::batch::PointBatch;
use super::point::Point3;

/// Fixed linear transform between two frames.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameTransform {
    /// Row-major 3x3 matrix
    pub matrix: [[f32; 3]; 3],
}

impl FrameTransform {
    /// Identity (points already in the navigation frame)
    pub const IDENTITY: FrameTransform = FrameTransform {
        matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    /// Create from a row-major matrix
    pub fn new(matrix: [[f32; 3]; 3]) -> Self {
        Self { matrix }
    }

    /// Camera optical frame to ROS navigation frame.
    pub fn orb_to_ros() -> Self {
        Self::new([[0.0, 0.0, 1.0], [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]])
    }

    /// Same transform followed by a uniform scale.
    ///
    /// Monocular backends report positions in an arbitrary unit; `factor`
    /// maps them to grid units.
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.matrix.map(|row| row.map(|v| v * factor)))
    }

    /// Apply the transform to a point.
    #[inline]
    pub fn apply(&self, p: Point3) -> Point3 {
        let m = &self.matrix;
        Point3::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z,
            m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z,
            m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z,
        )
    }
}

impl Default for FrameTransform {
    fn default() -> Self {
        Self::orb_to_ros()
    }
}

/// A tracked map point with the number of keyframes that observe it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    /// Position in the backend frame
    pub position: Point3,
    /// Number of backing observations
    pub observations: u32,
}

impl MapPoint {
    /// Create a new map point
    pub fn new(position: Point3, observations: u32) -> Self {
        Self {
            position,
            observations,
        }
    }
}

/// Keyframe payload as reported by the backend (backend frame).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyframePoints {
    /// Camera centre of the keyframe
    pub camera_position: Point3,
    /// Map points seen from this keyframe
    pub points: Vec<MapPoint>,
}

impl KeyframePoints {
    /// Create a new keyframe payload
    pub fn new(camera_position: Point3, points: Vec<MapPoint>) -> Self {
        Self {
            camera_position,
            points,
        }
    }

    /// Convert into a grid batch.
    ///
    /// Points backed by fewer than `min_observations` observations and
    /// non-finite points are dropped; the rest are transformed into the
    /// navigation frame together with the camera position.
    pub fn to_batch(&self, transform: &FrameTransform, min_observations: u32) -> PointBatch {
        let points: Vec<Point3> = self
            .points
            .iter()
            .filter(|p| p.observations >= min_observations && p.position.is_finite())
            .map(|p| transform.apply(p.position))
            .collect();

        if points.len() < self.points.len() {
            log::trace!(
                "Keyframe filter kept {}/{} points (min_observations={})",
                points.len(),
                self.points.len(),
                min_observations
            );
        }

        PointBatch::new(transform.apply(self.camera_position), points)
    }
}
