//! Error types for chitra-grid

/// Result type alias
pub type Result<T> = std::result::Result<T, MapError>;

/// Grid engine error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    /// Coordinate maps outside the grid extent.
    ///
    /// Recovered by dropping the point during batch processing.
    #[error("Point ({x:.3}, {y:.3}) is outside the grid")]
    OutOfBounds {
        /// Planar X coordinate
        x: f32,
        /// Planar Y coordinate
        y: f32,
    },

    /// Rejected configuration (resolution, extent, or thresholds)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Counters claim an occupied cell that was never visited
    #[error("Cell ({row}, {col}) has {occupied} occupied hits but no visits")]
    CounterInvariant {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Offending occupied count
        occupied: u32,
    },

    /// Restored counter arrays do not match the grid dimensions
    #[error("Counter array has {actual} cells, grid needs {expected}")]
    DimensionMismatch {
        /// Cells required by the grid
        expected: usize,
        /// Cells supplied
        actual: usize,
    },

    /// Keyframe source could not supply the full keyframe set
    #[error("Keyframe replay failed: {0}")]
    Replay(String),

    /// Background worker is no longer accepting events
    #[error("Mapper worker stopped")]
    WorkerStopped,
}

impl MapError {
    /// Shorthand for [`MapError::InvalidConfiguration`]
    pub fn config(msg: impl Into<String>) -> Self {
        MapError::InvalidConfiguration(msg.into())
    }
}
