//! Grid geometry and the world-to-cell indexer.
//!
//! The grid uses a coordinate system where:
//! - Cell (0, 0) has its lower-left corner at `(min_x, min_y)`
//! - Columns grow with X, rows grow with Y
//! - Resolution is expressed in **cells per unit length**, separately for X and Y
//!
//! ```text
//!  max_y ┌───┬───┬───┬───┐
//!        │2,0│2,1│2,2│2,3│   row = floor((y - min_y) * res_y)
//!        ├───┼───┼───┼───┤   col = floor((x - min_x) * res_x)
//!        │1,0│1,1│1,2│1,3│
//!        ├───┼───┼───┼───┤
//!        │0,0│0,1│0,2│0,3│
//!  min_y └───┴───┴───┴───┘
//!      min_x           max_x
//! ```

use crate::core::{Cell, WorldPoint};
use crate::error::{MapError, Result};

/// Immutable grid geometry.
///
/// Dimensions are derived from extent and resolution at construction and
/// never change afterwards. A different geometry means a new grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridSpec {
    min: WorldPoint,
    max: WorldPoint,
    res_x: f32,
    res_y: f32,
    width: usize,
    height: usize,
}

impl GridSpec {
    /// Upper bound on the number of cells (four u32 arrays of this size).
    pub const MAX_CELLS: usize = 1 << 26;

    /// Create a grid covering `[min, max)` at the given resolution.
    ///
    /// `width = ceil((max_x - min_x) * res_x)`, `height = ceil((max_y - min_y) * res_y)`.
    pub fn new(min: WorldPoint, max: WorldPoint, res_x: f32, res_y: f32) -> Result<Self> {
        if !(res_x.is_finite() && res_y.is_finite()) || res_x <= 0.0 || res_y <= 0.0 {
            return Err(MapError::config(format!(
                "resolution must be positive, got ({res_x}, {res_y})"
            )));
        }
        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return Err(MapError::config("grid extent must be finite"));
        }
        if max.x <= min.x || max.y <= min.y {
            return Err(MapError::config(format!(
                "empty grid extent: min ({}, {}), max ({}, {})",
                min.x, min.y, max.x, max.y
            )));
        }

        let width = ((max.x - min.x) * res_x).ceil() as usize;
        let height = ((max.y - min.y) * res_y).ceil() as usize;

        if width == 0 || height == 0 {
            return Err(MapError::config("grid has zero cells"));
        }
        match width.checked_mul(height) {
            Some(n) if n <= Self::MAX_CELLS => {}
            _ => {
                return Err(MapError::config(format!(
                    "grid of {width}x{height} cells exceeds limit of {} cells",
                    Self::MAX_CELLS
                )));
            }
        }

        Ok(Self {
            min,
            max,
            res_x,
            res_y,
            width,
            height,
        })
    }

    /// Create a grid with a uniform resolution.
    pub fn uniform(min: WorldPoint, max: WorldPoint, resolution: f32) -> Result<Self> {
        Self::new(min, max, resolution, resolution)
    }

    /// Create a grid of `width x height` cells anchored at `origin`.
    pub fn with_dimensions(
        origin: WorldPoint,
        width: usize,
        height: usize,
        resolution: f32,
    ) -> Result<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(MapError::config(format!(
                "resolution must be positive, got {resolution}"
            )));
        }
        let max = WorldPoint::new(
            origin.x + width as f32 / resolution,
            origin.y + height as f32 / resolution,
        );
        let spec = Self::new(origin, max, resolution, resolution)?;
        // Guard against float round-up adding a column or row.
        Ok(Self {
            width: width.min(spec.width),
            height: height.min(spec.height),
            ..spec
        })
    }

    // === Basic Properties ===

    /// Grid width in cells (columns).
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells (rows).
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// World coordinates of the lower-left corner of cell (0, 0).
    #[inline]
    pub fn origin(&self) -> WorldPoint {
        self.min
    }

    /// Requested upper extent.
    #[inline]
    pub fn extent(&self) -> WorldPoint {
        self.max
    }

    /// Resolution (cells per unit length) as (x, y).
    #[inline]
    pub fn resolution(&self) -> (f32, f32) {
        (self.res_x, self.res_y)
    }

    // === Coordinate Conversion ===

    /// Map a planar coordinate to its cell.
    ///
    /// Fails with [`MapError::OutOfBounds`] when the coordinate falls outside
    /// `[0, height) x [0, width)` (NaN included). Never clamps.
    #[inline]
    pub fn index(&self, x: f32, y: f32) -> Result<Cell> {
        let col = ((x - self.min.x) * self.res_x).floor();
        let row = ((y - self.min.y) * self.res_y).floor();

        if col >= 0.0 && row >= 0.0 && col < self.width as f32 && row < self.height as f32 {
            // Float comparison passed; the integer check catches the last-ulp edge.
            let cell = Cell::new(row as usize, col as usize);
            if self.contains(cell) {
                return Ok(cell);
            }
        }
        Err(MapError::OutOfBounds { x, y })
    }

    /// Map a world point to its cell.
    #[inline]
    pub fn index_point(&self, point: WorldPoint) -> Result<Cell> {
        self.index(point.x, point.y)
    }

    /// World coordinates of a cell center.
    #[inline]
    pub fn cell_center(&self, cell: Cell) -> WorldPoint {
        WorldPoint::new(
            self.min.x + (cell.col as f32 + 0.5) / self.res_x,
            self.min.y + (cell.row as f32 + 0.5) / self.res_y,
        )
    }

    /// Check if a cell lies inside the grid.
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Row-major offset of a cell. Caller guarantees `contains(cell)`.
    #[inline]
    pub fn flat_index(&self, cell: Cell) -> usize {
        debug_assert!(self.contains(cell));
        cell.row * self.width + cell.col
    }
}
