//! Probability resolution: counters → occupancy grids.
//!
//! ```text
//! visits   = global_visited   (+ local_visited  in Local mode)
//! occupied = global_occupied  (+ local_occupied in Local mode)
//!
//! visits <= visit_threshold  → unknown_value          (Unknown)
//! otherwise                  → p = occupied / visits   clamped to [0, 1]
//!
//!   p <= free_threshold      → Free
//!   p >= occupied_threshold  → Occupied
//!   else                     → Unknown
//! ```
//!
//! In local mode the current batch's (deduplicated) evidence is added on top
//! of the history, weighting what is visible right now.
//!
//! All grids are derived on demand and never stored.

use serde::{Deserialize, Serialize};

use crate::core::{Cell, WorldPoint};
use crate::error::{MapError, Result};

use super::counters::EvidenceAccumulator;
use super::spec::GridSpec;

/// Discrete classification of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Confirmed free space
    Free,
    /// Confirmed obstacle
    Occupied,
    /// Never observed, or evidence between the thresholds
    Unknown,
}

/// Thresholds that turn counters into probabilities and classes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Probabilities at or below this are free.
    #[serde(default = "default_free")]
    pub free_threshold: f32,

    /// Probabilities at or above this are occupied.
    #[serde(default = "default_occupied")]
    pub occupied_threshold: f32,

    /// Cells with at most this many visits are reported unknown.
    #[serde(default)]
    pub visit_threshold: u32,

    /// Probability reported for unknown cells. Strictly inside (0, 1).
    #[serde(default = "default_unknown")]
    pub unknown_value: f32,
}

fn default_free() -> f32 {
    0.45
}
fn default_occupied() -> f32 {
    0.5
}
fn default_unknown() -> f32 {
    0.5
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            free_threshold: default_free(),
            occupied_threshold: default_occupied(),
            visit_threshold: 0,
            unknown_value: default_unknown(),
        }
    }
}

impl ThresholdConfig {
    /// Reject inconsistent thresholds.
    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);

        if !in_unit(self.free_threshold) || !in_unit(self.occupied_threshold) {
            return Err(MapError::config(format!(
                "thresholds must lie in [0, 1], got free={} occupied={}",
                self.free_threshold, self.occupied_threshold
            )));
        }
        if self.free_threshold >= self.occupied_threshold {
            return Err(MapError::config(format!(
                "free_threshold ({}) must be below occupied_threshold ({})",
                self.free_threshold, self.occupied_threshold
            )));
        }
        if !(self.unknown_value.is_finite() && self.unknown_value > 0.0 && self.unknown_value < 1.0)
        {
            return Err(MapError::config(format!(
                "unknown_value must lie strictly inside (0, 1), got {}",
                self.unknown_value
            )));
        }
        Ok(())
    }
}

/// Dense row-major grid with its geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot<T> {
    /// Columns
    pub width: usize,
    /// Rows
    pub height: usize,
    /// Lower-left corner of cell (0, 0)
    pub origin: WorldPoint,
    /// Cells per unit length (x, y)
    pub resolution: (f32, f32),
    /// Row-major cell values
    pub cells: Vec<T>,
}

impl<T> GridSnapshot<T> {
    /// Value at `cell`, or `None` outside the grid.
    pub fn get(&self, cell: Cell) -> Option<&T> {
        if cell.row < self.height && cell.col < self.width {
            self.cells.get(cell.row * self.width + cell.col)
        } else {
            None
        }
    }

    /// Iterate `(cell, value)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &T)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (Cell::new(i / width, i % width), v))
    }
}

/// Continuous occupancy probabilities in [0, 1].
pub type ProbabilityGrid = GridSnapshot<f32>;

/// Discrete free/occupied/unknown view.
pub type ClassifiedGrid = GridSnapshot<CellState>;

/// Navigation cost grid: `-1` unknown, otherwise `0..=100`.
pub type CostGrid = GridSnapshot<i8>;

/// Converts counters into probability, classified, and cost grids.
#[derive(Clone, Debug)]
pub struct ProbabilityResolver {
    config: ThresholdConfig,
}

impl ProbabilityResolver {
    /// Cost value for unknown cells.
    pub const UNKNOWN_COST: i8 = -1;

    /// Create a resolver after validating the thresholds.
    pub fn new(config: ThresholdConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active thresholds.
    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Probability for a cell's counts, or `None` when the cell is unknown.
    #[inline]
    pub fn probability(&self, occupied: u64, visits: u64) -> Option<f32> {
        if visits <= self.config.visit_threshold as u64 || visits == 0 {
            return None;
        }
        Some((occupied as f64 / visits as f64).clamp(0.0, 1.0) as f32)
    }

    /// Classify a resolved probability.
    #[inline]
    pub fn classify(&self, probability: Option<f32>) -> CellState {
        match probability {
            None => CellState::Unknown,
            Some(p) if p <= self.config.free_threshold => CellState::Free,
            Some(p) if p >= self.config.occupied_threshold => CellState::Occupied,
            Some(_) => CellState::Unknown,
        }
    }

    /// Continuous probability grid.
    pub fn resolve(&self, acc: &EvidenceAccumulator, spec: &GridSpec) -> Result<ProbabilityGrid> {
        let unknown = self.config.unknown_value;
        self.evaluate(acc, spec, |p| p.unwrap_or(unknown))
    }

    /// Discrete classification grid.
    pub fn resolve_classified(
        &self,
        acc: &EvidenceAccumulator,
        spec: &GridSpec,
    ) -> Result<ClassifiedGrid> {
        self.evaluate(acc, spec, |p| self.classify(p))
    }

    /// Cost grid in the navigation-message convention.
    pub fn resolve_cost(&self, acc: &EvidenceAccumulator, spec: &GridSpec) -> Result<CostGrid> {
        self.evaluate(acc, spec, |p| match p {
            None => Self::UNKNOWN_COST,
            Some(p) => (p * 100.0).round() as i8,
        })
    }

    fn evaluate<T>(
        &self,
        acc: &EvidenceAccumulator,
        spec: &GridSpec,
        map: impl Fn(Option<f32>) -> T,
    ) -> Result<GridSnapshot<T>> {
        let global = acc.global();
        let local = acc.separate_local();
        let width = spec.width();

        let mut cells = Vec::with_capacity(spec.cell_count());
        for i in 0..spec.cell_count() {
            let mut occupied = global.occupied()[i] as u64;
            let mut visits = global.visited()[i] as u64;
            if let Some(local) = local {
                occupied += local.occupied()[i] as u64;
                visits += local.visited()[i] as u64;
            }

            if occupied > 0 && visits == 0 {
                return Err(MapError::CounterInvariant {
                    row: i / width,
                    col: i % width,
                    occupied: occupied.min(u32::MAX as u64) as u32,
                });
            }

            cells.push(map(self.probability(occupied, visits)));
        }

        Ok(GridSnapshot {
            width,
            height: spec.height(),
            origin: spec.origin(),
            resolution: spec.resolution(),
            cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CounterPair, CountingMode};
    use approx::assert_relative_eq;

    fn spec() -> GridSpec {
        GridSpec::with_dimensions(WorldPoint::ZERO, 4, 3, 1.0).unwrap()
    }

    fn resolver() -> ProbabilityResolver {
        ProbabilityResolver::new(ThresholdConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_grid_is_unknown() {
        let s = spec();
        let acc = EvidenceAccumulator::new(&s, CountingMode::Mirrored);

        let grid = resolver().resolve(&acc, &s).unwrap();
        assert_eq!(grid.width, 4);
        assert_eq!(grid.height, 3);
        assert_eq!(grid.cells.len(), 12);
        assert!(grid.cells.iter().all(|&p| p == 0.5));

        let classes = resolver().resolve_classified(&acc, &s).unwrap();
        assert!(classes.cells.iter().all(|&c| c == CellState::Unknown));

        let cost = resolver().resolve_cost(&acc, &s).unwrap();
        assert!(cost.cells.iter().all(|&c| c == -1));
    }

    #[test]
    fn test_ratio() {
        let s = spec();
        let mut acc = EvidenceAccumulator::new(&s, CountingMode::Mirrored);
        let cell = Cell::new(1, 2);
        acc.mark_hit(cell);
        // Three free passes from three separate batches
        for _ in 0..3 {
            acc.begin_batch();
            acc.mark_visited(cell);
        }

        let grid = resolver().resolve(&acc, &s).unwrap();
        assert_relative_eq!(*grid.get(cell).unwrap(), 0.25, epsilon = 1e-6);
        assert_eq!(
            *resolver().resolve_classified(&acc, &s).unwrap().get(cell).unwrap(),
            CellState::Free
        );
        assert_eq!(
            *resolver().resolve_cost(&acc, &s).unwrap().get(cell).unwrap(),
            25
        );
    }

    #[test]
    fn test_classification_bands() {
        let r = resolver();
        assert_eq!(r.classify(None), CellState::Unknown);
        assert_eq!(r.classify(Some(0.0)), CellState::Free);
        assert_eq!(r.classify(Some(0.45)), CellState::Free);
        assert_eq!(r.classify(Some(0.47)), CellState::Unknown);
        assert_eq!(r.classify(Some(0.5)), CellState::Occupied);
        assert_eq!(r.classify(Some(1.0)), CellState::Occupied);
    }

    #[test]
    fn test_visit_threshold() {
        let s = spec();
        let r = ProbabilityResolver::new(ThresholdConfig {
            visit_threshold: 2,
            ..Default::default()
        })
        .unwrap();
        let mut acc = EvidenceAccumulator::new(&s, CountingMode::Mirrored);
        let cell = Cell::new(0, 0);

        acc.mark_hit(cell);
        acc.mark_hit(cell);
        assert_eq!(*r.resolve(&acc, &s).unwrap().get(cell).unwrap(), 0.5);

        acc.mark_hit(cell);
        assert_eq!(*r.resolve(&acc, &s).unwrap().get(cell).unwrap(), 1.0);
    }

    #[test]
    fn test_custom_unknown_value() {
        let s = spec();
        let r = ProbabilityResolver::new(ThresholdConfig {
            unknown_value: 0.3,
            ..Default::default()
        })
        .unwrap();
        let acc = EvidenceAccumulator::new(&s, CountingMode::Mirrored);
        let grid = r.resolve(&acc, &s).unwrap();
        assert!(grid.cells.iter().all(|&p| p == 0.3));
    }

    #[test]
    fn test_local_mode_blends_counts() {
        let s = spec();
        let mut acc = EvidenceAccumulator::new(&s, CountingMode::Local);
        let cell = Cell::new(2, 1);

        // History: one free pass, one hit
        acc.begin_batch();
        acc.mark_visited(cell);
        acc.mark_visited(cell);
        acc.mark_occupied(cell);
        // Current batch: one more hit
        acc.begin_batch();
        acc.mark_hit(cell);

        // global 2/3, local 1/1 → blended 3/4
        let grid = resolver().resolve(&acc, &s).unwrap();
        assert_relative_eq!(*grid.get(cell).unwrap(), 0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_occupied_without_visit_rejected() {
        let s = spec();
        let mut occupied = vec![0; 12];
        occupied[5] = 1;
        let pair = CounterPair::from_vecs(occupied, vec![0; 12], s.width());
        assert!(matches!(pair, Err(MapError::CounterInvariant { row: 1, col: 1, .. })));
    }

    #[test]
    fn test_probability_bounds() {
        let r = resolver();
        assert_eq!(r.probability(0, 0), None);
        assert_eq!(r.probability(0, 5), Some(0.0));
        assert_eq!(r.probability(5, 5), Some(1.0));
        // Restored checkpoints may carry more hits than visits
        assert_eq!(r.probability(7, 3), Some(1.0));
    }

    #[test]
    fn test_invalid_thresholds() {
        let bad = [
            ThresholdConfig {
                free_threshold: 0.6,
                occupied_threshold: 0.5,
                ..Default::default()
            },
            ThresholdConfig {
                free_threshold: 0.5,
                occupied_threshold: 0.5,
                ..Default::default()
            },
            ThresholdConfig {
                occupied_threshold: 1.5,
                ..Default::default()
            },
            ThresholdConfig {
                unknown_value: 0.0,
                ..Default::default()
            },
            ThresholdConfig {
                unknown_value: 1.0,
                ..Default::default()
            },
            ThresholdConfig {
                free_threshold: f32::NAN,
                ..Default::default()
            },
        ];

        for config in bad {
            assert!(
                ProbabilityResolver::new(config.clone()).is_err(),
                "accepted {:?}",
                config
            );
        }
    }

    #[test]
    fn test_snapshot_iter_row_major() {
        let s = spec();
        let acc = EvidenceAccumulator::new(&s, CountingMode::Mirrored);
        let grid = resolver().resolve(&acc, &s).unwrap();

        let cells: Vec<Cell> = grid.iter().map(|(c, _)| c).collect();
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[3], Cell::new(0, 3));
        assert_eq!(cells[4], Cell::new(1, 0));
        assert!(grid.get(Cell::new(3, 0)).is_none());
    }
}
