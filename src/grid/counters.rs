//! Evidence counters: the only mutable state of the grid engine.
//!
//! Two [`CounterPair`]s are kept, each with an `occupied` and a `visited`
//! array in row-major order:
//!
//! ```text
//! global.occupied: [O O O O O O O O|...]   all history since last reset
//! global.visited:  [V V V V V V V V|...]
//! local.occupied:  [o o o o o o o o|...]   current batch only (Local mode)
//! local.visited:   [v v v v v v v v|...]   deduplicated per batch
//! batch_mask:      [m m m m m m m m|...]   cells already counted this batch
//! ```
//!
//! In [`CountingMode::Mirrored`] there is no separate local pair; the local
//! view aliases the global one.

use serde::{Deserialize, Serialize};

use crate::core::Cell;
use crate::error::{MapError, Result};

use super::spec::GridSpec;

/// How the local (per-batch) counters relate to the global ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    /// Local counters alias the global counters.
    #[default]
    Mirrored,
    /// Local counters are zeroed at the start of every batch.
    Local,
}

/// Occupied/visited counts of one epoch (global or local).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterPair {
    occupied: Vec<u32>,
    visited: Vec<u32>,
}

impl CounterPair {
    /// Create a zeroed pair for `cells` cells.
    pub fn zeroed(cells: usize) -> Self {
        Self {
            occupied: vec![0; cells],
            visited: vec![0; cells],
        }
    }

    /// Build a pair from raw arrays (e.g. a checkpoint).
    ///
    /// Both arrays must have the same length and every cell with an
    /// occupied count must also have been visited.
    pub fn from_vecs(occupied: Vec<u32>, visited: Vec<u32>, width: usize) -> Result<Self> {
        if occupied.len() != visited.len() {
            return Err(MapError::DimensionMismatch {
                expected: occupied.len(),
                actual: visited.len(),
            });
        }
        let pair = Self { occupied, visited };
        pair.check_invariant(width)?;
        Ok(pair)
    }

    /// Number of cells covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    /// Whether the pair covers no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }

    /// Occupied counts (row-major).
    #[inline]
    pub fn occupied(&self) -> &[u32] {
        &self.occupied
    }

    /// Visited counts (row-major).
    #[inline]
    pub fn visited(&self) -> &[u32] {
        &self.visited
    }

    /// Whether every count is zero.
    pub fn is_zero(&self) -> bool {
        self.occupied.iter().all(|&c| c == 0) && self.visited.iter().all(|&c| c == 0)
    }

    /// Find the first cell that has occupied hits but no visits.
    pub fn check_invariant(&self, width: usize) -> Result<()> {
        let bad = self
            .occupied
            .iter()
            .zip(&self.visited)
            .position(|(&o, &v)| o > 0 && v == 0);

        match bad {
            Some(i) => Err(MapError::CounterInvariant {
                row: i / width.max(1),
                col: i % width.max(1),
                occupied: self.occupied[i],
            }),
            None => Ok(()),
        }
    }

    fn clear(&mut self) {
        self.occupied.fill(0);
        self.visited.fill(0);
    }
}

/// Counts for a single cell across both epochs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellEvidence {
    /// Global occupied count
    pub global_occupied: u32,
    /// Global visited count
    pub global_visited: u32,
    /// Local occupied count (equals global in mirrored mode)
    pub local_occupied: u32,
    /// Local visited count (equals global in mirrored mode)
    pub local_visited: u32,
}

/// Owner of all counter arrays.
///
/// Counters only grow between resets; increments saturate at `u32::MAX`.
#[derive(Clone, Debug)]
pub struct EvidenceAccumulator {
    global: CounterPair,
    local: Option<CounterPair>,
    batch_mask: Vec<bool>,
    width: usize,
    height: usize,
}

impl EvidenceAccumulator {
    /// Create zeroed counters sized for `spec`.
    pub fn new(spec: &GridSpec, mode: CountingMode) -> Self {
        let cells = spec.cell_count();
        Self {
            global: CounterPair::zeroed(cells),
            local: match mode {
                CountingMode::Mirrored => None,
                CountingMode::Local => Some(CounterPair::zeroed(cells)),
            },
            batch_mask: vec![false; cells],
            width: spec.width(),
            height: spec.height(),
        }
    }

    /// Restore counters from raw pairs.
    ///
    /// `local` must be `Some` exactly when `mode` is [`CountingMode::Local`].
    pub fn from_raw(
        spec: &GridSpec,
        mode: CountingMode,
        global: CounterPair,
        local: Option<CounterPair>,
    ) -> Result<Self> {
        let expected = spec.cell_count();
        let check = |pair: &CounterPair| -> Result<()> {
            if pair.len() != expected {
                return Err(MapError::DimensionMismatch {
                    expected,
                    actual: pair.len(),
                });
            }
            pair.check_invariant(spec.width())
        };

        check(&global)?;
        let local = match (mode, local) {
            (CountingMode::Mirrored, None) => None,
            (CountingMode::Local, Some(pair)) => {
                check(&pair)?;
                Some(pair)
            }
            (CountingMode::Local, None) => Some(CounterPair::zeroed(expected)),
            (CountingMode::Mirrored, Some(_)) => {
                return Err(MapError::config(
                    "local counters supplied but counting mode is mirrored",
                ));
            }
        };

        Ok(Self {
            global,
            local,
            batch_mask: vec![false; expected],
            width: spec.width(),
            height: spec.height(),
        })
    }

    // === Properties ===

    /// Active counting mode.
    #[inline]
    pub fn mode(&self) -> CountingMode {
        if self.local.is_some() {
            CountingMode::Local
        } else {
            CountingMode::Mirrored
        }
    }

    /// Global (all-history) counters.
    #[inline]
    pub fn global(&self) -> &CounterPair {
        &self.global
    }

    /// Local counters (the global pair in mirrored mode).
    #[inline]
    pub fn local(&self) -> &CounterPair {
        self.local.as_ref().unwrap_or(&self.global)
    }

    /// Local counters only when they diverge from the global ones.
    #[inline]
    pub fn separate_local(&self) -> Option<&CounterPair> {
        self.local.as_ref()
    }

    /// Counts for one cell, or `None` outside the grid.
    pub fn cell(&self, cell: Cell) -> Option<CellEvidence> {
        let i = self.offset(cell)?;
        let local = self.local();
        Some(CellEvidence {
            global_occupied: self.global.occupied[i],
            global_visited: self.global.visited[i],
            local_occupied: local.occupied[i],
            local_visited: local.visited[i],
        })
    }

    #[inline]
    fn offset(&self, cell: Cell) -> Option<usize> {
        if cell.row < self.height && cell.col < self.width {
            Some(cell.row * self.width + cell.col)
        } else {
            None
        }
    }

    // === Updates ===

    /// Record a point landing in `cell`.
    ///
    /// Returns `false` (and changes nothing) when the cell is outside the grid.
    pub fn mark_occupied(&mut self, cell: Cell) -> bool {
        let Some(i) = self.offset(cell) else {
            return false;
        };
        self.global.occupied[i] = self.global.occupied[i].saturating_add(1);
        if let Some(local) = self.local.as_mut() {
            local.occupied[i] = local.occupied[i].saturating_add(1);
        }
        true
    }

    /// Record a ray passing through `cell`.
    ///
    /// The per-batch mask lets a traversal count once per batch on the local
    /// view. In mirrored mode that view is the global pair. In local mode
    /// the global count always increments.
    pub fn mark_visited(&mut self, cell: Cell) -> bool {
        let Some(i) = self.offset(cell) else {
            return false;
        };
        let first_in_batch = !self.batch_mask[i];
        self.batch_mask[i] = true;

        match self.local.as_mut() {
            Some(local) => {
                self.global.visited[i] = self.global.visited[i].saturating_add(1);
                if first_in_batch {
                    local.visited[i] = local.visited[i].saturating_add(1);
                }
            }
            None if first_in_batch => {
                self.global.visited[i] = self.global.visited[i].saturating_add(1);
            }
            None => {}
        }
        true
    }

    /// Record a ray terminating in `cell`: occupied and visited.
    ///
    /// Hits bypass the batch mask, so every occupied count has a matching
    /// visit and traversal dedup does not depend on point order.
    pub fn mark_hit(&mut self, cell: Cell) -> bool {
        let Some(i) = self.offset(cell) else {
            return false;
        };
        for pair in std::iter::once(&mut self.global).chain(self.local.as_mut()) {
            pair.occupied[i] = pair.occupied[i].saturating_add(1);
            pair.visited[i] = pair.visited[i].saturating_add(1);
        }
        true
    }

    /// Start a new update epoch: clear the batch mask and, in local mode,
    /// zero the local counters.
    pub fn begin_batch(&mut self) {
        self.batch_mask.fill(false);
        self.reset_local();
    }

    /// Zero the local counters. No-op in mirrored mode.
    pub fn reset_local(&mut self) {
        if let Some(local) = self.local.as_mut() {
            local.clear();
        }
    }

    /// Zero every counter array and the batch mask.
    pub fn reset_all(&mut self) {
        self.global.clear();
        self.reset_local();
        self.batch_mask.fill(false);
    }

    /// Whether every counter is zero.
    pub fn is_zero(&self) -> bool {
        self.global.is_zero() && self.local.as_ref().is_none_or(CounterPair::is_zero)
    }
}
