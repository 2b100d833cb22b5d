//! Radial (circular) grid indexes.
//!
//! ## Purpose
//!
//! This module extends the uniform grid with a precomputed table of cell
//! offsets classified against the generating circle. Cells that lie wholly
//! inside the circle for every position of the query inside its own cell are
//! taken without distance checks; cells that lie wholly outside are never
//! visited. Only boundary cells are filtered by exact distance.
//!
//! ## Key concepts
//!
//! * **Inner offset**: farthest corner-to-corner distance is within `r`.
//! * **Boundary offset**: may contain points on both sides of the circle.
//! * **Inner-first ordering**: `InnerRadialSpace` visits inner offsets
//!   before boundary offsets so that "at least `min_points` neighbours" can
//!   often be decided from cell sizes alone.
//!
//! ## Invariants
//!
//! * Classification uses a small relative margin so that floating-point
//!   rounding never marks a cell inner or outside when an exact check could
//!   disagree. Both variants return exactly the grid variant's points.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use num_traits::Float;

use crate::index::grid::{cell_size_for, GridLayout};
use crate::index::{MoleculeSpace, SpaceStrategy};
use crate::primitives::buffer::Neighbourhood;

/// Relative margin applied when classifying offsets against the circle.
const CLASSIFY_MARGIN: f64 = 1e-9;

// ============================================================================
// Offset table
// ============================================================================

/// One cell offset relative to the query cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellOffset {
    /// Column offset.
    pub dx: isize,
    /// Row offset.
    pub dy: isize,
    /// Every point of the cell is within the generating distance.
    pub inner: bool,
}

/// Classified offsets within reach of a query cell.
#[derive(Debug, Clone)]
pub struct RadialOffsets {
    offsets: Vec<CellOffset>,
    inner_count: usize,
}

impl RadialOffsets {
    /// Classify every offset within `reach` cells.
    ///
    /// With `inner_first` the inner offsets are moved to the front.
    pub fn new<T: Float>(reach: usize, cell_size: T, r: T, inner_first: bool) -> Self {
        let margin = T::from(CLASSIFY_MARGIN).unwrap_or_else(T::zero);
        let r2 = r * r;
        let inner_limit = r2 * (T::one() - margin);
        let outer_limit = r2 * (T::one() + margin);
        let reach = reach as isize;

        let mut offsets = Vec::new();
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let near = |d: isize| {
                    let gap = T::from(d.unsigned_abs().saturating_sub(1)).unwrap_or_else(T::zero);
                    gap * cell_size
                };
                let far = |d: isize| {
                    let span = T::from(d.unsigned_abs() + 1).unwrap_or_else(T::zero);
                    span * cell_size
                };
                let (nx, ny) = (near(dx), near(dy));
                if nx * nx + ny * ny > outer_limit {
                    continue;
                }
                let (fx, fy) = (far(dx), far(dy));
                offsets.push(CellOffset {
                    dx,
                    dy,
                    inner: fx * fx + fy * fy <= inner_limit,
                });
            }
        }
        if inner_first {
            // Stable, so both groups keep row-major order.
            offsets.sort_by_key(|o| !o.inner);
        }
        let inner_count = offsets.iter().filter(|o| o.inner).count();
        Self {
            offsets,
            inner_count,
        }
    }

    /// All retained offsets.
    pub fn as_slice(&self) -> &[CellOffset] {
        &self.offsets
    }

    /// Number of inner offsets.
    pub fn inner_count(&self) -> usize {
        self.inner_count
    }
}

// ============================================================================
// Shared query logic
// ============================================================================

#[derive(Debug, Clone)]
struct RadialCore<T> {
    layout: GridLayout<T>,
    offsets: RadialOffsets,
    generating_distance: T,
    r2: T,
}

impl<T: Float> RadialCore<T> {
    fn new(x: &[T], y: &[T], r: T, resolution: usize, inner_first: bool) -> Self {
        let layout = GridLayout::build(x, y, cell_size_for(r, resolution));
        let offsets = RadialOffsets::new(layout.reach(r), layout.cell_size(), r, inner_first);
        Self {
            layout,
            offsets,
            generating_distance: r,
            r2: r * r,
        }
    }

    fn collect(&self, index: usize, with_distances: bool, out: &mut Neighbourhood<T>) {
        out.clear();
        let query = self.layout.coords_of(index);
        let (col, row) = self.layout.cell_of(index);
        for o in self.offsets.as_slice() {
            let Some((c, r)) = self.layout.offset(col, row, o.dx, o.dy) else {
                continue;
            };
            let slots = self.layout.cell_range(c, r);
            if o.inner {
                self.layout.take_all(slots, query, with_distances, out);
            } else {
                self.layout.scan(slots, query, self.r2, with_distances, out);
            }
        }
    }

    fn count(&self, index: usize, limit: usize) -> usize {
        let query = self.layout.coords_of(index);
        let (col, row) = self.layout.cell_of(index);
        let mut count = 0;
        for o in self.offsets.as_slice() {
            let Some((c, r)) = self.layout.offset(col, row, o.dx, o.dy) else {
                continue;
            };
            count += if o.inner {
                self.layout.cell_len(c, r)
            } else {
                self.layout.count(self.layout.cell_range(c, r), query, self.r2)
            };
            if count >= limit {
                return count;
            }
        }
        count
    }
}

// ============================================================================
// Radial space
// ============================================================================

/// Grid index with circular cell classification.
#[derive(Debug, Clone)]
pub struct RadialSpace<T> {
    core: RadialCore<T>,
}

impl<T: Float> RadialSpace<T> {
    /// Build the index with `resolution` cells per generating distance.
    pub fn new(x: &[T], y: &[T], generating_distance: T, resolution: usize) -> Self {
        Self {
            core: RadialCore::new(x, y, generating_distance, resolution, false),
        }
    }

    /// The classified offset table.
    pub fn offsets(&self) -> &RadialOffsets {
        &self.core.offsets
    }
}

impl<T: Float + Send + Sync> MoleculeSpace<T> for RadialSpace<T> {
    fn strategy(&self) -> SpaceStrategy {
        SpaceStrategy::Radial
    }

    fn generating_distance(&self) -> T {
        self.core.generating_distance
    }

    fn len(&self) -> usize {
        self.core.layout.len()
    }

    fn find_neighbours(&self, index: usize, out: &mut Neighbourhood<T>) {
        self.core.collect(index, false, out);
    }

    fn find_neighbours_with_distances(&self, index: usize, out: &mut Neighbourhood<T>) {
        self.core.collect(index, true, out);
    }

    fn count_neighbours(&self, index: usize, limit: usize) -> usize {
        self.core.count(index, limit)
    }
}

// ============================================================================
// Inner-radial space
// ============================================================================

/// Radial index tuned for the DBSCAN core-point test.
#[derive(Debug, Clone)]
pub struct InnerRadialSpace<T> {
    core: RadialCore<T>,
}

impl<T: Float> InnerRadialSpace<T> {
    /// Build the index with `resolution` cells per generating distance.
    pub fn new(x: &[T], y: &[T], generating_distance: T, resolution: usize) -> Self {
        Self {
            core: RadialCore::new(x, y, generating_distance, resolution, true),
        }
    }

    /// The classified offset table (inner offsets first).
    pub fn offsets(&self) -> &RadialOffsets {
        &self.core.offsets
    }
}

impl<T: Float + Send + Sync> MoleculeSpace<T> for InnerRadialSpace<T> {
    fn strategy(&self) -> SpaceStrategy {
        SpaceStrategy::InnerRadial
    }

    fn generating_distance(&self) -> T {
        self.core.generating_distance
    }

    fn len(&self) -> usize {
        self.core.layout.len()
    }

    fn find_neighbours(&self, index: usize, out: &mut Neighbourhood<T>) {
        self.core.collect(index, false, out);
    }

    fn find_neighbours_with_distances(&self, index: usize, out: &mut Neighbourhood<T>) {
        self.core.collect(index, true, out);
    }

    fn count_neighbours(&self, index: usize, limit: usize) -> usize {
        self.core.count(index, limit)
    }
}
