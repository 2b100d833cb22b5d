//! Uniform grid neighbour index.
//!
//! ## Purpose
//!
//! This module buckets points into square cells of side `r / resolution`
//! and answers generating-distance queries by visiting every cell within
//! `ceil(r / cell_size)` cells of the query cell, filtering candidates by
//! exact squared distance.
//!
//! ## Design notes
//!
//! * **Compressed cell lists**: Members of all cells are stored in one
//!   array ordered by cell (`cell_start` gives the offsets), with their
//!   coordinates copied alongside so candidate scans are contiguous.
//! * **Own coordinates**: The layout copies the coordinates it indexes, so a
//!   built index never borrows the caller's molecules.
//! * **Cell budget**: When the data extent divided by the cell size would
//!   produce more than `max(4n, 1024)` cells, cells are enlarged until the
//!   budget holds. Results are unaffected; only pruning is coarser.
//!
//! ## Invariants
//!
//! * Every point belongs to exactly one cell.
//! * Distances are compared squared; a point at exactly `r` is a neighbour.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

use core::ops::Range;
use num_traits::Float;

use crate::index::{MoleculeSpace, SpaceStrategy};
use crate::primitives::bounds::Rect;
use crate::primitives::buffer::Neighbourhood;

/// Minimum number of cells the layout is always allowed.
const MIN_CELL_BUDGET: usize = 1024;

// ============================================================================
// Grid layout
// ============================================================================

/// Cell lists shared by the grid and radial indexes.
#[derive(Debug, Clone)]
pub struct GridLayout<T> {
    origin_x: T,
    origin_y: T,
    cell_size: T,
    cols: usize,
    rows: usize,
    cell_start: Vec<usize>,
    members: Vec<usize>,
    coords: Vec<[T; 2]>,
    slot_of: Vec<usize>,
    cell_of: Vec<usize>,
}

impl<T: Float> GridLayout<T> {
    /// Bucket the points into cells of side `cell_size` (enlarged if needed).
    pub fn build(x: &[T], y: &[T], cell_size: T) -> Self {
        let n = x.len().min(y.len());
        let bounds = Rect::from_points(&x[..n], &y[..n]);
        let budget = (n.saturating_mul(4)).max(MIN_CELL_BUDGET);

        let mut cell_size = if cell_size > T::zero() && cell_size.is_finite() {
            cell_size
        } else {
            T::one()
        };
        let two = T::one() + T::one();
        let (mut cols, mut rows) = Self::dimensions(&bounds, cell_size);
        while cols.saturating_mul(rows) > budget {
            cell_size = cell_size * two;
            let (c, r) = Self::dimensions(&bounds, cell_size);
            cols = c;
            rows = r;
        }

        let mut layout = Self {
            origin_x: bounds.min_x,
            origin_y: bounds.min_y,
            cell_size,
            cols,
            rows,
            cell_start: vec![0; cols * rows + 1],
            members: vec![0; n],
            coords: vec![[T::zero(); 2]; n],
            slot_of: vec![0; n],
            cell_of: vec![0; n],
        };

        // Counting sort of points by cell.
        for i in 0..n {
            let (c, r) = layout.locate(x[i], y[i]);
            let cell = r * cols + c;
            layout.cell_of[i] = cell;
            layout.cell_start[cell + 1] += 1;
        }
        for cell in 0..cols * rows {
            layout.cell_start[cell + 1] += layout.cell_start[cell];
        }
        let mut fill = layout.cell_start.clone();
        for i in 0..n {
            let cell = layout.cell_of[i];
            let slot = fill[cell];
            fill[cell] += 1;
            layout.members[slot] = i;
            layout.coords[slot] = [x[i], y[i]];
            layout.slot_of[i] = slot;
        }
        layout
    }

    fn dimensions(bounds: &Rect<T>, cell_size: T) -> (usize, usize) {
        let span = |extent: T| -> usize {
            let cells = (extent / cell_size).floor();
            if cells.is_finite() && cells >= T::zero() {
                cells.to_usize().map_or(usize::MAX, |c| c.saturating_add(1))
            } else {
                1
            }
        };
        (span(bounds.width()), span(bounds.height()))
    }

    /// Cell column and row of a coordinate, clamped to the grid.
    #[inline]
    pub fn locate(&self, px: T, py: T) -> (usize, usize) {
        let index = |p: T, origin: T, limit: usize| -> usize {
            let cell = ((p - origin) / self.cell_size).floor();
            if cell > T::zero() {
                cell.to_usize().unwrap_or(limit - 1).min(limit - 1)
            } else {
                0
            }
        };
        (
            index(px, self.origin_x, self.cols),
            index(py, self.origin_y, self.rows),
        )
    }

    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when no points are indexed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Side length of a cell.
    #[inline]
    pub fn cell_size(&self) -> T {
        self.cell_size
    }

    /// Grid width and height in cells.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Column and row of the cell holding point `id`.
    #[inline]
    pub fn cell_of(&self, id: usize) -> (usize, usize) {
        let cell = self.cell_of[id];
        (cell % self.cols, cell / self.cols)
    }

    /// Coordinates of point `id`.
    #[inline]
    pub fn coords_of(&self, id: usize) -> [T; 2] {
        self.coords[self.slot_of[id]]
    }

    /// Slot range of the cell at (`col`, `row`).
    #[inline]
    pub fn cell_range(&self, col: usize, row: usize) -> Range<usize> {
        let cell = row * self.cols + col;
        self.cell_start[cell]..self.cell_start[cell + 1]
    }

    /// Number of points in the cell at (`col`, `row`).
    #[inline]
    pub fn cell_len(&self, col: usize, row: usize) -> usize {
        self.cell_range(col, row).len()
    }

    /// Cell at `(col + dx, row + dy)` if it lies inside the grid.
    #[inline]
    pub fn offset(&self, col: usize, row: usize, dx: isize, dy: isize) -> Option<(usize, usize)> {
        let c = col.checked_add_signed(dx)?;
        let r = row.checked_add_signed(dy)?;
        (c < self.cols && r < self.rows).then_some((c, r))
    }

    /// Cell reach covering distance `r`.
    pub fn reach(&self, r: T) -> usize {
        let cells = (r / self.cell_size).ceil();
        if cells.is_finite() && cells > T::zero() {
            cells
                .to_usize()
                .unwrap_or(usize::MAX)
                .min(self.cols.max(self.rows))
        } else {
            0
        }
    }

    /// Append members of a cell range within `r2` of `query`.
    #[inline]
    pub fn scan(
        &self,
        slots: Range<usize>,
        query: [T; 2],
        r2: T,
        with_distances: bool,
        out: &mut Neighbourhood<T>,
    ) {
        for slot in slots {
            let [px, py] = self.coords[slot];
            let dx = px - query[0];
            let dy = py - query[1];
            let d2 = dx * dx + dy * dy;
            if d2 <= r2 {
                out.indices.push(self.members[slot]);
                if with_distances {
                    out.distances.push(d2);
                }
            }
        }
    }

    /// Append every member of a cell range without a distance check.
    #[inline]
    pub fn take_all(
        &self,
        slots: Range<usize>,
        query: [T; 2],
        with_distances: bool,
        out: &mut Neighbourhood<T>,
    ) {
        if with_distances {
            for slot in slots {
                let [px, py] = self.coords[slot];
                let dx = px - query[0];
                let dy = py - query[1];
                out.push(self.members[slot], dx * dx + dy * dy);
            }
        } else {
            out.indices.extend_from_slice(&self.members[slots]);
        }
    }

    /// Count members of a cell range within `r2` of `query`.
    #[inline]
    pub fn count(&self, slots: Range<usize>, query: [T; 2], r2: T) -> usize {
        self.coords[slots]
            .iter()
            .filter(|&&[px, py]| {
                let dx = px - query[0];
                let dy = py - query[1];
                dx * dx + dy * dy <= r2
            })
            .count()
    }
}

// ============================================================================
// Grid space
// ============================================================================

/// Grid index visiting the full square of cells around the query.
#[derive(Debug, Clone)]
pub struct GridSpace<T> {
    layout: GridLayout<T>,
    generating_distance: T,
    r2: T,
    reach: usize,
}

impl<T: Float> GridSpace<T> {
    /// Build the index with `resolution` cells per generating distance.
    pub fn new(x: &[T], y: &[T], generating_distance: T, resolution: usize) -> Self {
        let cell_size = cell_size_for(generating_distance, resolution);
        let layout = GridLayout::build(x, y, cell_size);
        let reach = layout.reach(generating_distance);
        Self {
            layout,
            generating_distance,
            r2: generating_distance * generating_distance,
            reach,
        }
    }

    /// The underlying cell layout.
    pub fn layout(&self) -> &GridLayout<T> {
        &self.layout
    }

    fn collect(&self, index: usize, with_distances: bool, out: &mut Neighbourhood<T>) {
        out.clear();
        let query = self.layout.coords_of(index);
        let (col, row) = self.layout.cell_of(index);
        let (cols, rows) = self.layout.shape();
        let rows_span = row.saturating_sub(self.reach)..=(row + self.reach).min(rows - 1);
        for r in rows_span {
            for c in col.saturating_sub(self.reach)..=(col + self.reach).min(cols - 1) {
                let slots = self.layout.cell_range(c, r);
                self.layout.scan(slots, query, self.r2, with_distances, out);
            }
        }
    }
}

/// Cell side for a generating distance and resolution.
pub(crate) fn cell_size_for<T: Float>(generating_distance: T, resolution: usize) -> T {
    let res = T::from(resolution.max(1)).unwrap_or_else(T::one);
    generating_distance / res
}

impl<T: Float + Send + Sync> MoleculeSpace<T> for GridSpace<T> {
    fn strategy(&self) -> SpaceStrategy {
        SpaceStrategy::Grid
    }

    fn generating_distance(&self) -> T {
        self.generating_distance
    }

    fn len(&self) -> usize {
        self.layout.len()
    }

    fn find_neighbours(&self, index: usize, out: &mut Neighbourhood<T>) {
        self.collect(index, false, out);
    }

    fn find_neighbours_with_distances(&self, index: usize, out: &mut Neighbourhood<T>) {
        self.collect(index, true, out);
    }

    fn count_neighbours(&self, index: usize, limit: usize) -> usize {
        let query = self.layout.coords_of(index);
        let (col, row) = self.layout.cell_of(index);
        let (cols, rows) = self.layout.shape();
        let mut count = 0;
        for r in row.saturating_sub(self.reach)..=(row + self.reach).min(rows - 1) {
            for c in col.saturating_sub(self.reach)..=(col + self.reach).min(cols - 1) {
                count += self.layout.count(self.layout.cell_range(c, r), query, self.r2);
                if count >= limit {
                    return count;
                }
            }
        }
        count
    }
}
