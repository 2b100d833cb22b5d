//! Axis-aligned bounding rectangle for 2D point sets.
//!
//! The rectangle is used for two things: calibrating the generating distance
//! from an assumed uniform density, and laying out the grid-based indexes.

use num_traits::Float;

/// Axis-aligned rectangle `[min_x, max_x] x [min_y, max_y]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<T> {
    /// Lower x limit.
    pub min_x: T,
    /// Lower y limit.
    pub min_y: T,
    /// Upper x limit.
    pub max_x: T,
    /// Upper y limit.
    pub max_y: T,
}

impl<T: Float> Rect<T> {
    /// Create a rectangle from its limits.
    pub fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Tight bounds of the given coordinates.
    ///
    /// Returns a zero rectangle at the origin when the input is empty.
    pub fn from_points(x: &[T], y: &[T]) -> Self {
        if x.is_empty() || y.is_empty() {
            return Self::new(T::zero(), T::zero(), T::zero(), T::zero());
        }
        let (mut min_x, mut max_x) = (x[0], x[0]);
        let (mut min_y, mut max_y) = (y[0], y[0]);
        for (&xi, &yi) in x.iter().zip(y.iter()) {
            min_x = min_x.min(xi);
            max_x = max_x.max(xi);
            min_y = min_y.min(yi);
            max_y = max_y.max(yi);
        }
        Self::new(min_x, min_y, max_x, max_y)
    }

    /// Extent along x.
    #[inline]
    pub fn width(&self) -> T {
        self.max_x - self.min_x
    }

    /// Extent along y.
    #[inline]
    pub fn height(&self) -> T {
        self.max_y - self.min_y
    }

    /// Area of the rectangle.
    #[inline]
    pub fn area(&self) -> T {
        self.width() * self.height()
    }

    /// Length of the diagonal.
    #[inline]
    pub fn diagonal(&self) -> T {
        self.width().hypot(self.height())
    }

    /// True when both extents are zero (all points colocated).
    #[inline]
    pub fn is_point(&self) -> bool {
        self.width() == T::zero() && self.height() == T::zero()
    }
}
