//! Structured grids.
//!
//! A [`Grid1D`] is nothing more than a strictly increasing coordinate
//! sequence; it does not assume uniform spacing, though every default grid
//! the CLI builds is a `linspace`. [`Grid2D`] is the tensor product of two
//! independent 1D grids, x varying fastest (`idx = i + nx * j`), matching the
//! column-major layout the solution matrix is serialized in.

use serde::{Deserialize, Serialize};

use crate::error::{PdeError, PdeResult};
use crate::scalar::Scalar;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid1D<T: Scalar> {
    coords: Vec<T>,
}

impl<T: Scalar> Grid1D<T> {
    pub fn new(coords: Vec<T>) -> PdeResult<Self> {
        if coords.len() < 3 {
            return Err(PdeError::DegenerateGrid { len: coords.len() });
        }
        for i in 1..coords.len() {
            if coords[i] <= coords[i - 1] {
                return Err(PdeError::NonMonotonicGrid { index: i });
            }
        }
        Ok(Self { coords })
    }

    /// A uniformly spaced grid of `n` points covering `[start, end]`.
    pub fn linspace(start: T, end: T, n: usize) -> PdeResult<Self> {
        if n < 3 {
            return Err(PdeError::DegenerateGrid { len: n });
        }
        let step = (end - start) / T::from_usize(n - 1).unwrap();
        let coords = (0..n).map(|i| start + step * T::from_usize(i).unwrap()).collect();
        Self::new(coords)
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn coords(&self) -> &[T] {
        &self.coords
    }

    pub fn get(&self, i: usize) -> T {
        self.coords[i]
    }

    /// Spacing to the left neighbor, `x[i] - x[i-1]`.
    pub fn h_minus(&self, i: usize) -> T {
        self.coords[i] - self.coords[i - 1]
    }

    /// Spacing to the right neighbor, `x[i+1] - x[i]`.
    pub fn h_plus(&self, i: usize) -> T {
        self.coords[i + 1] - self.coords[i]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid2D<T: Scalar> {
    pub x: Grid1D<T>,
    pub y: Grid1D<T>,
}

impl<T: Scalar> Grid2D<T> {
    pub fn new(x: Grid1D<T>, y: Grid1D<T>) -> Self {
        Self { x, y }
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    pub fn len(&self) -> usize {
        self.nx() * self.ny()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Flattens `(i, j)` (x-index, y-index) into the column-major flat index
    /// used by the solution vector, `i + nx * j`.
    pub fn flatten(&self, i: usize, j: usize) -> usize {
        i + self.nx() * j
    }
}
