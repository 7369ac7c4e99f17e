//! The matrix half of the dense linear-algebra capability (construct
//! zero matrix, write a row, dense matrix-matrix multiply, dense
//! matrix-vector multiply, in-place LU solve, ... identity fill").
//!
//! Matrices are stored column-major dense `DMatrix<T>`. The engine never
//! builds anything sparse: both the 1D operator and the 2D tensor-product
//! operator materialize as one dense `M x M` block.

use nalgebra::DMatrix;
use std::fmt::Debug;

use crate::error::{PdeError, PdeResult};
use crate::scalar::Scalar;
use crate::vector::Vector;

pub trait Matrix: Clone + Debug {
    type T: Scalar;
    type V: Vector<T = Self::T>;

    fn zeros(nrows: usize, ncols: usize) -> Self;
    fn identity(n: usize) -> Self;
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn get(&self, i: usize, j: usize) -> Self::T;
    fn set(&mut self, i: usize, j: usize, value: Self::T);

    /// Overwrites row `i` with `values` (`values.len() == self.ncols()`).
    fn write_row(&mut self, i: usize, values: &[Self::T]);

    /// Dense matrix-vector product: `y = alpha * self * x + beta * y`.
    fn gemv(&self, alpha: Self::T, x: &Self::V, beta: Self::T, y: &mut Self::V);

    /// Dense matrix-matrix product: `self * rhs`.
    fn matmul(&self, rhs: &Self) -> Self;

    /// `self + alpha * rhs`.
    fn add_scaled(&self, alpha: Self::T, rhs: &Self) -> Self;

    /// `alpha * self`.
    fn scale(&self, alpha: Self::T) -> Self;

    /// In-place LU solve of `self * x = rhs` for a single right-hand-side vector.
    fn lu_solve(&self, rhs: &Self::V) -> PdeResult<Self::V>;

    /// In-place LU solve of `self * X = rhs` for a matrix right-hand side,
    /// i.e. `self^-1 * rhs`. Used to build rational-function-of-L time
    /// discretizers such as Crank-Nicolson without materializing an explicit
    /// inverse.
    fn lu_solve_mat(&self, rhs: &Self) -> PdeResult<Self>;
}

impl<T: Scalar> Matrix for DMatrix<T> {
    type T = T;
    type V = nalgebra::DVector<T>;

    fn zeros(nrows: usize, ncols: usize) -> Self {
        DMatrix::zeros(nrows, ncols)
    }

    fn identity(n: usize) -> Self {
        DMatrix::identity(n, n)
    }

    fn nrows(&self) -> usize {
        self.nrows()
    }

    fn ncols(&self) -> usize {
        self.ncols()
    }

    fn get(&self, i: usize, j: usize) -> T {
        self[(i, j)]
    }

    fn set(&mut self, i: usize, j: usize, value: T) {
        self[(i, j)] = value;
    }

    fn write_row(&mut self, i: usize, values: &[T]) {
        assert_eq!(values.len(), self.ncols(), "row length must match column count");
        for (j, &value) in values.iter().enumerate() {
            self[(i, j)] = value;
        }
    }

    fn gemv(&self, alpha: T, x: &Self::V, beta: T, y: &mut Self::V) {
        y.gemv(alpha, self, x, beta);
    }

    fn matmul(&self, rhs: &Self) -> Self {
        self * rhs
    }

    fn add_scaled(&self, alpha: T, rhs: &Self) -> Self {
        self + rhs * alpha
    }

    fn scale(&self, alpha: T) -> Self {
        self * alpha
    }

    fn lu_solve(&self, rhs: &Self::V) -> PdeResult<Self::V> {
        self.clone().lu().solve(rhs).ok_or(PdeError::SingularMatrix)
    }

    fn lu_solve_mat(&self, rhs: &Self) -> PdeResult<Self> {
        self.clone().lu().solve(rhs).ok_or(PdeError::SingularMatrix)
    }
}
