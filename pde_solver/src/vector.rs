//! The vector half of the dense linear-algebra capability the engine
//! consumes (vector axpy, vector copy). `DVector<T>` is
//! the only backing implementation; the trait exists so the solver code
//! never names `nalgebra` directly, keeping the concrete backend swappable
//! behind a capability boundary.

use nalgebra::DVector;
use std::fmt::Debug;

use crate::scalar::Scalar;

pub trait Vector: Clone + Debug + PartialEq {
    type T: Scalar;

    fn zeros(n: usize) -> Self;
    fn from_slice(data: &[Self::T]) -> Self;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn get(&self, i: usize) -> Self::T;
    fn set(&mut self, i: usize, value: Self::T);
    fn as_slice(&self) -> &[Self::T];

    /// `self <- alpha * x + beta * self`
    fn axpy(&mut self, alpha: Self::T, x: &Self, beta: Self::T);

    /// `self <- other` (element-wise copy, no reallocation when lengths match).
    fn copy_from(&mut self, other: &Self);

    /// `alpha * self`.
    fn scale(&self, alpha: Self::T) -> Self;

    /// Infinity norm, used for the constant-preservation and fault-detection
    /// checks.
    fn norm_inf(&self) -> Self::T;

    /// `true` iff every entry is finite (no NaN/Inf).
    fn all_finite(&self) -> bool;
}

impl<T: Scalar> Vector for DVector<T> {
    type T = T;

    fn zeros(n: usize) -> Self {
        DVector::zeros(n)
    }

    fn from_slice(data: &[T]) -> Self {
        DVector::from_row_slice(data)
    }

    fn len(&self) -> usize {
        self.nrows()
    }

    fn get(&self, i: usize) -> T {
        self[i]
    }

    fn set(&mut self, i: usize, value: T) {
        self[i] = value;
    }

    fn as_slice(&self) -> &[T] {
        self.as_slice()
    }

    fn axpy(&mut self, alpha: T, x: &Self, beta: T) {
        self.axpy(alpha, x, beta);
    }

    fn copy_from(&mut self, other: &Self) {
        self.copy_from(other);
    }

    fn scale(&self, alpha: T) -> Self {
        self * alpha
    }

    fn norm_inf(&self) -> T {
        self.iter().fold(T::zero(), |acc, &v| acc.max(v.abs()))
    }

    fn all_finite(&self) -> bool {
        self.iter().all(|v| v.is_finite())
    }
}
