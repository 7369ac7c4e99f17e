//! Boundary-condition records and the per-face validation the input bundle
//! performs at construction time.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PdeError, PdeResult};
use crate::scalar::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryConditionKind {
    Dirichlet,
    Neumann,
    Periodic,
}

impl FromStr for BoundaryConditionKind {
    type Err = PdeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "Dirichlet" => Ok(BoundaryConditionKind::Dirichlet),
            "Neumann" => Ok(BoundaryConditionKind::Neumann),
            "Periodic" => Ok(BoundaryConditionKind::Periodic),
            other => Err(PdeError::UnknownEnumValue {
                kind: "BoundaryConditionType",
                value: other.to_string(),
            }),
        }
    }
}

/// A single face's boundary condition: its kind plus the associated value
/// (the Dirichlet target, the Neumann outward-derivative value, or an unused
/// `0` for `Periodic`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition<T: Scalar> {
    pub kind: BoundaryConditionKind,
    pub value: T,
}

impl<T: Scalar> BoundaryCondition<T> {
    pub fn dirichlet(value: T) -> Self {
        Self { kind: BoundaryConditionKind::Dirichlet, value }
    }

    pub fn neumann(value: T) -> Self {
        Self { kind: BoundaryConditionKind::Neumann, value }
    }

    pub fn periodic() -> Self {
        Self { kind: BoundaryConditionKind::Periodic, value: T::zero() }
    }

    pub fn is_periodic(&self) -> bool {
        self.kind == BoundaryConditionKind::Periodic
    }
}

/// Periodic on one face requires Periodic on the opposing face with an
/// equal value ("Periodic on one face -> Periodic on the opposite face
/// with equal v"). `BoundaryCondition::periodic()` always sets `value` to
/// zero, so the two constructors in this module never trip the value
/// check themselves; it exists for embedders who build a `BoundaryCondition`
/// directly from its public fields.
fn check_periodic_pair<T: Scalar>(a: &BoundaryCondition<T>, b: &BoundaryCondition<T>) -> PdeResult<()> {
    match (a.is_periodic(), b.is_periodic()) {
        (true, true) => {
            if a.value == b.value {
                Ok(())
            } else {
                Err(PdeError::PeriodicValueMismatch { left: format!("{}", a.value), right: format!("{}", b.value) })
            }
        }
        (false, false) => Ok(()),
        _ => Err(PdeError::PeriodicFaceMismatch),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConditions1D<T: Scalar> {
    pub left: BoundaryCondition<T>,
    pub right: BoundaryCondition<T>,
}

impl<T: Scalar> BoundaryConditions1D<T> {
    pub fn new(left: BoundaryCondition<T>, right: BoundaryCondition<T>) -> PdeResult<Self> {
        check_periodic_pair(&left, &right)?;
        Ok(Self { left, right })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryConditions2D<T: Scalar> {
    pub left: BoundaryCondition<T>,
    pub right: BoundaryCondition<T>,
    pub down: BoundaryCondition<T>,
    pub up: BoundaryCondition<T>,
}

impl<T: Scalar> BoundaryConditions2D<T> {
    pub fn new(
        left: BoundaryCondition<T>,
        right: BoundaryCondition<T>,
        down: BoundaryCondition<T>,
        up: BoundaryCondition<T>,
    ) -> PdeResult<Self> {
        check_periodic_pair(&left, &right)?;
        check_periodic_pair(&down, &up)?;
        Ok(Self { left, right, down, up })
    }

    pub fn x(&self) -> BoundaryConditions1D<T> {
        BoundaryConditions1D { left: self.left, right: self.right }
    }

    pub fn y(&self) -> BoundaryConditions1D<T> {
        BoundaryConditions1D { left: self.down, right: self.up }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periodic_on_one_face_requires_periodic_on_the_other() {
        let periodic = BoundaryCondition::<f64>::periodic();
        let dirichlet = BoundaryCondition::dirichlet(1.0);
        assert!(matches!(
            BoundaryConditions1D::new(periodic, dirichlet),
            Err(PdeError::PeriodicFaceMismatch)
        ));
    }

    #[test]
    fn matching_periodic_pair_is_accepted() {
        let periodic = BoundaryCondition::<f64>::periodic();
        assert!(BoundaryConditions1D::new(periodic, periodic).is_ok());
    }

    #[test]
    fn periodic_pair_with_mismatched_values_is_rejected() {
        // Bypasses the `periodic()` constructor (which always zeroes
        // `value`) to exercise the case an embedder building from public
        // fields could hit.
        let left = BoundaryCondition { kind: BoundaryConditionKind::Periodic, value: 1.0 };
        let right = BoundaryCondition { kind: BoundaryConditionKind::Periodic, value: 2.0 };
        assert!(matches!(
            BoundaryConditions1D::new(left, right),
            Err(PdeError::PeriodicValueMismatch { .. })
        ));
    }

    #[test]
    fn non_periodic_faces_are_independent() {
        let left = BoundaryCondition::dirichlet(1.0);
        let right = BoundaryCondition::neumann(-2.0);
        assert!(BoundaryConditions1D::new(left, right).is_ok());
    }
}
