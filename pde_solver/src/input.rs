//! The immutable PDE input bundle: everything a solver needs to build `L`
//! and `T` once, borrowed for the solver's lifetime thereafter.

use log::warn;

use crate::boundary::BoundaryConditions1D;
use crate::boundary::BoundaryConditions2D;
use crate::enums::{SolverType, SpaceDiscretizerType};
use crate::error::{PdeError, PdeResult};
use crate::grid::{Grid1D, Grid2D};
use crate::matrix::Matrix;
use crate::vector::Vector;

/// Lax-Wendroff is only consistent with ExplicitEuler; any other integrator
/// is coerced to ExplicitEuler with a warning, never treated as an error
/// (compatibility fix-ups, not errors).
fn coerce_lax_wendroff(solver_type: SolverType, space_type: SpaceDiscretizerType) -> SolverType {
    if space_type == SpaceDiscretizerType::LaxWendroff && solver_type != SolverType::ExplicitEuler {
        warn!(
            "Lax-Wendroff scheme can be applied only with ExplicitEuler -> overriding solver type (was {:?})",
            solver_type
        );
        SolverType::ExplicitEuler
    } else {
        solver_type
    }
}

#[derive(Debug, Clone)]
pub struct PdeInputData1D<M: Matrix> {
    pub initial_condition: M::V,
    pub grid: Grid1D<M::T>,
    pub velocity: M::T,
    pub diffusion: M::T,
    pub dt: M::T,
    pub solver_type: SolverType,
    pub space_discretizer_type: SpaceDiscretizerType,
    pub boundary_conditions: BoundaryConditions1D<M::T>,
}

impl<M: Matrix> PdeInputData1D<M> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initial_condition: M::V,
        grid: Grid1D<M::T>,
        velocity: M::T,
        diffusion: M::T,
        dt: M::T,
        solver_type: SolverType,
        space_discretizer_type: SpaceDiscretizerType,
        boundary_conditions: BoundaryConditions1D<M::T>,
    ) -> PdeResult<Self> {
        if initial_condition.len() != grid.len() {
            return Err(PdeError::ShapeMismatch { expected: grid.len(), actual: initial_condition.len() });
        }
        let solver_type = coerce_lax_wendroff(solver_type, space_discretizer_type);
        Ok(Self {
            initial_condition,
            grid,
            velocity,
            diffusion,
            dt,
            solver_type,
            space_discretizer_type,
            boundary_conditions,
        })
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }
}

#[derive(Debug, Clone)]
pub struct PdeInputData2D<M: Matrix> {
    pub initial_condition: M::V,
    pub grid: Grid2D<M::T>,
    pub x_velocity: M::T,
    pub y_velocity: M::T,
    pub diffusion: M::T,
    pub dt: M::T,
    pub solver_type: SolverType,
    pub space_discretizer_type: SpaceDiscretizerType,
    pub boundary_conditions: BoundaryConditions2D<M::T>,
}

impl<M: Matrix> PdeInputData2D<M> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        initial_condition: M::V,
        grid: Grid2D<M::T>,
        x_velocity: M::T,
        y_velocity: M::T,
        diffusion: M::T,
        dt: M::T,
        solver_type: SolverType,
        space_discretizer_type: SpaceDiscretizerType,
        boundary_conditions: BoundaryConditions2D<M::T>,
    ) -> PdeResult<Self> {
        if initial_condition.len() != grid.len() {
            return Err(PdeError::ShapeMismatch { expected: grid.len(), actual: initial_condition.len() });
        }
        let solver_type = coerce_lax_wendroff(solver_type, space_discretizer_type);
        Ok(Self {
            initial_condition,
            grid,
            x_velocity,
            y_velocity,
            diffusion,
            dt,
            solver_type,
            space_discretizer_type,
            boundary_conditions,
        })
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryCondition;
    use crate::grid::Grid1D;
    use crate::spatial;
    use crate::time;
    use nalgebra::DMatrix;
    use nalgebra::DVector;

    type M = DMatrix<f64>;

    fn sample_bc() -> BoundaryConditions1D<f64> {
        BoundaryConditions1D { left: BoundaryCondition::dirichlet(0.0), right: BoundaryCondition::dirichlet(0.0) }
    }

    #[test]
    fn lax_wendroff_with_non_explicit_euler_is_coerced() {
        let grid = Grid1D::linspace(0.0, 1.0, 9).unwrap();
        let ic = DVector::from_element(9, 1.0);
        let input = PdeInputData1D::<M>::new(
            ic,
            grid,
            0.5,
            0.1,
            1e-3,
            SolverType::CrankNicolson,
            SpaceDiscretizerType::LaxWendroff,
            sample_bc(),
        )
        .unwrap();
        assert_eq!(input.solver_type, SolverType::ExplicitEuler);
    }

    #[test]
    fn explicit_euler_with_lax_wendroff_is_left_alone() {
        let grid = Grid1D::linspace(0.0, 1.0, 9).unwrap();
        let ic = DVector::from_element(9, 1.0);
        let input = PdeInputData1D::<M>::new(
            ic,
            grid,
            0.5,
            0.1,
            1e-3,
            SolverType::ExplicitEuler,
            SpaceDiscretizerType::LaxWendroff,
            sample_bc(),
        )
        .unwrap();
        assert_eq!(input.solver_type, SolverType::ExplicitEuler);
    }

    /// S6: requesting CrankNicolson with Lax-Wendroff produces results
    /// bit-identical to ExplicitEuler+LaxWendroff with the same parameters.
    #[test]
    fn coerced_lax_wendroff_matches_explicit_euler_bit_for_bit() {
        let grid = Grid1D::linspace(0.0, 1.0, 9).unwrap();
        let ic = DVector::from_element(9, 1.0);

        let coerced = PdeInputData1D::<M>::new(
            ic.clone(),
            grid.clone(),
            0.5,
            0.1,
            1e-3,
            SolverType::CrankNicolson,
            SpaceDiscretizerType::LaxWendroff,
            sample_bc(),
        )
        .unwrap();
        let direct = PdeInputData1D::<M>::new(
            ic,
            grid,
            0.5,
            0.1,
            1e-3,
            SolverType::ExplicitEuler,
            SpaceDiscretizerType::LaxWendroff,
            sample_bc(),
        )
        .unwrap();

        let coerced_op = spatial::build_1d::<M>(
            &coerced.grid,
            coerced.velocity,
            coerced.diffusion,
            coerced.dt,
            coerced.space_discretizer_type,
            &coerced.boundary_conditions,
        );
        let direct_op = spatial::build_1d::<M>(
            &direct.grid,
            direct.velocity,
            direct.diffusion,
            direct.dt,
            direct.space_discretizer_type,
            &direct.boundary_conditions,
        );
        let coerced_time = time::build::<M>(&coerced_op, coerced.dt, coerced.solver_type).unwrap();
        let direct_time = time::build::<M>(&direct_op, direct.dt, direct.solver_type).unwrap();

        assert_eq!(coerced_time.t[0], direct_time.t[0]);
        assert_eq!(coerced_time.c, direct_time.c);
    }
}
