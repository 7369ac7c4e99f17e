//! The finite-difference solver: owns the rolling history buffer, drives the
//! per-step matrix-vector application, and exposes `advance(n)` plus a
//! read-only view of the current solution.
//!
//! Generic over any [`crate::equations::Equation`], so the same state
//! machine and micro-step loop serve advection-diffusion and the wave
//! equation identically; only the spatial operator and state layout differ
//! between the two (no runtime dispatch is required).
//!
//! Also generic over a [`MemorySpace`] marker (defaulting to [`Host`]): the
//! compile-time memory-space parameter the design threads through every
//! entity is carried here as a zero-sized `PhantomData` field, since this is
//! the entity the data model fixes it to (`MemorySpace` row, "fixed for a
//! solver instance"). It resolves to the same host computation for both
//! markers (no accelerator back end is wired in), but the type-level
//! distinction is preserved for embedders that want it to show up in their
//! own signatures.

use std::marker::PhantomData;

use crate::equations::Equation;
use crate::error::{PdeError, PdeResult};
use crate::matrix::Matrix;
use crate::memory::{Host, MemorySpace};
use crate::time::{self, TimeOperator};
use crate::vector::Vector;

/// The solver's lifecycle state. `Uninitialized` never appears as a
/// live value here: construction either succeeds straight into `Ready` or
/// fails outright, since Rust's `Result`-returning `new` makes a half-built
/// solver unrepresentable. `Advancing` is likewise never observable from
/// outside a single `advance` call (the engine is synchronous); it is
/// kept as an explicit variant because the design calls it out as a
/// first-class state, not because any caller can catch it mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    Ready,
    Advancing,
    Faulted,
}

/// Rolling buffer of the last `k` states, most recent first, rotated in
/// place each micro-step.
struct SolutionBuffer<M: Matrix> {
    states: Vec<M::V>,
}

impl<M: Matrix> SolutionBuffer<M> {
    fn new(initial: M::V, k: usize) -> Self {
        Self { states: vec![initial; k] }
    }

    fn latest(&self) -> &M::V {
        &self.states[0]
    }

    /// Rotates in `next` as the new column 0, shifting every other column
    /// one slot to the right and dropping the oldest.
    fn rotate_in(&mut self, next: M::V) {
        for i in (1..self.states.len()).rev() {
            self.states[i].copy_from(&self.states[i - 1]);
        }
        self.states[0] = next;
    }
}

/// The generic finite-difference solver. `E` supplies the
/// equation-specific spatial operator and state layout; everything else
/// (the advance tensor, the history buffer, the state machine) is shared.
/// `MS` is the compile-time memory space the solver is instantiated for;
/// it defaults to [`Host`], the only space with a real backing
/// implementation here.
pub struct FiniteDifferenceSolver<M: Matrix, E: Equation<M>, MS: MemorySpace = Host> {
    equation: E,
    time_op: TimeOperator<M>,
    buffer: SolutionBuffer<M>,
    state: SolverState,
    step: usize,
    scratch: M::V,
    _memory_space: PhantomData<MS>,
}

impl<M: Matrix, E: Equation<M>, MS: MemorySpace> FiniteDifferenceSolver<M, E, MS> {
    /// Builds `L`, builds `T`, and seeds the history buffer with `k` copies
    /// of the initial state (for k >= 2, earlier history is
    /// approximated by U0"). Equation-level validation (e.g. the
    /// wave-equation scheme check) happens in the equation's own
    /// constructor; the only failure possible here is the time
    /// discretizer's matrix inversion hitting a singular denominator for a
    /// pathological `(dt, L)` pair, reported as
    /// [`crate::error::PdeError::SingularMatrix`].
    pub fn new(equation: E) -> PdeResult<Self> {
        let spatial_op = equation.build_spatial_operator();
        let n = spatial_op.l.nrows();
        let time_op = time::build::<M>(&spatial_op, equation.dt(), equation.solver_type())?;
        let k = time_op.t.len();
        let initial = equation.initial_state();
        debug_assert_eq!(initial.len(), n, "equation's initial state must match its spatial operator's dimension");
        let scratch = M::V::zeros(initial.len());
        let buffer = SolutionBuffer::new(initial, k);
        Ok(Self { equation, time_op, buffer, state: SolverState::Ready, step: 0, scratch, _memory_space: PhantomData })
    }

    /// The compile-time memory space this solver instance is bound to
    /// (`"Host"` or `"Device"`).
    pub fn memory_space(&self) -> &'static str {
        MS::NAME
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    /// The number of micro-steps successfully completed so far.
    pub fn step_count(&self) -> usize {
        self.step
    }

    /// Returns the current solution (the physically meaningful projection
    /// of the internal state, e.g. just `u` for the wave equation). Legal in
    /// `Ready` and `Faulted`.
    pub fn solution(&self) -> M::V {
        self.equation.extract_solution(self.buffer.latest())
    }

    /// Performs `n` micro-steps. Returns as soon as a step produces a
    /// non-finite value, leaving the solver `Faulted` and every
    /// already-completed step's result intact in the history buffer
    /// (the partial snapshot sequence already written is retained).
    pub fn advance(&mut self, n: usize) -> PdeResult<()> {
        if self.state == SolverState::Faulted {
            return Err(PdeError::NonFinite { step: self.step });
        }
        self.state = SolverState::Advancing;
        for _ in 0..n {
            if let Err(e) = self.micro_step() {
                self.state = SolverState::Faulted;
                return Err(e);
            }
            self.step += 1;
        }
        self.state = SolverState::Ready;
        Ok(())
    }

    fn micro_step(&mut self) -> PdeResult<()> {
        self.scratch.copy_from(&self.time_op.c);
        for (t_k, s_k) in self.time_op.t.iter().zip(self.buffer.states.iter()) {
            t_k.gemv(M::T::one(), s_k, M::T::one(), &mut self.scratch);
        }
        if !self.scratch.all_finite() {
            return Err(PdeError::NonFinite { step: self.step });
        }
        let next = self.scratch.clone();
        self.buffer.rotate_in(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BoundaryCondition, BoundaryConditions1D, BoundaryConditions2D};
    use crate::enums::{SolverType, SpaceDiscretizerType};
    use crate::equations::{AdvectionDiffusion1D, AdvectionDiffusion2D, WaveEquation1D};
    use crate::grid::{Grid1D, Grid2D};
    use crate::input::{PdeInputData1D, PdeInputData2D};
    use crate::memory::Device;
    use approx::assert_abs_diff_eq;
    use nalgebra::{DMatrix, DVector};

    type M = DMatrix<f64>;

    #[test]
    fn memory_space_defaults_to_host_but_device_is_selectable() {
        let grid = Grid1D::linspace(0.0, 1.0, 5).unwrap();
        let ic = DVector::from_element(5, 1.0);
        let bc = BoundaryConditions1D { left: BoundaryCondition::neumann(0.0), right: BoundaryCondition::neumann(0.0) };
        let input =
            PdeInputData1D::new(ic, grid, 0.0, 0.0, 1e-3, SolverType::ExplicitEuler, SpaceDiscretizerType::Centered, bc)
                .unwrap();
        let host_solver = FiniteDifferenceSolver::<M, _>::new(AdvectionDiffusion1D::new(&input)).unwrap();
        assert_eq!(host_solver.memory_space(), "Host");

        let device_solver =
            FiniteDifferenceSolver::<M, _, Device>::new(AdvectionDiffusion1D::new(&input)).unwrap();
        assert_eq!(device_solver.memory_space(), "Device");
    }

    #[test]
    fn constant_preservation_dirichlet() {
        let grid = Grid1D::linspace(0.0, 1.0, 9).unwrap();
        let ic = DVector::from_element(9, 2.0);
        let bc = BoundaryConditions1D {
            left: BoundaryCondition::dirichlet(2.0),
            right: BoundaryCondition::dirichlet(2.0),
        };
        let input =
            PdeInputData1D::new(ic, grid, 0.3, 0.05, 1e-3, SolverType::CrankNicolson, SpaceDiscretizerType::Centered, bc)
                .unwrap();
        let mut solver = FiniteDifferenceSolver::<M, _>::new(AdvectionDiffusion1D::new(&input)).unwrap();
        solver.advance(200).unwrap();
        assert_eq!(solver.state(), SolverState::Ready);
        for &v in solver.solution().as_slice() {
            assert_abs_diff_eq!(v, 2.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn constant_preservation_periodic_explicit() {
        let grid = Grid1D::linspace(0.0, 1.0, 16).unwrap();
        let ic = DVector::from_element(16, 1.0);
        let bc = BoundaryConditions1D { left: BoundaryCondition::periodic(), right: BoundaryCondition::periodic() };
        let input =
            PdeInputData1D::new(ic, grid, 0.7, 0.0, 1e-3, SolverType::ExplicitEuler, SpaceDiscretizerType::Upwind, bc)
                .unwrap();
        let mut solver = FiniteDifferenceSolver::<M, _>::new(AdvectionDiffusion1D::new(&input)).unwrap();
        solver.advance(50).unwrap();
        for &v in solver.solution().as_slice() {
            assert_abs_diff_eq!(v, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn dirichlet_pinned_through_advance() {
        let grid = Grid1D::linspace(0.0, 1.0, 11).unwrap();
        let ic = DVector::from_fn(11, |i, _| (std::f64::consts::PI * grid.get(i)).sin());
        let bc = BoundaryConditions1D {
            left: BoundaryCondition::dirichlet(5.0),
            right: BoundaryCondition::dirichlet(-3.0),
        };
        let input =
            PdeInputData1D::new(ic, grid, 0.0, 0.5, 1e-4, SolverType::ImplicitEuler, SpaceDiscretizerType::Centered, bc)
                .unwrap();
        let mut solver = FiniteDifferenceSolver::<M, _>::new(AdvectionDiffusion1D::new(&input)).unwrap();
        solver.advance(30).unwrap();
        let sol = solver.solution();
        assert_abs_diff_eq!(sol.get(0), 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.get(10), -3.0, epsilon = 1e-9);
    }

    #[test]
    fn constant_preservation_2d() {
        // S3: zero velocity, zero diffusion, both ExplicitEuler and
        // ImplicitEuler, up to 90 steps.
        for &solver_type in &[SolverType::ExplicitEuler, SolverType::ImplicitEuler] {
            let gx = Grid1D::linspace(0.0, 1.0, 10).unwrap();
            let gy = Grid1D::linspace(0.0, 1.0, 8).unwrap();
            let grid = Grid2D::new(gx, gy);
            let ic = DVector::from_element(80, 1.0);
            let zero_bc = BoundaryCondition::neumann(0.0);
            let bc = BoundaryConditions2D { left: zero_bc, right: zero_bc, down: zero_bc, up: zero_bc };
            let input = PdeInputData2D::new(ic, grid, 0.0, 0.0, 0.0, 1e-5, solver_type, SpaceDiscretizerType::Centered, bc)
                .unwrap();
            let mut solver = FiniteDifferenceSolver::<M, _>::new(AdvectionDiffusion2D::new(&input)).unwrap();
            solver.advance(90).unwrap();
            for &v in solver.solution().as_slice() {
                assert_abs_diff_eq!(v, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn affine_field_2d_neumann_matched_is_invariant() {
        // S4: U0(x,y) = 2x + 3y on [0,1]^2, Neumann BCs left=3/right=-3/
        // down=-2/up=2, zero diffusion, Explicit/Implicit Euler, 9 steps:
        // interior nodes unchanged to 5e-12.
        for &solver_type in &[SolverType::ExplicitEuler, SolverType::ImplicitEuler] {
            let gx = Grid1D::linspace(0.0, 1.0, 9).unwrap();
            let gy = Grid1D::linspace(0.0, 1.0, 9).unwrap();
            let (nx, ny) = (gx.len(), gy.len());
            let grid = Grid2D::new(gx.clone(), gy.clone());
            let ic = DVector::from_fn(nx * ny, |k, _| {
                let i = k % nx;
                let j = k / nx;
                2.0 * gx.get(i) + 3.0 * gy.get(j)
            });
            let bc = BoundaryConditions2D {
                left: BoundaryCondition::neumann(3.0),
                right: BoundaryCondition::neumann(-3.0),
                down: BoundaryCondition::neumann(-2.0),
                up: BoundaryCondition::neumann(2.0),
            };
            let input =
                PdeInputData2D::new(ic.clone(), grid, 0.0, 0.0, 0.0, 1e-3, solver_type, SpaceDiscretizerType::Centered, bc)
                    .unwrap();
            let mut solver = FiniteDifferenceSolver::<M, _>::new(AdvectionDiffusion2D::new(&input)).unwrap();
            solver.advance(9).unwrap();
            let sol = solver.solution();
            for j in 1..ny - 1 {
                for i in 1..nx - 1 {
                    let idx = i + nx * j;
                    assert_abs_diff_eq!(sol.get(idx), ic.get(idx), epsilon = 5e-12);
                }
            }
        }
    }

    #[test]
    fn wave_equation_standing_wave_reflects_sign() {
        let n = 65;
        let grid = Grid1D::linspace(0.0, 1.0, n).unwrap();
        let ic = DVector::from_fn(n, |i, _| (std::f64::consts::PI * grid.get(i)).sin());
        let bc =
            BoundaryConditions1D { left: BoundaryCondition::dirichlet(0.0), right: BoundaryCondition::dirichlet(0.0) };
        let dt = 1e-4;
        let input = PdeInputData1D::new(ic, grid, 0.0, 1.0, dt, SolverType::ExplicitEuler, SpaceDiscretizerType::Centered, bc)
            .unwrap();
        let equation = WaveEquation1D::new(&input).unwrap();
        let mut solver = FiniteDifferenceSolver::<M, _>::new(equation).unwrap();
        let n_steps = (1.0 / dt) as usize;
        solver.advance(n_steps).unwrap();
        assert_eq!(solver.state(), SolverState::Ready);
        let sol = solver.solution();
        for i in 1..n - 1 {
            let x = grid_coord(i, n);
            let expected = (std::f64::consts::PI).cos() * (std::f64::consts::PI * x).sin();
            assert_abs_diff_eq!(sol.get(i), expected, epsilon = 5e-3);
        }
    }

    fn grid_coord(i: usize, n: usize) -> f64 {
        i as f64 / (n - 1) as f64
    }

    #[test]
    fn faulted_state_is_sticky() {
        let grid = Grid1D::linspace(0.0, 1.0, 5).unwrap();
        let ic = DVector::from_element(5, 1.0);
        let bc = BoundaryConditions1D { left: BoundaryCondition::neumann(0.0), right: BoundaryCondition::neumann(0.0) };
        // A wildly unstable explicit step (huge dt) drives the solution to
        // overflow within a handful of iterations.
        let input =
            PdeInputData1D::new(ic, grid, 1.0e6, 0.0, 1.0e6, SolverType::ExplicitEuler, SpaceDiscretizerType::Centered, bc)
                .unwrap();
        let mut solver = FiniteDifferenceSolver::<M, _>::new(AdvectionDiffusion1D::new(&input)).unwrap();
        let result = solver.advance(10_000);
        assert!(result.is_err());
        assert_eq!(solver.state(), SolverState::Faulted);
        assert!(solver.advance(1).is_err());
    }
}
