//! PDE specializations plugged into the generic [`crate::solver::FiniteDifferenceSolver`].
//!
//! Each specialization supplies exactly two things, mirroring the CRTP leaf
//! classes of the original hierarchy: a rule for building the spatial
//! operator (`build_spatial_operator`) and the length/shape of the state the
//! solver advances (`initial_state`, `extract_solution`). Advection-diffusion
//! is first-order in time and advances the physical solution directly.
//! The wave equation is second-order in time; it is reduced to a coupled
//! first-order system on `(u, du/dt)` and advances a state vector twice the
//! physical solution's length, exposing only the `u` half through
//! `extract_solution`.

use crate::enums::SolverType;
use crate::error::{PdeError, PdeResult};
use crate::input::{PdeInputData1D, PdeInputData2D};
use crate::matrix::Matrix;
use crate::spatial::{self, SpatialOperator};
use crate::vector::Vector;

/// The two builder operations a PDE specialization contributes to the
/// generic solver: the spatial operator (and its inhomogeneous term) and the
/// initial history state. The solver calls these once, at construction.
pub trait Equation<M: Matrix> {
    fn solver_type(&self) -> SolverType;

    /// The time step the spatial operator was (and the time discretizer
    /// must be) built against.
    fn dt(&self) -> M::T;

    fn build_spatial_operator(&self) -> SpatialOperator<M>;

    /// The state the solution buffer is seeded with; its length is the
    /// spatial operator's dimension (`n` for advection-diffusion, `2n` for
    /// the wave equation).
    fn initial_state(&self) -> M::V;

    /// Projects a full state vector down to the physically meaningful
    /// solution the caller reads back (identity for advection-diffusion,
    /// the first half for the wave equation).
    fn extract_solution(&self, state: &M::V) -> M::V;
}

/// `du/dt = -v.grad(u) + D.laplacian(u)`, one past state.
pub struct AdvectionDiffusion1D<'a, M: Matrix> {
    pub input: &'a PdeInputData1D<M>,
}

impl<'a, M: Matrix> AdvectionDiffusion1D<'a, M> {
    pub fn new(input: &'a PdeInputData1D<M>) -> Self {
        Self { input }
    }
}

impl<'a, M: Matrix> Equation<M> for AdvectionDiffusion1D<'a, M> {
    fn solver_type(&self) -> SolverType {
        self.input.solver_type
    }

    fn dt(&self) -> M::T {
        self.input.dt
    }

    fn build_spatial_operator(&self) -> SpatialOperator<M> {
        spatial::build_1d::<M>(
            &self.input.grid,
            self.input.velocity,
            self.input.diffusion,
            self.input.dt,
            self.input.space_discretizer_type,
            &self.input.boundary_conditions,
        )
    }

    fn initial_state(&self) -> M::V {
        self.input.initial_condition.clone()
    }

    fn extract_solution(&self, state: &M::V) -> M::V {
        state.clone()
    }
}

/// `du/dt = -(vx.d/dx + vy.d/dy)u + D.laplacian(u)`, one past state.
pub struct AdvectionDiffusion2D<'a, M: Matrix> {
    pub input: &'a PdeInputData2D<M>,
}

impl<'a, M: Matrix> AdvectionDiffusion2D<'a, M> {
    pub fn new(input: &'a PdeInputData2D<M>) -> Self {
        Self { input }
    }
}

impl<'a, M: Matrix> Equation<M> for AdvectionDiffusion2D<'a, M> {
    fn solver_type(&self) -> SolverType {
        self.input.solver_type
    }

    fn dt(&self) -> M::T {
        self.input.dt
    }

    fn build_spatial_operator(&self) -> SpatialOperator<M> {
        spatial::build_2d::<M>(
            &self.input.grid,
            self.input.x_velocity,
            self.input.y_velocity,
            self.input.diffusion,
            self.input.dt,
            self.input.space_discretizer_type,
            &self.input.boundary_conditions,
        )
    }

    fn initial_state(&self) -> M::V {
        self.input.initial_condition.clone()
    }

    fn extract_solution(&self, state: &M::V) -> M::V {
        state.clone()
    }
}

/// Stacks `(u, w)` with `w` approximating `du/dt` into one `2n`-length state
/// vector, seeding `w` at zero (standing-wave initial conditions start from
/// rest).
fn stack_state<M: Matrix>(u0: &M::V) -> M::V {
    let n = u0.len();
    let mut state = M::V::zeros(2 * n);
    for i in 0..n {
        state.set(i, u0.get(i));
    }
    state
}

fn first_half<M: Matrix>(state: &M::V) -> M::V {
    let n = state.len() / 2;
    let mut out = M::V::zeros(n);
    for i in 0..n {
        out.set(i, state.get(i));
    }
    out
}

/// Assembles the `2n x 2n` block operator `[[0, I], [c^2.Laplacian, -v.grad]]`
/// from two already-built `n x n` pieces: `wave_op` (the `c^2.laplacian(u)`
/// piece, diffusion-only) and `advect_op` (the `-v.grad(w)` piece,
/// velocity-only). Both pieces already carry correct boundary rows for
/// their own physics; this just places them in the right quadrant and
/// pins `u` (from `wave_op`'s own Dirichlet list) together with the matching
/// `w` degree of freedom at zero, since a stationary Dirichlet boundary on
/// `u` has zero velocity.
fn build_wave_block<M: Matrix>(wave_op: SpatialOperator<M>, advect_op: SpatialOperator<M>) -> SpatialOperator<M> {
    let n = wave_op.l.nrows();
    let m = 2 * n;
    let mut l = M::zeros(m, m);
    let mut b = M::V::zeros(m);

    let dirichlet_rows: Vec<bool> = {
        let mut mask = vec![false; n];
        for &(i, _) in &wave_op.dirichlet_dofs {
            mask[i] = true;
        }
        mask
    };

    for i in 0..n {
        let mut top = vec![M::T::zero(); m];
        if dirichlet_rows[i] {
            top[i] = M::T::one();
        } else {
            top[n + i] = M::T::one();
        }
        l.write_row(i, &top);
        b.set(i, if dirichlet_rows[i] { wave_op.b.get(i) } else { M::T::zero() });

        let mut bottom = vec![M::T::zero(); m];
        for j in 0..n {
            bottom[j] = wave_op.l.get(i, j);
        }
        for j in 0..n {
            bottom[n + j] = advect_op.l.get(i, j);
        }
        l.write_row(n + i, &bottom);
        b.set(n + i, wave_op.b.get(i) + advect_op.b.get(i));
    }

    let mut dirichlet_dofs = Vec::new();
    for &(i, value) in &wave_op.dirichlet_dofs {
        dirichlet_dofs.push((i, value));
        dirichlet_dofs.push((n + i, M::T::zero()));
    }

    SpatialOperator { l, b, dirichlet_dofs }
}

/// Validates that `solver_type` is one of the two schemes the wave-equation
/// reduction supports (only ExplicitEuler and ImplicitEuler are
/// supported for the wave equation; other choices are an input error").
fn check_wave_scheme(solver_type: SolverType) -> PdeResult<()> {
    if solver_type.supports_wave_equation() {
        Ok(())
    } else {
        Err(PdeError::UnsupportedWaveScheme { scheme: format!("{solver_type:?}") })
    }
}

/// `d2u/dt2 = c^2.laplacian(u) - v.grad(du/dt)`, reduced to a first-order
/// system on `(u, du/dt)`; two past states in the stacked `2n`-length state.
pub struct WaveEquation1D<'a, M: Matrix> {
    pub input: &'a PdeInputData1D<M>,
}

impl<'a, M: Matrix> WaveEquation1D<'a, M> {
    /// `input.diffusion` is interpreted as the wave speed `c` for this
    /// specialization, since the wave equation reuses the same input bundle
    /// shape as advection-diffusion. `input.velocity` is the advective term
    /// `v` damping the wave's first time-derivative.
    pub fn new(input: &'a PdeInputData1D<M>) -> PdeResult<Self> {
        check_wave_scheme(input.solver_type)?;
        Ok(Self { input })
    }
}

impl<'a, M: Matrix> Equation<M> for WaveEquation1D<'a, M> {
    fn solver_type(&self) -> SolverType {
        self.input.solver_type
    }

    fn dt(&self) -> M::T {
        self.input.dt
    }

    fn build_spatial_operator(&self) -> SpatialOperator<M> {
        let c = self.input.diffusion;
        let wave_op = spatial::build_1d::<M>(
            &self.input.grid,
            M::T::zero(),
            c * c,
            self.input.dt,
            self.input.space_discretizer_type,
            &self.input.boundary_conditions,
        );
        let advect_op = spatial::build_1d::<M>(
            &self.input.grid,
            self.input.velocity,
            M::T::zero(),
            self.input.dt,
            self.input.space_discretizer_type,
            &self.input.boundary_conditions,
        );
        build_wave_block::<M>(wave_op, advect_op)
    }

    fn initial_state(&self) -> M::V {
        stack_state::<M>(&self.input.initial_condition)
    }

    fn extract_solution(&self, state: &M::V) -> M::V {
        first_half::<M>(state)
    }
}

/// 2D counterpart of [`WaveEquation1D`], built from the tensor-product
/// Laplacian and advection operators the same way [`AdvectionDiffusion2D`]
/// builds its single operator.
pub struct WaveEquation2D<'a, M: Matrix> {
    pub input: &'a PdeInputData2D<M>,
}

impl<'a, M: Matrix> WaveEquation2D<'a, M> {
    pub fn new(input: &'a PdeInputData2D<M>) -> PdeResult<Self> {
        check_wave_scheme(input.solver_type)?;
        Ok(Self { input })
    }
}

impl<'a, M: Matrix> Equation<M> for WaveEquation2D<'a, M> {
    fn solver_type(&self) -> SolverType {
        self.input.solver_type
    }

    fn dt(&self) -> M::T {
        self.input.dt
    }

    fn build_spatial_operator(&self) -> SpatialOperator<M> {
        let c = self.input.diffusion;
        let wave_op = spatial::build_2d::<M>(
            &self.input.grid,
            M::T::zero(),
            M::T::zero(),
            c * c,
            self.input.dt,
            self.input.space_discretizer_type,
            &self.input.boundary_conditions,
        );
        let advect_op = spatial::build_2d::<M>(
            &self.input.grid,
            self.input.x_velocity,
            self.input.y_velocity,
            M::T::zero(),
            self.input.dt,
            self.input.space_discretizer_type,
            &self.input.boundary_conditions,
        );
        build_wave_block::<M>(wave_op, advect_op)
    }

    fn initial_state(&self) -> M::V {
        stack_state::<M>(&self.input.initial_condition)
    }

    fn extract_solution(&self, state: &M::V) -> M::V {
        first_half::<M>(state)
    }
}
