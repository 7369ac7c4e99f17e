//! Time discretizer: turns the spatial operator `(L, b)` into the per-scheme
//! advance tensor `T = [T0, T1, ...]` and constant term `c` so that
//! `u^{n+1} = T0 u^n + T1 u^{n-1} + ... + c`.
//!
//! Every scheme here is linear and autonomous in `u` (`du/dt = L u + b`), so
//! a single-step scheme's whole update — stages and all — collapses to one
//! matrix function `R` of `z = dt * L` evaluated once at construction time,
//! not recomputed per step. The constant `b` is folded in by the standard
//! augmented-system trick: stacking `[u; 1]` makes the affine ODE linear and
//! homogeneous in the augmented state (`d/dt 1 = 0` is literally last row
//! zero), so `R` applied to the augmented operator's `(n+1) x (n+1)` matrix
//! carries `b`'s contribution through every stage automatically. `T0` and
//! `c` are then just the top-left block and last column of `R(z_aug)`.
//!
//! The two multistep schemes (`AdamsBashforth2`, `AdamsMoulton2`) need a
//! second history slot and are built directly from their defining formulas
//! instead, since they are not single-step matrix functions of `z`.
//!
//! Dirichlet degrees of freedom are pinned exactly regardless of scheme: for
//! each `(index, value)` in [`crate::spatial::SpatialOperator::dirichlet_dofs`],
//! every `T_k` row at that index is zeroed and `c` at that index is hard-set
//! to `value`. This decouples the DOF from its own history entirely, so the
//! boundary value survives to machine precision under repeated advancing
//! instead of drifting by whatever a generic integrator's row would compute.

use crate::enums::SolverType;
use crate::error::PdeResult;
use crate::matrix::Matrix;
use crate::scalar::Scalar;
use crate::spatial::SpatialOperator;
use crate::vector::Vector;

pub struct TimeOperator<M: Matrix> {
    /// `t[0]` multiplies the most recent state; `t[1]` (if present) the one
    /// before it. Length equals [`SolverType::history_len`].
    pub t: Vec<M>,
    pub c: M::V,
}

/// `p(z) = coeffs[0] + coeffs[1] z + ... + coeffs[k] z^k`, evaluated as a
/// matrix polynomial via Horner's method.
fn matrix_poly<M: Matrix>(coeffs: &[M::T], z: &M) -> M {
    let identity = M::identity(z.nrows());
    let mut iter = coeffs.iter().rev();
    let highest = *iter.next().expect("coeffs must be non-empty");
    let mut acc = identity.scale(highest);
    for &c in iter {
        acc = acc.matmul(z).add_scaled(c, &identity);
    }
    acc
}

/// `numer(z) . denom(z)^-1`, the Pade-style rational matrix function used by
/// the implicit schemes. Fails with [`crate::error::PdeError::SingularMatrix`]
/// if `dt` and `L` conspire to make the scheme's denominator matrix singular.
fn matrix_rational<M: Matrix>(numer: &[M::T], denom: &[M::T], z: &M) -> PdeResult<M> {
    let n = matrix_poly::<M>(numer, z);
    let d = matrix_poly::<M>(denom, z);
    d.lu_solve_mat(&n)
}

/// One level of Richardson extrapolation of a base method with stability
/// function `base` and order `base_order`: combines one step at `z` with two
/// half-steps at `z/2` to cancel the base method's leading error term.
fn richardson<M: Matrix>(z: &M, base_order: M::T, base: &dyn Fn(&M) -> M) -> M {
    let two = M::T::from_f64_lossy(2.0);
    let half = z.scale(M::T::one() / two);
    let r_half = base(&half);
    let r_half_sq = r_half.matmul(&r_half);
    let r_full = base(z);
    let factor = two.powf(base_order);
    let combined = r_half_sq.scale(factor).add_scaled(-M::T::one(), &r_full);
    combined.scale(M::T::one() / (factor - M::T::one()))
}

fn euler_stability<M: Matrix>(z: &M) -> M {
    matrix_poly::<M>(&[M::T::one(), M::T::one()], z)
}

fn richardson2_stability<M: Matrix>(z: &M) -> M {
    richardson::<M>(z, M::T::one(), &euler_stability::<M>)
}

/// `(9.M(dt/3)^3 - M(dt)) / 8` with `M(h) = I + h.L`: the ratio-3 Richardson
/// extrapolation of Euler, built directly from its defining formula rather
/// than by a second level of [`richardson`] (which only cancels a leading
/// error term under step-halving, not step-thirding, and so would not
/// reproduce this scheme's stability polynomial).
fn richardson3_stability<M: Matrix>(z: &M) -> M {
    let three = M::T::from_f64_lossy(3.0);
    let third = z.scale(M::T::one() / three);
    let m_third = euler_stability::<M>(&third);
    let m_third_cubed = m_third.matmul(&m_third).matmul(&m_third);
    let m_full = euler_stability::<M>(z);
    let nine = M::T::from_f64_lossy(9.0);
    let eighth = M::T::one() / M::T::from_f64_lossy(8.0);
    m_third_cubed.scale(nine).add_scaled(-M::T::one(), &m_full).scale(eighth)
}

/// Builds the `(n+1) x (n+1)` augmented operator `z_aug` with `z_aug[0..n,
/// 0..n] = dt*L`, `z_aug[0..n, n] = dt*b`, and a zero last row, so that a
/// matrix function of `z_aug` carries the inhomogeneous term through.
fn augment<M: Matrix>(l: &M, b: &M::V, dt: M::T) -> M {
    let n = l.nrows();
    let mut z = M::zeros(n + 1, n + 1);
    for i in 0..n {
        let mut row = vec![M::T::zero(); n + 1];
        for j in 0..n {
            row[j] = dt * l.get(i, j);
        }
        row[n] = dt * b.get(i);
        z.write_row(i, &row);
    }
    z
}

/// Splits an `(n+1) x (n+1)` matrix function result back into the `n x n`
/// block `T0` and the length-`n` constant column `c`.
fn split_augmented<M: Matrix>(r: &M, n: usize) -> (M, M::V) {
    let mut t0 = M::zeros(n, n);
    let mut c = M::V::zeros(n);
    for i in 0..n {
        let mut row = vec![M::T::zero(); n];
        for j in 0..n {
            row[j] = r.get(i, j);
        }
        t0.write_row(i, &row);
        c.set(i, r.get(i, n));
    }
    (t0, c)
}

fn single_step_stability<M: Matrix>(solver_type: SolverType, z: &M) -> PdeResult<M> {
    let one = M::T::one();
    let half = M::T::from_f64_lossy(0.5);
    Ok(match solver_type {
        SolverType::ExplicitEuler => euler_stability::<M>(z),
        SolverType::ImplicitEuler => matrix_rational::<M>(&[one], &[one, -one], z)?,
        SolverType::CrankNicolson => matrix_rational::<M>(&[one, half], &[one, -half], z)?,
        SolverType::RungeKuttaRalston => matrix_poly::<M>(&[one, one, half], z),
        SolverType::RungeKutta3 => {
            matrix_poly::<M>(&[one, one, half, M::T::from_f64_lossy(1.0 / 6.0)], z)
        }
        SolverType::RungeKutta4 | SolverType::RungeKuttaThreeEight => matrix_poly::<M>(
            &[one, one, half, M::T::from_f64_lossy(1.0 / 6.0), M::T::from_f64_lossy(1.0 / 24.0)],
            z,
        ),
        SolverType::RungeKuttaGaussLegendre4 => {
            let twelfth = M::T::from_f64_lossy(1.0 / 12.0);
            matrix_rational::<M>(&[one, half, twelfth], &[one, -half, twelfth], z)?
        }
        SolverType::RichardsonExtrapolation2 => richardson2_stability::<M>(z),
        SolverType::RichardsonExtrapolation3 => richardson3_stability::<M>(z),
        SolverType::AdamsBashforth2 | SolverType::AdamsMouldon2 => {
            unreachable!("multistep schemes are built by build_multistep, not single_step_stability")
        }
    })
}

/// Builds the advance tensor for a one-step scheme (`history_len() == 1`).
fn build_single_step<M: Matrix>(
    op: &SpatialOperator<M>,
    dt: M::T,
    solver_type: SolverType,
) -> PdeResult<TimeOperator<M>> {
    let n = op.l.nrows();
    let z_aug = augment::<M>(&op.l, &op.b, dt);
    let r = single_step_stability::<M>(solver_type, &z_aug)?;
    let (t0, c) = split_augmented::<M>(&r, n);
    let mut time_op = TimeOperator { t: vec![t0], c };
    pin_dirichlet_dofs(&mut time_op, &op.dirichlet_dofs);
    Ok(time_op)
}

/// Builds the advance tensor for the two explicit/implicit 2-step Adams
/// schemes directly from their defining linear-multistep formulas.
fn build_adams<M: Matrix>(
    op: &SpatialOperator<M>,
    dt: M::T,
    solver_type: SolverType,
) -> PdeResult<TimeOperator<M>> {
    let n = op.l.nrows();
    let identity = M::identity(n);
    let l = &op.l;

    let (t0, t1, c) = match solver_type {
        SolverType::AdamsBashforth2 => {
            // u^{n+1} = u^n + dt*(3/2 L u^n - 1/2 L u^{n-1}) + dt*b
            let three_halves = M::T::from_f64_lossy(1.5);
            let minus_half = M::T::from_f64_lossy(-0.5);
            let t0 = identity.add_scaled(three_halves * dt, l);
            let t1 = l.scale(minus_half * dt);
            let mut c = M::V::zeros(n);
            c.axpy(dt, &op.b, M::T::zero());
            (t0, t1, c)
        }
        SolverType::AdamsMouldon2 => {
            // (I - 5/12 dt L) u^{n+1} = u^n + dt*(8/12 L u^n - 1/12 L u^{n-1}) + dt*b
            let five_twelfths = M::T::from_f64_lossy(5.0 / 12.0);
            let eight_twelfths = M::T::from_f64_lossy(8.0 / 12.0);
            let minus_one_twelfth = M::T::from_f64_lossy(-1.0 / 12.0);
            let lhs = identity.add_scaled(-five_twelfths * dt, l);
            let rhs0 = identity.add_scaled(eight_twelfths * dt, l);
            let rhs1 = l.scale(minus_one_twelfth * dt);
            let t0 = lhs.lu_solve_mat(&rhs0)?;
            let t1 = lhs.lu_solve_mat(&rhs1)?;
            let mut dt_b = M::V::zeros(n);
            dt_b.axpy(dt, &op.b, M::T::zero());
            let c = lhs.lu_solve(&dt_b)?;
            (t0, t1, c)
        }
        _ => unreachable!("build_adams only handles the two Adams schemes"),
    };

    let mut time_op = TimeOperator { t: vec![t0, t1], c };
    pin_dirichlet_dofs(&mut time_op, &op.dirichlet_dofs);
    Ok(time_op)
}

fn pin_dirichlet_dofs<M: Matrix>(time_op: &mut TimeOperator<M>, dirichlet_dofs: &[(usize, M::T)]) {
    let n = time_op.c.len();
    for &(i, value) in dirichlet_dofs {
        for t_k in time_op.t.iter_mut() {
            let zero_row = vec![M::T::zero(); n];
            t_k.write_row(i, &zero_row);
        }
        time_op.c.set(i, value);
    }
}

/// Builds the time discretizer's advance tensor for `solver_type` from the
/// spatial operator `op` and step size `dt`. Fails with
/// [`crate::error::PdeError::SingularMatrix`] if an implicit scheme's matrix
/// to invert turns out singular for this `dt` and `L` (e.g. a pathological
/// `dt` placing a root of the scheme's denominator exactly on `L`'s
/// spectrum).
pub fn build<M: Matrix>(op: &SpatialOperator<M>, dt: M::T, solver_type: SolverType) -> PdeResult<TimeOperator<M>> {
    match solver_type.history_len() {
        1 => build_single_step(op, dt, solver_type),
        2 => build_adams(op, dt, solver_type),
        other => unreachable!("no scheme declares a history length of {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BoundaryCondition, BoundaryConditions1D};
    use crate::grid::Grid1D;
    use crate::spatial;
    use approx::assert_abs_diff_eq;
    use nalgebra::DMatrix;

    type M = DMatrix<f64>;

    fn sample_op() -> SpatialOperator<M> {
        let grid = Grid1D::linspace(0.0, 1.0, 6).unwrap();
        let bc = BoundaryConditions1D {
            left: BoundaryCondition::dirichlet(1.0),
            right: BoundaryCondition::dirichlet(-1.0),
        };
        spatial::build_1d::<M>(&grid, 0.3, 0.02, 1e-3, crate::enums::SpaceDiscretizerType::Centered, &bc)
    }

    /// On a 1x1 "matrix" (plain scalar `z`), every stability function here
    /// should reduce to its textbook scalar polynomial/rational form.
    #[test]
    fn richardson_stability_polynomials_match_closed_form() {
        let z = DMatrix::from_row_slice(1, 1, &[0.1_f64]);
        let r2 = richardson2_stability::<M>(&z);
        let expected_r2 = 1.0 + 0.1 + 0.5 * 0.1_f64.powi(2);
        assert_abs_diff_eq!(r2.get(0, 0), expected_r2, epsilon = 1e-14);

        let r3 = richardson3_stability::<M>(&z);
        let expected_r3 = 1.0 + 0.1 + (3.0 / 8.0) * 0.1_f64.powi(2) + (1.0 / 24.0) * 0.1_f64.powi(3);
        assert_abs_diff_eq!(r3.get(0, 0), expected_r3, epsilon = 1e-14);
    }

    #[test]
    fn dirichlet_rows_are_pinned_for_every_scheme() {
        for &solver_type in &[
            SolverType::ExplicitEuler,
            SolverType::ImplicitEuler,
            SolverType::CrankNicolson,
            SolverType::RungeKuttaRalston,
            SolverType::RungeKutta4,
            SolverType::RungeKuttaGaussLegendre4,
            SolverType::RichardsonExtrapolation2,
            SolverType::RichardsonExtrapolation3,
        ] {
            let op = sample_op();
            let time_op = build::<M>(&op, 1e-3, solver_type).unwrap();
            assert_eq!(time_op.c.get(0), 1.0, "{solver_type:?}");
            assert_eq!(time_op.c.get(5), -1.0, "{solver_type:?}");
            for j in 0..6 {
                assert_eq!(time_op.t[0].get(0, j), 0.0, "{solver_type:?} row 0 col {j}");
                assert_eq!(time_op.t[0].get(5, j), 0.0, "{solver_type:?} row 5 col {j}");
            }
        }
    }

    #[test]
    fn adams_bashforth_pins_both_history_slots() {
        let op = sample_op();
        let time_op = build::<M>(&op, 1e-3, SolverType::AdamsBashforth2).unwrap();
        assert_eq!(time_op.t.len(), 2);
        for j in 0..6 {
            assert_eq!(time_op.t[1].get(0, j), 0.0);
            assert_eq!(time_op.t[1].get(5, j), 0.0);
        }
    }

    #[test]
    fn singular_denominator_is_reported_not_panicked() {
        // Implicit Euler's denominator is `1 - z`; at `z = 1` it vanishes.
        let z = DMatrix::from_row_slice(1, 1, &[1.0_f64]);
        let one = 1.0_f64;
        let result = matrix_rational::<M>(&[one], &[one, -one], &z);
        assert!(matches!(result, Err(crate::error::PdeError::SingularMatrix)));
    }
}
