//! Spatial discretizer: builds the dense operator `L` for
//! `du/dt = -v . grad(u) + D . laplacian(u)` together with the inhomogeneous
//! boundary vector `b`.
//!
//! Interior rows follow the selected stencil (centered / upwind /
//! Lax-Wendroff). Boundary rows are built by eliminating the ghost point
//! implied by the face's boundary condition:
//!
//! - Dirichlet(v): the row becomes an identity row (`L[i,i] = 1`), `b[i] = v`.
//!   The actual pinning is enforced by [`crate::time`] overriding `T`'s row
//!   to zero; this identity row is the on-record property being described.
//! - Neumann(v): a one-sided ghost substitution folds the constraint into
//!   the row's interior-like coefficients plus a constant that becomes
//!   `b[i]`. The first-derivative (advection) contribution cancels exactly
//!   under the symmetric ghost reflection; only diffusion leaves a matrix
//!   entry.
//! - Periodic: the row wraps to the opposite face's node, `b[i] = 0`.
//!
//! 2D operators are the tensor sum `Lx (x) Iy + Ix (x) Ly`, with a corner
//! tie-break pass afterwards: Dirichlet beats any other kind, and
//! between two Dirichlet faces the x-varying face wins.

use crate::boundary::{BoundaryCondition, BoundaryConditionKind, BoundaryConditions1D, BoundaryConditions2D};
use crate::enums::SpaceDiscretizerType;
use crate::grid::{Grid1D, Grid2D};
use crate::matrix::Matrix;
use crate::scalar::Scalar;
use crate::vector::Vector;

pub struct SpatialOperator<M: Matrix> {
    pub l: M,
    pub b: M::V,
    /// `(index, target value)` for every degree of freedom pinned by a
    /// Dirichlet face. [`crate::time`] uses this to zero the corresponding
    /// row of every advance matrix and hard-set the constant term, so a
    /// Dirichlet value is preserved to machine precision under any scheme.
    pub dirichlet_dofs: Vec<(usize, M::T)>,
}

fn effective_diffusion<T: Scalar>(diffusion: T, velocity: T, dt: T, space_type: SpaceDiscretizerType) -> T {
    if space_type == SpaceDiscretizerType::LaxWendroff {
        diffusion + velocity * velocity * dt * T::from_f64_lossy(0.5)
    } else {
        diffusion
    }
}

/// First-derivative stencil coefficients `(c_im1, c_i, c_ip1)` for an
/// interior node with left spacing `hm` and right spacing `hp`.
fn first_derivative_coeffs<T: Scalar>(
    hm: T,
    hp: T,
    velocity: T,
    space_type: SpaceDiscretizerType,
) -> (T, T, T) {
    let zero = T::zero();
    match space_type {
        SpaceDiscretizerType::Centered | SpaceDiscretizerType::LaxWendroff => {
            let denom = hm + hp;
            (-T::one() / denom, zero, T::one() / denom)
        }
        SpaceDiscretizerType::Upwind => {
            if velocity >= zero {
                // backward difference: upwind for rightward-traveling characteristics
                (-T::one() / hm, T::one() / hm, zero)
            } else {
                // forward difference: upwind for leftward-traveling characteristics
                (zero, -T::one() / hp, T::one() / hp)
            }
        }
    }
}

/// Centered second-derivative stencil coefficients `(d_im1, d_i, d_ip1)`.
fn second_derivative_coeffs<T: Scalar>(hm: T, hp: T) -> (T, T, T) {
    let two = T::from_f64_lossy(2.0);
    let sum = hm + hp;
    (two / (hm * sum), -two / (hm * hp), two / (hp * sum))
}

/// Builds the three-point row for an interior node given its neighbor
/// spacings and the node's own local column indices.
fn interior_row<T: Scalar>(
    hm: T,
    hp: T,
    velocity: T,
    d_eff: T,
    space_type: SpaceDiscretizerType,
) -> (T, T, T) {
    let (cm, c0, cp) = first_derivative_coeffs(hm, hp, velocity, space_type);
    let (dm, d0, dp) = second_derivative_coeffs(hm, hp);
    (-velocity * cm + d_eff * dm, -velocity * c0 + d_eff * d0, -velocity * cp + d_eff * dp)
}

/// Builds the dense 1D operator and inhomogeneous vector for a single face
/// pair (used directly for 1D problems, and once per axis inside the 2D
/// tensor-sum construction).
pub fn build_1d<M: Matrix>(
    grid: &Grid1D<M::T>,
    velocity: M::T,
    diffusion: M::T,
    dt: M::T,
    space_type: SpaceDiscretizerType,
    bc: &BoundaryConditions1D<M::T>,
) -> SpatialOperator<M> {
    let n = grid.len();
    let mut l = M::zeros(n, n);
    let mut b = M::V::zeros(n);
    let d_eff = effective_diffusion(diffusion, velocity, dt, space_type);

    for i in 1..n - 1 {
        let hm = grid.h_minus(i);
        let hp = grid.h_plus(i);
        let (cm, c0, cp) = interior_row::<M::T>(hm, hp, velocity, d_eff, space_type);
        let mut row = vec![M::T::zero(); n];
        row[i - 1] = cm;
        row[i] = c0;
        row[i + 1] = cp;
        l.write_row(i, &row);
    }

    let mut dirichlet_dofs = Vec::new();
    if let Some(d) = write_left_face::<M>(&mut l, &mut b, grid, velocity, d_eff, bc.left, n, 0) {
        dirichlet_dofs.push(d);
    }
    if let Some(d) = write_right_face::<M>(&mut l, &mut b, grid, velocity, d_eff, bc.right, n, n - 1) {
        dirichlet_dofs.push(d);
    }

    SpatialOperator { l, b, dirichlet_dofs }
}

#[allow(clippy::too_many_arguments)]
fn write_left_face<M: Matrix>(
    l: &mut M,
    b: &mut M::V,
    grid: &Grid1D<M::T>,
    velocity: M::T,
    d_eff: M::T,
    bc: BoundaryCondition<M::T>,
    n: usize,
    i: usize,
) -> Option<(usize, M::T)> {
    let mut row = vec![M::T::zero(); n];
    let mut dirichlet = None;
    match bc.kind {
        BoundaryConditionKind::Dirichlet => {
            row[i] = M::T::one();
            b.set(i, bc.value);
            dirichlet = Some((i, bc.value));
        }
        BoundaryConditionKind::Neumann => {
            let h = grid.h_plus(i);
            let two = M::T::from_f64_lossy(2.0);
            row[i] = -two * d_eff / (h * h);
            row[i + 1] = two * d_eff / (h * h);
            b.set(i, bc.value * (velocity + two * d_eff / h));
        }
        BoundaryConditionKind::Periodic => {
            let h = grid.h_plus(i);
            let (cm, c0, cp) = interior_row::<M::T>(h, h, velocity, d_eff, SpaceDiscretizerType::Centered);
            row[n - 1] = cm;
            row[i] = c0;
            row[i + 1] = cp;
            b.set(i, M::T::zero());
        }
    }
    l.write_row(i, &row);
    dirichlet
}

#[allow(clippy::too_many_arguments)]
fn write_right_face<M: Matrix>(
    l: &mut M,
    b: &mut M::V,
    grid: &Grid1D<M::T>,
    velocity: M::T,
    d_eff: M::T,
    bc: BoundaryCondition<M::T>,
    n: usize,
    i: usize,
) -> Option<(usize, M::T)> {
    let mut row = vec![M::T::zero(); n];
    let mut dirichlet = None;
    match bc.kind {
        BoundaryConditionKind::Dirichlet => {
            row[i] = M::T::one();
            b.set(i, bc.value);
            dirichlet = Some((i, bc.value));
        }
        BoundaryConditionKind::Neumann => {
            let h = grid.h_minus(i);
            let two = M::T::from_f64_lossy(2.0);
            row[i] = -two * d_eff / (h * h);
            row[i - 1] = two * d_eff / (h * h);
            b.set(i, bc.value * (two * d_eff / h - velocity));
        }
        BoundaryConditionKind::Periodic => {
            let h = grid.h_minus(i);
            let (cm, c0, cp) = interior_row::<M::T>(h, h, velocity, d_eff, SpaceDiscretizerType::Centered);
            row[i - 1] = cm;
            row[i] = c0;
            row[0] = cp;
            b.set(i, M::T::zero());
        }
    }
    l.write_row(i, &row);
    dirichlet
}

/// Builds the 2D tensor-product operator `L = Lx (x) Iy + Ix (x) Ly` as one
/// dense `M x M` matrix (`M = nx * ny`), then resolves corner ties.
pub fn build_2d<M: Matrix>(
    grid: &Grid2D<M::T>,
    x_velocity: M::T,
    y_velocity: M::T,
    diffusion: M::T,
    dt: M::T,
    space_type: SpaceDiscretizerType,
    bc: &BoundaryConditions2D<M::T>,
) -> SpatialOperator<M> {
    let nx = grid.nx();
    let ny = grid.ny();
    let m = nx * ny;

    let x_op = build_1d::<M>(&grid.x, x_velocity, diffusion, dt, space_type, &bc.x());
    let y_op = build_1d::<M>(&grid.y, y_velocity, diffusion, dt, space_type, &bc.y());

    let mut l = M::zeros(m, m);
    let mut b = M::V::zeros(m);

    for j in 0..ny {
        for i in 0..nx {
            let row = grid.flatten(i, j);
            let mut combined = vec![M::T::zero(); m];
            for i2 in 0..nx {
                let c = x_op.l.get(i, i2);
                if c != M::T::zero() {
                    let idx = grid.flatten(i2, j);
                    combined[idx] = combined[idx] + c;
                }
            }
            for j2 in 0..ny {
                let c = y_op.l.get(j, j2);
                if c != M::T::zero() {
                    let idx = grid.flatten(i, j2);
                    combined[idx] = combined[idx] + c;
                }
            }
            l.write_row(row, &combined);
            b.set(row, x_op.b.get(i) + y_op.b.get(j));
        }
    }

    let dirichlet_dofs = resolve_boundary_rows::<M>(&mut l, &mut b, &x_op, &y_op, grid, bc);

    SpatialOperator { l, b, dirichlet_dofs }
}

/// Overrides every boundary-adjacent row touched by a Dirichlet face with a
/// pure identity row, discarding whatever the tensor sum produced there.
///
/// A node on a single Dirichlet edge (not a corner) must pin regardless of
/// the other axis's interior dynamics, not just blend with them: `u(0, y) =
/// g` holds for every `y`, so the naive `Lx (x) Iy + Ix (x) Ly` sum — which
/// still carries `Ly`'s neighbor coupling along that edge — is wrong there.
/// At a corner touched by two faces, the tie-break rule decides which face's
/// row is kept: Dirichlet beats any other kind, and between two Dirichlet
/// faces the fastest-varying index (x) wins.
fn resolve_boundary_rows<M: Matrix>(
    l: &mut M,
    b: &mut M::V,
    x_op: &SpatialOperator<M>,
    y_op: &SpatialOperator<M>,
    grid: &Grid2D<M::T>,
    bc: &BoundaryConditions2D<M::T>,
) -> Vec<(usize, M::T)> {
    let nx = grid.nx();
    let ny = grid.ny();
    let mut dirichlet_dofs = Vec::new();

    for j in 0..ny {
        for i in 0..nx {
            let x_face = if i == 0 {
                Some(bc.left.kind)
            } else if i == nx - 1 {
                Some(bc.right.kind)
            } else {
                None
            };
            let y_face = if j == 0 {
                Some(bc.down.kind)
            } else if j == ny - 1 {
                Some(bc.up.kind)
            } else {
                None
            };

            let use_x = match (x_face, y_face) {
                (Some(BoundaryConditionKind::Dirichlet), _) => true,
                (_, Some(BoundaryConditionKind::Dirichlet)) => false,
                _ => continue, // no Dirichlet face touches this node: the tensor-sum row stands
            };

            let row = grid.flatten(i, j);
            let mut combined = vec![M::T::zero(); l.ncols()];
            let value;
            if use_x {
                for i2 in 0..nx {
                    combined[grid.flatten(i2, j)] = x_op.l.get(i, i2);
                }
                value = x_op.b.get(i);
            } else {
                for j2 in 0..ny {
                    combined[grid.flatten(i, j2)] = y_op.l.get(j, j2);
                }
                value = y_op.b.get(j);
            }
            l.write_row(row, &combined);
            b.set(row, value);
            dirichlet_dofs.push((row, value));
        }
    }

    dirichlet_dofs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryCondition;
    use nalgebra::{DMatrix, DVector};

    type M = DMatrix<f64>;

    fn uniform_bc(kind_value: BoundaryCondition<f64>) -> BoundaryConditions1D<f64> {
        BoundaryConditions1D { left: kind_value, right: kind_value }
    }

    #[test]
    fn dirichlet_rows_are_identity() {
        let grid = Grid1D::linspace(0.0, 1.0, 5).unwrap();
        let bc = uniform_bc(BoundaryCondition::dirichlet(2.0));
        let op = build_1d::<M>(&grid, 0.0, 1.0, 1e-3, SpaceDiscretizerType::Centered, &bc);
        assert_eq!(op.l.get(0, 0), 1.0);
        assert_eq!(op.l.get(4, 4), 1.0);
        assert_eq!(op.b.get(0), 2.0);
        assert_eq!(op.b.get(4), 2.0);
    }

    #[test]
    fn neumann_of_affine_field_is_exact() {
        // u(x) = 3 + 2x on a uniform grid with a nonzero diffusion
        // coefficient and zero velocity: the centered second-derivative
        // stencil is exactly zero on an affine field at every interior node,
        // and the ghost-corrected boundary row should reproduce zero net
        // change there too, since the prescribed Neumann value matches the
        // analytic outward slope exactly. Diffusion must be nonzero here:
        // with both velocity and diffusion at zero the row and `b` entries
        // this test exercises collapse to zero regardless of the Neumann
        // value, so a wrong ghost-cell formula would pass unnoticed.
        let grid = Grid1D::linspace(0.0, 1.0, 5).unwrap();
        let slope = 2.0;
        let diffusion = 0.7;
        let bc = BoundaryConditions1D {
            left: BoundaryCondition::neumann(-slope),
            right: BoundaryCondition::neumann(slope),
        };
        let op = build_1d::<M>(&grid, 0.0, diffusion, 1e-3, SpaceDiscretizerType::Centered, &bc);
        let u = DVector::from_fn(5, |i, _| 3.0 + slope * grid.get(i));
        let mut y = DVector::zeros(5);
        op.l.gemv(1.0, &u, 0.0, &mut y);
        // The boundary rows must actually carry nonzero coefficients for
        // this to be a meaningful check of the ghost-cell substitution.
        assert!(op.l.get(0, 1) != 0.0);
        assert!(op.l.get(4, 3) != 0.0);
        for i in 0..5 {
            let rhs = y.get(i) + op.b.get(i);
            assert!(rhs.abs() < 1e-10, "node {i}: {rhs}");
        }
    }
}
