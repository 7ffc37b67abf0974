//! Robust one-step predecessor `Pre(sys, X)`.
//!
//! `Pre(X) = { x : ∃u ∈ U, A x + Bu (u + e) + Bw w ∈ X  ∀w ∈ W, ∀e ∈ E }`.
//!
//! Algorithm
//! 1. Lift to `(x, u)`: rows `[H A | H Bu] <= h` (successor in X) stacked with
//!    `[0 | Hu] <= hu` (admissible input).
//! 2. Tighten `h` row-wise by the worst case of `H Bw w` over `extreme(W)` and
//!    of `H Bu e` over `extreme(E)` (each only when present).
//! 3. Project onto the `x` coordinates.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::{check_dim, PolyError, Result};
use crate::polytope::{project_with, vcat, Polytope, ProjectionMethod};
use crate::system::System;

/// `Pre(sys, target)` with the default projection method.
pub fn pre(sys: &System, target: &Polytope) -> Result<Polytope> {
    pre_with(sys, target, ProjectionMethod::default())
}

/// `Pre(sys, target)` with an explicit projection method.
pub fn pre_with(sys: &System, target: &Polytope, method: ProjectionMethod) -> Result<Polytope> {
    check_dim("Pre target set", sys.nx(), target.dim())?;
    let (n, p) = (sys.nx(), sys.nu());
    let h = target.a();

    let mut rhs = target.b().clone();
    if let Some(d) = sys.disturbance() {
        rhs -= worst_case(&(h * &d.bw), &d.w, "disturbance set W")?;
    }
    if let Some(e) = sys.input_error() {
        rhs -= worst_case(&(h * sys.bu()), e, "input error set E")?;
    }

    let (m, mu) = (h.nrows(), sys.u().n_halfspaces());
    let mut a = DMatrix::zeros(m + mu, n + p);
    a.view_mut((0, 0), (m, n)).copy_from(&(h * sys.a()));
    a.view_mut((0, n), (m, p)).copy_from(&(h * sys.bu()));
    a.view_mut((m, n), (mu, p)).copy_from(sys.u().a());
    let lifted = Polytope::from_halfspaces(a, vcat(&rhs, sys.u().b()))?;

    if lifted.is_empty()? {
        return Err(PolyError::InfeasibleProjection {
            detail: "lifted (x, u) polytope is empty".into(),
        });
    }
    if !lifted.is_bounded()? {
        return Err(PolyError::InfeasibleProjection {
            detail: "lifted (x, u) polytope is unbounded".into(),
        });
    }
    debug!(rows = lifted.n_halfspaces(), dim = n + p, "projecting lifted system");
    let axes: Vec<usize> = (0..n).collect();
    project_with(&lifted, &axes, method)
}

/// Row-wise `max_{v ∈ extreme(S)} (G v)_i`.
fn worst_case(g: &DMatrix<f64>, set: &Polytope, context: &'static str) -> Result<DVector<f64>> {
    let verts = set.extreme_points()?;
    if verts.is_empty() {
        return Err(PolyError::EmptyPolytope { context });
    }
    let mut out = DVector::from_element(g.nrows(), f64::NEG_INFINITY);
    for v in verts {
        let gv = g * v;
        for (o, x) in out.iter_mut().zip(gv.iter()) {
            *o = o.max(*x);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polytope::subset_of;
    use nalgebra::{dmatrix, dvector};

    fn same_set(p: &Polytope, q: &Polytope) -> bool {
        subset_of(p, q, 1e-6) && subset_of(q, p, 1e-6)
    }

    fn double_integrator() -> System {
        System::new(
            dmatrix![1.0, 1.0; 0.0, 1.0],
            dmatrix![0.0; 1.0],
            Polytope::from_box(&[-5.0, -5.0], &[5.0, 5.0]).unwrap(),
            Polytope::from_range(-1.0, 1.0),
        )
        .unwrap()
    }

    #[test]
    fn double_integrator_predecessor() {
        let sys = double_integrator();
        let p = pre(&sys, sys.x()).unwrap();
        // Pre(X) = { |x1 + x2| <= 5, |x2| <= 6 }
        let expected = Polytope::from_halfspaces(
            dmatrix![1.0, 1.0; -1.0, -1.0; 0.0, 1.0; 0.0, -1.0],
            dvector![5.0, 5.0, 6.0, 6.0],
        )
        .unwrap();
        assert!(same_set(&p, &expected));
        assert!(p.contains(&dvector![5.5, -1.0]));
        assert!(!p.contains(&dvector![3.0, 3.0]));

        let fm = pre_with(&sys, sys.x(), ProjectionMethod::FourierMotzkin).unwrap();
        assert!(same_set(&fm, &expected));
    }

    #[test]
    fn disturbance_tightening_is_an_erosion() {
        let sys = System::new(
            DMatrix::identity(2, 2),
            DMatrix::zeros(2, 1),
            Polytope::from_box(&[-1.0, -1.0], &[1.0, 1.0]).unwrap(),
            Polytope::from_range(-1.0, 1.0),
        )
        .and_then(|s| {
            s.with_disturbance(
                DMatrix::identity(2, 2),
                Polytope::from_box(&[-0.2, -0.2], &[0.2, 0.2]).unwrap(),
            )
        })
        .unwrap();
        let p = pre(&sys, sys.x()).unwrap();
        assert!(same_set(&p, &Polytope::from_box(&[-0.8, -0.8], &[0.8, 0.8]).unwrap()));
    }

    #[test]
    fn input_error_tightening() {
        let sys = System::new(
            dmatrix![1.0],
            dmatrix![1.0],
            Polytope::from_range(-1.0, 1.0),
            Polytope::from_range(-1.0, 1.0),
        )
        .and_then(|s| s.with_input_error(Polytope::from_range(-0.5, 0.5)))
        .unwrap();
        let p = pre(&sys, sys.x()).unwrap();
        assert!(same_set(&p, &Polytope::from_range(-1.5, 1.5)));
    }

    #[test]
    fn empty_and_unbounded_lifts_are_reported() {
        let tiny = System::new(
            DMatrix::identity(2, 2),
            DMatrix::zeros(2, 1),
            Polytope::from_box(&[-0.1, -0.1], &[0.1, 0.1]).unwrap(),
            Polytope::from_range(-1.0, 1.0),
        )
        .and_then(|s| {
            s.with_disturbance(
                DMatrix::identity(2, 2),
                Polytope::from_box(&[-0.2, -0.2], &[0.2, 0.2]).unwrap(),
            )
        })
        .unwrap();
        assert!(matches!(
            pre(&tiny, tiny.x()),
            Err(PolyError::InfeasibleProjection { .. })
        ));

        let blind = System::new(
            DMatrix::zeros(2, 2),
            dmatrix![0.0; 1.0],
            Polytope::from_box(&[-5.0, -5.0], &[5.0, 5.0]).unwrap(),
            Polytope::from_range(-1.0, 1.0),
        )
        .unwrap();
        assert!(matches!(
            pre(&blind, blind.x()),
            Err(PolyError::InfeasibleProjection { .. })
        ));
    }

    #[test]
    fn target_dimension_is_checked() {
        let sys = double_integrator();
        let wrong = Polytope::from_range(-1.0, 1.0);
        assert!(matches!(pre(&sys, &wrong), Err(PolyError::Dimension { .. })));
    }
}
