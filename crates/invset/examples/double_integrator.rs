//! Invariant set of the double integrator, with and without a disturbance.
//!
//! Usage:
//!   cargo run -p invset --example double_integrator
//!   cargo run -p invset --example double_integrator -- 0.1   # |w|_inf <= 0.1
//!
//! Prints status, iteration count, and the vertices of the resulting set.

use invset::prelude::*;
use nalgebra::dmatrix;

fn main() -> Result<()> {
    let w_max: f64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);

    let mut sys = System::new(
        dmatrix![1.0, 1.0; 0.0, 1.0],
        dmatrix![0.0; 1.0],
        Polytope::from_box(&[-5.0, -5.0], &[5.0, 5.0])?,
        Polytope::from_range(-1.0, 1.0),
    )?;
    if w_max > 0.0 {
        sys = sys.with_disturbance(
            DMatrix::identity(2, 2),
            Polytope::from_box(&[-w_max, -w_max], &[w_max, w_max])?,
        )?;
    }

    let mut sizes = Vec::new();
    let mut observe = |k: usize, p: &Polytope| sizes.push((k, p.n_halfspaces()));
    let out = invariant_set_from(&sys, sys.x(), SolverCfg::default(), Some(&mut observe))?;

    for (k, m) in &sizes {
        println!("iteration {k}: {m} halfspaces");
    }
    println!("status={} iterations={}", out.status, out.iterations);
    if !out.set.is_empty()? {
        for v in out.set.vertices()? {
            println!("  ({:+.4}, {:+.4})", v[0], v[1]);
        }
    }
    Ok(())
}
