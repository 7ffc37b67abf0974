use nalgebra::DVector;
use tracing::{debug, info, warn};

use super::types::{InvariantSet, IterationObserver, SolverCfg, Status};
use crate::cfg::FEAS_EPS;
use crate::error::{check_dim, PolyError, Result};
use crate::lp::Chebyshev;
use crate::polytope::{intersect, project, reduce, scale, subset_of, Polytope};
use crate::pre::pre_with;
use crate::system::System;

/// Step failures below this multiple of the collapse radius count as collapse.
const MERGE_SLACK: f64 = 1e3;

/// Invariant set seeded with the state constraints `sys.X`.
pub fn invariant_set(sys: &System, cfg: SolverCfg) -> Result<InvariantSet> {
    invariant_set_from(sys, sys.x(), cfg, None)
}

/// Invariant set seeded with `seed`; `observer` sees every new candidate.
pub fn invariant_set_from(
    sys: &System,
    seed: &Polytope,
    cfg: SolverCfg,
    mut observer: Option<&mut dyn IterationObserver>,
) -> Result<InvariantSet> {
    check_dim("invariant-set seed", sys.nx(), seed.dim())?;
    let origin = DVector::zeros(sys.nx());
    let seed_radius = inradius(seed)?.filter(|r| r.is_finite() && *r > 0.0);
    let collapse_radius = cfg.collapse * seed_radius.unwrap_or(1.0);
    let mut current = seed.clone();

    for k in 0..cfg.max_iterations {
        let next = match step(sys, &current, cfg) {
            Ok(next) => next,
            Err(err @ (PolyError::DegenerateInput { .. } | PolyError::Enumeration { .. })) => {
                if inradius(&current)?.is_some_and(|r| r <= MERGE_SLACK * collapse_radius) {
                    info!(iteration = k, %err, "candidate degenerated; no invariant set exists");
                    return Ok(finish(current, Status::Infeasible, k));
                }
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        debug!(iteration = k, halfspaces = next.n_halfspaces(), "candidate updated");
        if let Some(obs) = observer.as_deref_mut() {
            notify(obs, k, &next);
        }

        let radius = inradius(&next)?;
        if radius.map_or(true, |r| r <= collapse_radius.max(FEAS_EPS)) {
            info!(iterations = k + 1, ?radius, "candidate emptied or collapsed; no invariant set exists");
            return Ok(finish(next, Status::Infeasible, k + 1));
        }
        let inflated = scale(&next, 1.0 + cfg.tol)?;
        if subset_of(&current, &inflated, FEAS_EPS) {
            info!(
                iterations = k + 1,
                halfspaces = next.n_halfspaces(),
                "invariant set found"
            );
            return Ok(finish(next, Status::Converged, k + 1));
        }
        if !next.contains(&origin) {
            info!(iterations = k + 1, "origin left the candidate; no invariant set exists");
            return Ok(finish(next, Status::Infeasible, k + 1));
        }
        current = next;
    }

    info!(
        iterations = cfg.max_iterations,
        "iteration limit reached; invariant set is still being computed"
    );
    Ok(finish(current, Status::IterationLimitReached, cfg.max_iterations))
}

/// `Pre(X_k) ∩ X_k`, optionally reduced.
fn step(sys: &System, current: &Polytope, cfg: SolverCfg) -> Result<Polytope> {
    let pre = pre_with(sys, current, cfg.projection)?;
    let next = intersect(&pre, current)?;
    if cfg.reduce {
        reduce(&next)
    } else {
        Ok(next)
    }
}

/// Inscribed radius; `None` for an empty set, `Some(∞)` when unbounded.
fn inradius(p: &Polytope) -> Result<Option<f64>> {
    Ok(match p.chebyshev()? {
        Chebyshev::Empty => None,
        Chebyshev::Ball { radius, .. } => Some(radius),
        Chebyshev::Unbounded => Some(f64::INFINITY),
    })
}

fn finish(set: Polytope, status: Status, iterations: usize) -> InvariantSet {
    InvariantSet {
        set,
        status,
        iterations,
    }
}

/// Hand the observer a planar view of `set`; failures only log.
fn notify(obs: &mut (dyn IterationObserver + '_), k: usize, set: &Polytope) {
    if set.dim() <= 2 {
        obs.on_iteration(k, set);
        return;
    }
    match project(set, &[0, 1]) {
        Ok(view) => obs.on_iteration(k, &view),
        Err(err) => warn!(iteration = k, %err, "skipping snapshot projection"),
    }
}
