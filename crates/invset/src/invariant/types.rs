//! Solver configuration, outcome types, and the per-iteration observer hook.

use std::fmt;

use crate::polytope::{Polytope, ProjectionMethod};

/// Solver configuration (explicit per call; no process-wide defaults).
#[derive(Clone, Copy, Debug)]
pub struct SolverCfg {
    /// Relative inflation used by the convergence test.
    pub tol: f64,
    /// Hard cap on `Pre` steps.
    pub max_iterations: usize,
    pub projection: ProjectionMethod,
    /// Prune redundant rows of each candidate (LP per row). Set-preserving.
    pub reduce: bool,
    /// A candidate whose inscribed radius drops below `collapse` times the
    /// seed's has degenerated; the run ends `Infeasible`.
    pub collapse: f64,
}

impl Default for SolverCfg {
    fn default() -> Self {
        Self {
            tol: 1e-3,
            max_iterations: 100,
            projection: ProjectionMethod::VertexEnumeration,
            reduce: true,
            collapse: 1e-6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Converged,
    /// The origin left the candidate, or the candidate emptied or collapsed;
    /// no invariant set around the equilibrium exists.
    Infeasible,
    /// Neither test fired within `max_iterations`.
    IterationLimitReached,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Converged => "converged",
            Status::Infeasible => "infeasible",
            Status::IterationLimitReached => "iteration-limit",
        };
        f.write_str(s)
    }
}

/// Final candidate plus how the iteration ended.
#[derive(Clone, Debug)]
pub struct InvariantSet {
    pub set: Polytope,
    pub status: Status,
    /// Number of `Pre` steps performed.
    pub iterations: usize,
}

/// Receives the 2-D projection (or the set itself when `n <= 2`) of every new
/// candidate. Purely observational; it cannot alter the iteration.
pub trait IterationObserver {
    fn on_iteration(&mut self, iteration: usize, projection: &Polytope);
}

impl<F> IterationObserver for F
where
    F: FnMut(usize, &Polytope),
{
    fn on_iteration(&mut self, iteration: usize, projection: &Polytope) {
        self(iteration, projection)
    }
}
