//! Robust control-invariant set via the predecessor fixed-point iteration.
//!
//! Purpose
//! - Compute the largest subset of the state constraints that can be kept
//!   invariant under worst-case disturbance/input error with admissible inputs.
//!
//! Iteration
//! - `X_0 = seed` (normally `sys.X`), `X_{k+1} = Pre(sys, X_k) ∩ X_k`, so the
//!   sequence never grows.
//! - Checks per step, in order: `Status::Infeasible` when `X_{k+1}` is empty or
//!   its inscribed radius fell below `cfg.collapse` times the seed's;
//!   `Status::Converged` once `X_k ⊆ (1 + tol) X_{k+1}`; `Status::Infeasible`
//!   once the origin leaves `X_{k+1}`. After `max_iterations` steps the last
//!   candidate comes back as `Status::IterationLimitReached`.
//! - Vertex-merge failures on an almost collapsed candidate end the run as
//!   `Infeasible`; any other failure in `Pre` or the algebra aborts with its cause.
//!
//! Layout
//! - `types.rs`: configuration, status, result and the observer hook.
//! - `solver.rs`: the loop.

mod solver;
mod types;

pub use solver::{invariant_set, invariant_set_from};
pub use types::{InvariantSet, IterationObserver, SolverCfg, Status};
