//! Robust control-invariant sets for constrained linear systems.
//!
//! Layers, bottom-up:
//! - `lp`: single-shot linear programs (support functions, Chebyshev ball).
//! - `polytope`: H/V polytopes and the set algebra (intersection, hulls,
//!   projection, Minkowski/Pontryagin, subset tests).
//! - `system` + `pre`: the plant `x+ = A x + Bu (u + e) + Bw w` and its robust
//!   one-step predecessor.
//! - `invariant`: the `X_{k+1} = Pre(X_k) ∩ X_k` fixed point.
//!
//! All fallible operations return `error::Result`; nothing panics on bad
//! input. Progress is reported through `tracing` events, so callers pick the
//! subscriber.

mod cfg;
pub mod error;
pub mod invariant;
pub mod lp;
pub mod polytope;
pub mod pre;
pub mod rand;
pub mod system;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{PolyError, Result};
pub use invariant::{invariant_set, invariant_set_from, InvariantSet, SolverCfg, Status};
pub use polytope::{Polytope, ProjectionMethod, Shape};
pub use pre::{pre, pre_with};
pub use system::{Disturbance, System};

/// Common exports for callers.
pub mod prelude {
    pub use crate::error::{PolyError, Result};
    pub use crate::invariant::{
        invariant_set, invariant_set_from, InvariantSet, IterationObserver, SolverCfg, Status,
    };
    pub use crate::polytope::{
        difference, envelope, hull, intersect, minkowski_sum, pontryagin_diff, project,
        project_with, reduce, scale, subset_of, union, Polytope, ProjectionMethod, Shape,
    };
    pub use crate::pre::{pre, pre_with};
    pub use crate::rand::{draw_box, draw_polytope, draw_system, CloudCfg, ReplayToken};
    pub use crate::system::{Disturbance, System};
    pub use nalgebra::{DMatrix, DVector};
}
