//! Convex polytopes in R^n (H-representation with lazy V-cache).
//!
//! Purpose
//! - The set-algebra layer under `Pre` and the invariant-set iteration:
//!   representation conversion, intersection/union/difference, projection,
//!   Minkowski and Pontryagin differences, scaling, subset tests.
//!
//! Why this design (short)
//! - H-rep is the source of truth; every operation that needs vertices asks
//!   `Polytope::vertices()`, which enumerates once and caches.
//! - One static `Polytope` type. Operations that can return non-convex results
//!   (`union`, `difference`) return `Shape`, so "needs one convex set" is a
//!   type-level distinction.
//! - LP-backed predicates (`is_empty`, `is_bounded`, `support`, `reduce`) go
//!   through `crate::lp`, one solver instance per call.
//!
//! Assumptions and conventions
//! - Half-spaces use `a·x <= b`; rows are not required to be normalized or
//!   irredundant. `reduce` and the hull return unit-normal rows.
//! - Membership uses `<= b + 1e-9`. Vertex enumeration and hulls are
//!   combinatorial and sized for state/input dimensions (n ≲ 6).
//! - The empty set is `0·x <= -1` (`Polytope::empty`).

mod algebra;
mod convert;
mod region;
mod types;
mod util;

pub use algebra::{
    difference, envelope, hull, intersect, minkowski_sum, pontryagin_diff, project,
    project_with, reduce, scale, subset_of, union, ProjectionMethod,
};
pub use region::Shape;
pub use types::Polytope;

pub(crate) use util::{vcat, vstack};

#[cfg(test)]
mod tests;
