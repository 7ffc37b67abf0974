//! Tolerance defaults for polytope algebra (internal).
//!
//! Policy
//! - Defaults are fixed constants so call sites do not juggle epsilons. The
//!   user-facing convergence tolerance lives in `invariant::SolverCfg`; these
//!   only govern floating-point predicates inside the algebra layer.

/// Feasibility/membership epsilon for `a·x <= b` tests.
pub(crate) const FEAS_EPS: f64 = 1e-9;
/// Minimum |det| of a (row-normalized) square system to count as non-singular.
pub(crate) const DET_EPS: f64 = 1e-10;
/// Points closer than this are merged during vertex enumeration.
pub(crate) const DEDUP_EPS: f64 = 1e-7;
/// Singular values below this count as zero in rank tests.
pub(crate) const RANK_EPS: f64 = 1e-9;
/// Quantization step used to dedup numerically equal hull facets.
pub(crate) const FACET_QUANTUM: f64 = 1e-7;
/// Rows with a normal shorter than this are treated as `0·x <= b`.
pub(crate) const ZERO_ROW_EPS: f64 = 1e-12;
/// Inscribed-ball radius below this marks a polytope as flat (not full-dimensional).
pub(crate) const FLAT_EPS: f64 = 1e-9;
/// Box on every LP variable; optima on it are re-checked for unboundedness.
pub(crate) const LP_BOX: f64 = 1e6;
