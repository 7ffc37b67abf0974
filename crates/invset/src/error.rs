//! Error kinds surfaced by the polytope layer, `Pre`, and the invariant-set solver.

use std::fmt;

/// Errors surfaced by polytope algebra and the algorithms built on it.
#[derive(Clone, Debug, PartialEq)]
pub enum PolyError {
    /// Shape mismatch between matrices/vectors.
    Dimension {
        context: &'static str,
        expected: usize,
        found: usize,
    },
    /// Hull/enumeration cannot produce a full-dimensional polytope from the points.
    DegenerateInput { context: &'static str, detail: String },
    /// Vertex enumeration could not extract a finite vertex set.
    Enumeration { detail: String },
    /// The lifted system of `Pre` has no feasible (bounded) projection.
    InfeasibleProjection { detail: String },
    /// The operation needs points of a set that has none.
    EmptyPolytope { context: &'static str },
    /// The LP backend reported a numerical failure.
    SolverFailure { detail: String },
}

impl fmt::Display for PolyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolyError::Dimension {
                context,
                expected,
                found,
            } => write!(
                f,
                "dimension mismatch in {}: expected {}, found {}",
                context, expected, found
            ),
            PolyError::DegenerateInput { context, detail } => {
                write!(f, "degenerate input to {}: {}", context, detail)
            }
            PolyError::Enumeration { detail } => {
                write!(f, "vertex enumeration failed: {}", detail)
            }
            PolyError::InfeasibleProjection { detail } => {
                write!(f, "lifted predecessor system cannot be projected: {}", detail)
            }
            PolyError::EmptyPolytope { context } => {
                write!(f, "{} requires a non-empty polytope", context)
            }
            PolyError::SolverFailure { detail } => write!(f, "LP solver failure: {}", detail),
        }
    }
}

impl std::error::Error for PolyError {}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PolyError>;

#[inline]
pub(crate) fn check_dim(context: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(PolyError::Dimension {
            context,
            expected,
            found,
        })
    }
}
