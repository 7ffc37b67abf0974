//! Linear programs over H-representations, backed by `minilp`.
//!
//! Every call builds its own `minilp::Problem` and drops it on return, so a
//! failure in one support-function LP cannot leak solver state into the next.
//!
//! Boundedness
//! - minilp is unreliable on free variables: a direction that is bounded on
//!   one side only can come back as `Ok` with an infinite objective. Every
//!   variable is therefore boxed to `[-LP_BOX, LP_BOX]`. An optimum away from
//!   the box is the true optimum. One on the box is re-solved in a 4x larger
//!   box; if the objective grows with the box, the LP is unbounded.
//! - Sets are assumed to live well inside the box (coordinates ≪ 1e6).
//!
//! - `maximize`: `max c·x  s.t.  A x <= b`, x free.
//! - `chebyshev_ball`: largest ball inside `{x : A x <= b}`; decides emptiness
//!   and full-dimensionality in one solve.

use minilp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem, Variable};
use nalgebra::{DMatrix, DVector};

use crate::cfg::{FEAS_EPS, LP_BOX, ZERO_ROW_EPS};
use crate::error::{check_dim, PolyError, Result};

/// Outcome of a single LP solve.
#[derive(Clone, Debug, PartialEq)]
pub enum LpOutcome {
    Optimal { value: f64, point: DVector<f64> },
    Infeasible,
    Unbounded,
}

impl LpOutcome {
    /// Optimal value, if any.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            LpOutcome::Optimal { value, .. } => Some(*value),
            _ => None,
        }
    }
}

/// Largest inscribed ball of an H-polytope.
#[derive(Clone, Debug, PartialEq)]
pub enum Chebyshev {
    Empty,
    Ball { center: DVector<f64>, radius: f64 },
    /// Arbitrarily large balls fit; the polytope is unbounded.
    Unbounded,
}

/// Either a usable row or the verdict for a `0·x <= b` row.
enum Row {
    Skip,
    Contradiction,
    Keep,
}

fn classify_row(norm: f64, rhs: f64) -> Row {
    if norm > ZERO_ROW_EPS {
        Row::Keep
    } else if rhs < -FEAS_EPS {
        Row::Contradiction
    } else {
        Row::Skip
    }
}

fn check_inputs(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<()> {
    check_dim("lp right-hand side", a.nrows(), b.len())?;
    if a.iter().chain(b.iter()).any(|x| !x.is_finite()) {
        return Err(PolyError::SolverFailure {
            detail: "non-finite coefficient in constraint system".into(),
        });
    }
    Ok(())
}

/// Add `row·vars (+ extra) <= rhs` to the problem, skipping explicit zeros.
fn add_row(
    problem: &mut Problem,
    vars: &[Variable],
    row: impl Iterator<Item = f64>,
    extra: Option<(Variable, f64)>,
    rhs: f64,
) {
    let mut expr = LinearExpr::empty();
    for (j, aij) in row.enumerate() {
        if aij != 0.0 {
            expr.add(vars[j], aij);
        }
    }
    if let Some((var, coeff)) = extra {
        expr.add(var, coeff);
    }
    problem.add_constraint(expr, ComparisonOp::Le, rhs);
}

/// One boxed solve of `max c·x  s.t.  A x <= b,  |x_i| <= bound`.
fn maximize_boxed(
    c: &DVector<f64>,
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    bound: f64,
) -> Result<LpOutcome> {
    let mut problem = Problem::new(OptimizationDirection::Maximize);
    let vars: Vec<Variable> = c.iter().map(|&ci| problem.add_var(ci, (-bound, bound))).collect();
    for (i, row) in a.row_iter().enumerate() {
        match classify_row(row.norm(), b[i]) {
            Row::Skip => continue,
            Row::Contradiction => return Ok(LpOutcome::Infeasible),
            Row::Keep => add_row(&mut problem, &vars, row.iter().copied(), None, b[i]),
        }
    }
    match problem.solve() {
        Ok(solution) => {
            let value = solution.objective();
            let point = DVector::from_iterator(vars.len(), vars.iter().map(|&v| solution[v]));
            if !value.is_finite() || point.iter().any(|x| !x.is_finite()) {
                return Err(PolyError::SolverFailure {
                    detail: "non-finite optimum in a boxed LP".into(),
                });
            }
            Ok(LpOutcome::Optimal { value, point })
        }
        Err(minilp::Error::Infeasible) => Ok(LpOutcome::Infeasible),
        Err(minilp::Error::Unbounded) => Err(PolyError::SolverFailure {
            detail: "boxed LP reported unbounded".into(),
        }),
    }
}

#[inline]
fn touches_box(point: &DVector<f64>, bound: f64) -> bool {
    point.amax() >= 0.5 * bound
}

/// Solve `max c·x  s.t.  A x <= b` with `x` unrestricted in sign.
pub fn maximize(c: &DVector<f64>, a: &DMatrix<f64>, b: &DVector<f64>) -> Result<LpOutcome> {
    check_dim("lp objective", a.ncols(), c.len())?;
    check_inputs(a, b)?;
    let first = maximize_boxed(c, a, b, LP_BOX)?;
    let value = match &first {
        LpOutcome::Optimal { value, point } if touches_box(point, LP_BOX) => *value,
        _ => return Ok(first),
    };
    match maximize_boxed(c, a, b, 4.0 * LP_BOX)? {
        LpOutcome::Optimal { value: wider, .. } if wider > value + 1e-6 * (1.0 + value.abs()) => {
            Ok(LpOutcome::Unbounded)
        }
        LpOutcome::Optimal { .. } => Ok(first),
        _ => Err(PolyError::SolverFailure {
            detail: "LP changed feasibility when its box grew".into(),
        }),
    }
}

/// Chebyshev ball: `max r  s.t.  a_i·x + ||a_i|| r <= b_i,  r >= 0`.
///
/// The center is boxed like `maximize`; a radius at the box size means
/// arbitrarily large balls fit. Narrow unbounded sets may still report a
/// finite ball, so callers that need boundedness ask `maximize` per axis.
pub fn chebyshev_ball(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<Chebyshev> {
    check_inputs(a, b)?;
    let mut problem = Problem::new(OptimizationDirection::Maximize);
    let vars: Vec<Variable> = (0..a.ncols())
        .map(|_| problem.add_var(0.0, (-LP_BOX, LP_BOX)))
        .collect();
    let r = problem.add_var(1.0, (0.0, LP_BOX));
    for (i, row) in a.row_iter().enumerate() {
        let norm = row.norm();
        match classify_row(norm, b[i]) {
            Row::Skip => continue,
            Row::Contradiction => return Ok(Chebyshev::Empty),
            Row::Keep => add_row(&mut problem, &vars, row.iter().copied(), Some((r, norm)), b[i]),
        }
    }
    match problem.solve() {
        Ok(solution) => {
            let radius = solution[r];
            let center = DVector::from_iterator(vars.len(), vars.iter().map(|&v| solution[v]));
            if !radius.is_finite() || center.iter().any(|x| !x.is_finite()) {
                return Err(PolyError::SolverFailure {
                    detail: "non-finite Chebyshev center".into(),
                });
            }
            if radius >= 0.5 * LP_BOX {
                return Ok(Chebyshev::Unbounded);
            }
            Ok(Chebyshev::Ball { center, radius })
        }
        Err(minilp::Error::Infeasible) => Ok(Chebyshev::Empty),
        Err(minilp::Error::Unbounded) => Ok(Chebyshev::Unbounded),
    }
}
