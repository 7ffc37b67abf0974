//! H↔V conversions for polytopes of any dimension.
//!
//! - H→V: enumerate `n`-tuples of (unit-normalized) constraints, solve the
//!   square system, keep feasible intersection points, dedup geometrically.
//! - V→H: enumerate `n`-tuples of points, take the hyperplane through them,
//!   keep it when every point lies on one side (oriented so `n·x <= c`).
//!
//! Both are combinatorial (`O(m^n)` / `O(V^n)`) and meant for the small
//! dimensions of state/input spaces. Tuple counts above
//! `MAX_COMBINATIONS` are refused instead of stalling.

use std::collections::HashSet;

use itertools::Itertools;
use nalgebra::{DMatrix, DVector};

use super::util::{
    binomial, dedup_points, normalize_rows, push_unique, quantize_facet, stack_rows, Normalized,
    UnitRow,
};
use crate::cfg::{DEDUP_EPS, DET_EPS, FACET_QUANTUM, FEAS_EPS, RANK_EPS};
use crate::error::{PolyError, Result};
use crate::lp::{chebyshev_ball, maximize, Chebyshev, LpOutcome};

const MAX_COMBINATIONS: u64 = 20_000_000;

/// True when `{x : A x <= b}` is bounded (assumed non-empty): one LP per signed axis.
pub(crate) fn is_bounded(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<bool> {
    let n = a.ncols();
    for j in 0..n {
        for sign in [1.0, -1.0] {
            let mut c = DVector::zeros(n);
            c[j] = sign;
            if let LpOutcome::Unbounded = maximize(&c, a, b)? {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Extreme points of `{x : A x <= b}`; empty for an empty polytope.
pub(crate) fn h_to_vertices(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<Vec<DVector<f64>>> {
    let n = a.ncols();
    if n == 0 {
        return Err(PolyError::Enumeration {
            detail: "zero-dimensional ambient space".into(),
        });
    }
    match chebyshev_ball(a, b)? {
        Chebyshev::Empty => return Ok(Vec::new()),
        Chebyshev::Unbounded => {
            return Err(PolyError::Enumeration {
                detail: "polytope is unbounded".into(),
            })
        }
        Chebyshev::Ball { .. } => {}
    }
    if !is_bounded(a, b)? {
        return Err(PolyError::Enumeration {
            detail: "polytope is unbounded".into(),
        });
    }
    let rows = match normalize_rows(a, b, FEAS_EPS) {
        Normalized::Rows(rows) => rows,
        Normalized::Contradiction => return Ok(Vec::new()),
    };
    if rows.len() < n {
        return Err(PolyError::Enumeration {
            detail: format!("{} constraints cannot bound a {}-dimensional set", rows.len(), n),
        });
    }
    let count = binomial(rows.len(), n);
    if count > MAX_COMBINATIONS {
        return Err(PolyError::Enumeration {
            detail: format!("{} constraint tuples exceed the enumeration limit", count),
        });
    }

    let mut out: Vec<DVector<f64>> = Vec::new();
    for comb in (0..rows.len()).combinations(n) {
        let m = DMatrix::from_fn(n, n, |r, c| rows[comb[r]].n[c]);
        if m.determinant().abs() <= DET_EPS {
            continue;
        }
        let rhs = DVector::from_fn(n, |r, _| rows[comb[r]].c);
        let Some(x) = m.lu().solve(&rhs) else {
            continue;
        };
        let slack = FEAS_EPS * (1.0 + x.amax());
        if rows.iter().all(|r| r.n.dot(&x) <= r.c + slack) {
            push_unique(&mut out, x, DEDUP_EPS);
        }
    }
    if out.is_empty() {
        return Err(PolyError::Enumeration {
            detail: "no feasible constraint intersection found".into(),
        });
    }
    Ok(out)
}

/// Affine rank of a point cloud (rank of differences to the first point).
pub(crate) fn affine_rank(points: &[DVector<f64>]) -> usize {
    if points.len() < 2 {
        return 0;
    }
    let n = points[0].len();
    let diffs = DMatrix::from_fn(points.len() - 1, n, |i, j| points[i + 1][j] - points[0][j]);
    let scale = diffs.amax().max(1.0);
    diffs
        .singular_values()
        .iter()
        .filter(|&&s| s > RANK_EPS * scale)
        .count()
}

/// Unit normal of the hyperplane through `n` points in R^n (None if they are
/// affinely dependent).
fn hyperplane_normal(points: &[&DVector<f64>]) -> Option<DVector<f64>> {
    let n = points[0].len();
    if n == 1 {
        return Some(DVector::from_element(1, 1.0));
    }
    // Rows p_k - p_0 (k >= 1) padded with a zero row to make the system square.
    let m = DMatrix::from_fn(n, n, |i, j| {
        if i + 1 < n {
            points[i + 1][j] - points[0][j]
        } else {
            0.0
        }
    });
    let scale = m.amax().max(1.0);
    let svd = m.svd(false, true);
    let v_t = svd.v_t?;
    let (imin, _) = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
    let rank = svd
        .singular_values
        .iter()
        .filter(|&&s| s > RANK_EPS * scale)
        .count();
    if rank < n - 1 {
        return None;
    }
    let normal = v_t.row(imin).transpose();
    let norm = normal.norm();
    if !norm.is_finite() || norm <= 0.0 {
        return None;
    }
    Some(normal / norm)
}

/// Convex hull of a full-dimensional point cloud as unit-normal facets.
pub(crate) fn v_to_halfspaces(points: &[DVector<f64>]) -> Result<(DMatrix<f64>, DVector<f64>)> {
    let first = points.first().ok_or(PolyError::EmptyPolytope {
        context: "convex hull",
    })?;
    let n = first.len();
    if n == 0 {
        return Err(PolyError::DegenerateInput {
            context: "convex hull",
            detail: "points live in a zero-dimensional space".into(),
        });
    }
    if let Some(bad) = points.iter().find(|p| p.len() != n) {
        return Err(PolyError::Dimension {
            context: "convex hull points",
            expected: n,
            found: bad.len(),
        });
    }
    if points.iter().any(|p| p.iter().any(|x| !x.is_finite())) {
        return Err(PolyError::DegenerateInput {
            context: "convex hull",
            detail: "non-finite coordinate".into(),
        });
    }
    let pts = dedup_points(points, DEDUP_EPS);
    if pts.len() < n + 1 || affine_rank(&pts) < n {
        return Err(PolyError::DegenerateInput {
            context: "convex hull",
            detail: format!(
                "{} distinct points do not span a {}-dimensional polytope",
                pts.len(),
                n
            ),
        });
    }
    let count = binomial(pts.len(), n);
    if count > MAX_COMBINATIONS {
        return Err(PolyError::DegenerateInput {
            context: "convex hull",
            detail: format!("{} point tuples exceed the hull limit", count),
        });
    }

    let extent = pts.iter().map(|p| p.amax()).fold(1.0, f64::max);
    let side_eps = FEAS_EPS * extent;
    let mut seen = HashSet::new();
    let mut facets: Vec<UnitRow> = Vec::new();
    for comb in (0..pts.len()).combinations(n) {
        let tuple: Vec<&DVector<f64>> = comb.iter().map(|&i| &pts[i]).collect();
        let Some(normal) = hyperplane_normal(&tuple) else {
            continue;
        };
        let c = normal.dot(tuple[0]);
        let below = pts.iter().all(|p| normal.dot(p) <= c + side_eps);
        let above = pts.iter().all(|p| normal.dot(p) >= c - side_eps);
        let (n_out, c_out) = match (below, above) {
            (true, false) => (normal, c),
            (false, true) => (-normal, -c),
            _ => continue,
        };
        if seen.insert(quantize_facet(&n_out, c_out, FACET_QUANTUM)) {
            facets.push(UnitRow { n: n_out, c: c_out });
        }
    }
    if facets.len() < n + 1 {
        return Err(PolyError::DegenerateInput {
            context: "convex hull",
            detail: format!("only {} supporting facets found", facets.len()),
        });
    }
    Ok(stack_rows(&facets, n))
}
