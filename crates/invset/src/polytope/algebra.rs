//! Set operations on polytopes.
//!
//! Exactness
//! - `intersect` is exact row stacking (no LP).
//! - `minkowski_sum` and `project` are exact up to floating tolerance.
//! - `pontryagin_diff` solves one support-function LP per row of the minuend;
//!   rows are independent, so order and batching do not change the result.
//! - `envelope` is an outer approximation of the union; it may be unbounded.
//!
//! Projection
//! - `ProjectionMethod::VertexEnumeration` enumerates vertices, drops the
//!   eliminated coordinates and takes the hull (needs a bounded input and a
//!   full-dimensional image).
//! - `ProjectionMethod::FourierMotzkin` eliminates one coordinate at a time
//!   and prunes redundant rows with LPs after each step. The elimination order
//!   only changes intermediate row counts, never the projected point set.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::region::Shape;
use super::types::Polytope;
use super::util::{normalize_rows, quantize_facet, stack_rows, vcat, vstack, Normalized, UnitRow};
use crate::cfg::{FACET_QUANTUM, FEAS_EPS, ZERO_ROW_EPS};
use crate::error::{check_dim, PolyError, Result};
use crate::lp::{maximize, LpOutcome};

/// How `project` eliminates coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProjectionMethod {
    #[default]
    VertexEnumeration,
    FourierMotzkin,
}

#[inline]
fn check_same_dim(context: &'static str, p1: &Polytope, p2: &Polytope) -> Result<()> {
    check_dim(context, p1.dim(), p2.dim())
}

/// `p1 ∩ p2` by stacking both H-representations.
pub fn intersect(p1: &Polytope, p2: &Polytope) -> Result<Polytope> {
    check_same_dim("intersect", p1, p2)?;
    Ok(Polytope::from_parts(
        vstack(p1.a(), p2.a()),
        vcat(p1.b(), p2.b()),
    ))
}

/// `p1 ∪ p2` as a region. Collapses to one polytope only when an operand
/// is empty or one contains the other.
pub fn union(p1: &Polytope, p2: &Polytope) -> Result<Shape> {
    check_same_dim("union", p1, p2)?;
    let shape = match (p1.is_empty()?, p2.is_empty()?) {
        (true, true) => Shape::Region(Vec::new()),
        (true, false) => Shape::Polytope(p2.clone()),
        (false, true) => Shape::Polytope(p1.clone()),
        (false, false) => {
            if subset_of(p1, p2, FEAS_EPS) {
                Shape::Polytope(p2.clone())
            } else if subset_of(p2, p1, FEAS_EPS) {
                Shape::Polytope(p1.clone())
            } else {
                Shape::Region(vec![p1.clone(), p2.clone()])
            }
        }
    };
    Ok(shape)
}

/// `p1 ∧ ¬p2`: convex pieces `p1 ∩ {a_j x <= b_j, j < i} ∩ {a_i x >= b_i}` over
/// the irredundant rows of `p2`. Flat slivers are dropped.
pub fn difference(p1: &Polytope, p2: &Polytope) -> Result<Shape> {
    check_same_dim("difference", p1, p2)?;
    if p1.is_empty()? {
        return Ok(Shape::Region(Vec::new()));
    }
    if !intersect(p1, p2)?.is_full_dimensional()? {
        return Ok(Shape::Polytope(p1.clone()));
    }
    let cut = reduce(p2)?;
    let mut acc_a = p1.a().clone();
    let mut acc_b = p1.b().clone();
    let mut pieces = Vec::new();
    for i in 0..cut.n_halfspaces() {
        let row = DMatrix::from_fn(1, cut.dim(), |_, j| cut.a()[(i, j)]);
        let rhs = DVector::from_element(1, cut.b()[i]);
        let piece = Polytope::from_parts(vstack(&acc_a, &(-&row)), vcat(&acc_b, &(-&rhs)));
        if piece.is_full_dimensional()? {
            pieces.push(reduce(&piece)?);
        }
        acc_a = vstack(&acc_a, &row);
        acc_b = vcat(&acc_b, &rhs);
    }
    Ok(Shape::from_pieces(pieces))
}

/// Convex hull of both vertex sets.
pub fn hull(p1: &Polytope, p2: &Polytope) -> Result<Polytope> {
    check_same_dim("hull", p1, p2)?;
    let mut pts = p1.vertices()?.to_vec();
    pts.extend_from_slice(p2.vertices()?);
    if pts.is_empty() {
        return Err(PolyError::EmptyPolytope { context: "hull" });
    }
    Polytope::from_vertices(&pts)
}

/// Keep the rows of `src` that every point of `other` satisfies.
fn rows_valid_for(src: &Polytope, other: &Polytope, out: &mut Vec<UnitRow>) -> Result<()> {
    for (i, row) in src.a().row_iter().enumerate() {
        let d = row.transpose();
        let c = src.b()[i];
        let s = other.support(&d)?;
        if s <= c + FEAS_EPS * (1.0 + c.abs()) {
            out.push(UnitRow { n: d, c });
        }
    }
    Ok(())
}

/// Envelope of `p1 ∪ p2`: each operand's own irredundant constraints that stay
/// valid for the other operand. Outer approximation, cheaper than `hull`.
pub fn envelope(p1: &Polytope, p2: &Polytope) -> Result<Polytope> {
    check_same_dim("envelope", p1, p2)?;
    match (p1.is_empty()?, p2.is_empty()?) {
        (true, _) => return Ok(p2.clone()),
        (_, true) => return Ok(p1.clone()),
        _ => {}
    }
    let (r1, r2) = (reduce(p1)?, reduce(p2)?);
    let mut rows = Vec::new();
    rows_valid_for(&r1, &r2, &mut rows)?;
    rows_valid_for(&r2, &r1, &mut rows)?;
    let (a, b) = stack_rows(&rows, p1.dim());
    Ok(Polytope::from_parts(a, b))
}

/// `p1 ⊕ p2` via the lifted system over `(x, y)`:
/// `H1 y <= K1`, `H2 (x - y) <= K2`, projected onto `x`.
pub fn minkowski_sum(p1: &Polytope, p2: &Polytope) -> Result<Polytope> {
    check_same_dim("minkowski sum", p1, p2)?;
    let n = p1.dim();
    if p1.is_empty()? || p2.is_empty()? {
        return Ok(Polytope::empty(n));
    }
    let (m1, m2) = (p1.n_halfspaces(), p2.n_halfspaces());
    let mut a = DMatrix::zeros(m1 + m2, 2 * n);
    a.view_mut((0, n), (m1, n)).copy_from(p1.a());
    a.view_mut((m1, 0), (m2, n)).copy_from(p2.a());
    a.view_mut((m1, n), (m2, n)).copy_from(&(-p2.a()));
    let lifted = Polytope::from_parts(a, vcat(p1.b(), p2.b()));
    let axes: Vec<usize> = (0..n).collect();
    project(&lifted, &axes)
}

/// Pontryagin difference `p1 ⊖ p2 = {x : x + p2 ⊆ p1}`.
///
/// Row `i` of `p1` keeps its normal and gets `K1[i] - h_p2(H1[i,:])`. An
/// infeasible erosion returns `Polytope::empty`.
pub fn pontryagin_diff(p1: &Polytope, p2: &Polytope) -> Result<Polytope> {
    check_same_dim("pontryagin difference", p1, p2)?;
    let n = p1.dim();
    if p2.is_empty()? {
        return Err(PolyError::EmptyPolytope {
            context: "pontryagin difference subtrahend",
        });
    }
    let mut b = p1.b().clone();
    for (i, row) in p1.a().row_iter().enumerate() {
        let s = p2.support(&row.transpose())?;
        if s.is_infinite() {
            debug!(row = i, "subtrahend unbounded along constraint normal");
            return Ok(Polytope::empty(n));
        }
        b[i] -= s;
    }
    let eroded = Polytope::from_parts(p1.a().clone(), b);
    if eroded.is_empty()? {
        debug!(rows = p1.n_halfspaces(), "erosion is empty");
        return Ok(Polytope::empty(n));
    }
    Ok(eroded)
}

fn check_axes(p: &Polytope, axes: &[usize]) -> Result<()> {
    if axes.is_empty() {
        return Err(PolyError::DegenerateInput {
            context: "projection axes",
            detail: "no axes requested".into(),
        });
    }
    for (k, &ax) in axes.iter().enumerate() {
        if ax >= p.dim() {
            return Err(PolyError::Dimension {
                context: "projection axis",
                expected: p.dim(),
                found: ax,
            });
        }
        if axes[..k].contains(&ax) {
            return Err(PolyError::DegenerateInput {
                context: "projection axes",
                detail: format!("axis {} listed twice", ax),
            });
        }
    }
    Ok(())
}

/// Orthogonal projection onto `axes` (in the given order), by vertex enumeration.
pub fn project(p: &Polytope, axes: &[usize]) -> Result<Polytope> {
    project_with(p, axes, ProjectionMethod::default())
}

/// Orthogonal projection onto `axes` with an explicit elimination method.
pub fn project_with(p: &Polytope, axes: &[usize], method: ProjectionMethod) -> Result<Polytope> {
    check_axes(p, axes)?;
    let k = axes.len();
    if k == p.dim() && axes.iter().enumerate().all(|(i, &ax)| i == ax) {
        return Ok(p.clone());
    }
    match method {
        ProjectionMethod::VertexEnumeration => {
            let verts = p.vertices()?;
            if verts.is_empty() {
                return Ok(Polytope::empty(k));
            }
            let pts: Vec<DVector<f64>> = verts
                .iter()
                .map(|v| DVector::from_iterator(k, axes.iter().map(|&i| v[i])))
                .collect();
            Polytope::from_vertices(&pts)
        }
        ProjectionMethod::FourierMotzkin => project_fourier_motzkin(p, axes),
    }
}

fn project_fourier_motzkin(p: &Polytope, axes: &[usize]) -> Result<Polytope> {
    let (n, k) = (p.dim(), axes.len());
    if p.is_empty()? {
        return Ok(Polytope::empty(k));
    }
    // Kept axes first (in request order), eliminated axes after.
    let order: Vec<usize> = axes
        .iter()
        .copied()
        .chain((0..n).filter(|i| !axes.contains(i)))
        .collect();
    let mut a = DMatrix::from_fn(p.n_halfspaces(), n, |i, j| p.a()[(i, order[j])]);
    let mut b = p.b().clone();
    for _ in k..n {
        let (a_next, b_next) = eliminate_last(&a, &b);
        let pruned = reduce(&Polytope::from_parts(a_next, b_next))?;
        debug!(
            remaining = pruned.dim(),
            rows = pruned.n_halfspaces(),
            "eliminated coordinate"
        );
        a = pruned.a().clone();
        b = pruned.b().clone();
    }
    Ok(Polytope::from_parts(a, b))
}

/// One Fourier–Motzkin step on the last column.
fn eliminate_last(a: &DMatrix<f64>, b: &DVector<f64>) -> (DMatrix<f64>, DVector<f64>) {
    let col = a.ncols() - 1;
    let mut rows: Vec<UnitRow> = Vec::new();
    let mut pos = Vec::new();
    let mut neg = Vec::new();
    for i in 0..a.nrows() {
        let coef = a[(i, col)];
        if coef > ZERO_ROW_EPS {
            pos.push(i);
        } else if coef < -ZERO_ROW_EPS {
            neg.push(i);
        } else {
            rows.push(UnitRow {
                n: a.row(i).columns(0, col).transpose(),
                c: b[i],
            });
        }
    }
    for &i in &pos {
        for &j in &neg {
            let (ci, cj) = (a[(i, col)], -a[(j, col)]);
            let combined = a.row(i) * cj + a.row(j) * ci;
            rows.push(UnitRow {
                n: combined.columns(0, col).transpose(),
                c: b[i] * cj + b[j] * ci,
            });
        }
    }
    stack_rows(&rows, col)
}

/// Scale every vertex by `k` and take the hull.
pub fn scale(p: &Polytope, k: f64) -> Result<Polytope> {
    let verts = p.vertices()?;
    if verts.is_empty() {
        return Err(PolyError::EmptyPolytope { context: "scale" });
    }
    let pts: Vec<DVector<f64>> = verts.iter().map(|v| v * k).collect();
    Polytope::from_vertices(&pts)
}

/// `p1 ⊆ p2` within `tol`: every vertex of `p1` against every row of `p2`.
/// Never fails; unenumerable or mismatched inputs give `false`.
pub fn subset_of(p1: &Polytope, p2: &Polytope, tol: f64) -> bool {
    if p1.dim() != p2.dim() {
        return false;
    }
    let Ok(verts) = p1.vertices() else {
        return false;
    };
    verts.iter().all(|v| {
        let hv = p2.a() * v;
        hv.iter().zip(p2.b().iter()).all(|(l, r)| *l <= r + tol)
    })
}

/// Drop redundant rows (one LP per row); rows come back unit-normalized.
/// Empty inputs reduce to `Polytope::empty`.
pub fn reduce(p: &Polytope) -> Result<Polytope> {
    let n = p.dim();
    let rows = match normalize_rows(p.a(), p.b(), FEAS_EPS) {
        Normalized::Rows(rows) => rows,
        Normalized::Contradiction => return Ok(Polytope::empty(n)),
    };
    if p.is_empty()? {
        return Ok(Polytope::empty(n));
    }
    // Parallel duplicates: keep the tightest offset per normal.
    let mut by_normal: HashMap<Vec<i64>, usize> = HashMap::new();
    let mut unique: Vec<UnitRow> = Vec::with_capacity(rows.len());
    for r in rows {
        let key = quantize_facet(&r.n, 0.0, FACET_QUANTUM);
        match by_normal.get(&key) {
            Some(&idx) => unique[idx].c = unique[idx].c.min(r.c),
            None => {
                by_normal.insert(key, unique.len());
                unique.push(r);
            }
        }
    }
    let mut keep = vec![true; unique.len()];
    for i in 0..unique.len() {
        let others: Vec<UnitRow> = unique
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i && keep[*j])
            .map(|(_, r)| r.clone())
            .collect();
        if others.is_empty() {
            continue;
        }
        let (a, b) = stack_rows(&others, n);
        if let LpOutcome::Optimal { value, .. } = maximize(&unique[i].n, &a, &b)? {
            if value <= unique[i].c + FEAS_EPS * (1.0 + unique[i].c.abs()) {
                keep[i] = false;
            }
        }
    }
    let kept: Vec<UnitRow> = unique
        .into_iter()
        .zip(keep)
        .filter_map(|(r, k)| k.then_some(r))
        .collect();
    debug!(before = p.n_halfspaces(), after = kept.len(), "reduced halfspaces");
    let (a, b) = stack_rows(&kept, n);
    Ok(Polytope::from_parts(a, b))
}
