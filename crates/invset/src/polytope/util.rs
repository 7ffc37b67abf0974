//! Small helpers: row normalization, point dedup, facet quantization.

use nalgebra::{DMatrix, DVector};

use crate::cfg::ZERO_ROW_EPS;

/// Normalized inequality `n·x <= c` with `||n|| = 1`.
#[derive(Clone, Debug)]
pub(crate) struct UnitRow {
    pub n: DVector<f64>,
    pub c: f64,
}

/// Result of normalizing an H-representation.
pub(crate) enum Normalized {
    Rows(Vec<UnitRow>),
    /// Some row reads `0·x <= c` with `c < 0`.
    Contradiction,
}

/// Rescale rows to unit normals; drop trivially true zero rows.
pub(crate) fn normalize_rows(a: &DMatrix<f64>, b: &DVector<f64>, feas_eps: f64) -> Normalized {
    let mut rows = Vec::with_capacity(a.nrows());
    for (i, row) in a.row_iter().enumerate() {
        let norm = row.norm();
        if norm <= ZERO_ROW_EPS {
            if b[i] < -feas_eps {
                return Normalized::Contradiction;
            }
            continue;
        }
        rows.push(UnitRow {
            n: row.transpose() / norm,
            c: b[i] / norm,
        });
    }
    Normalized::Rows(rows)
}

/// Stack unit rows back into `(A, b)` with `dim` columns.
pub(crate) fn stack_rows(rows: &[UnitRow], dim: usize) -> (DMatrix<f64>, DVector<f64>) {
    let a = DMatrix::from_fn(rows.len(), dim, |i, j| rows[i].n[j]);
    let b = DVector::from_iterator(rows.len(), rows.iter().map(|r| r.c));
    (a, b)
}

/// Row-stack two matrices with equal column counts.
pub(crate) fn vstack(top: &DMatrix<f64>, bottom: &DMatrix<f64>) -> DMatrix<f64> {
    let (m1, n) = top.shape();
    DMatrix::from_fn(m1 + bottom.nrows(), n, |i, j| {
        if i < m1 {
            top[(i, j)]
        } else {
            bottom[(i - m1, j)]
        }
    })
}

pub(crate) fn vcat(top: &DVector<f64>, bottom: &DVector<f64>) -> DVector<f64> {
    DVector::from_iterator(
        top.len() + bottom.len(),
        top.iter().chain(bottom.iter()).copied(),
    )
}

/// Push `p` unless a point within `tol` is already present.
pub(crate) fn push_unique(points: &mut Vec<DVector<f64>>, p: DVector<f64>, tol: f64) {
    if points.iter().all(|q| (q - &p).amax() > tol) {
        points.push(p);
    }
}

pub(crate) fn dedup_points(points: &[DVector<f64>], tol: f64) -> Vec<DVector<f64>> {
    let mut out = Vec::with_capacity(points.len());
    for p in points {
        push_unique(&mut out, p.clone(), tol);
    }
    out
}

/// Integer key for a facet `(n, c)`; numerically equal facets collide.
pub(crate) fn quantize_facet(n: &DVector<f64>, c: f64, quantum: f64) -> Vec<i64> {
    let s = 1.0 / quantum;
    n.iter()
        .chain(std::iter::once(&c))
        .map(|x| (x * s).round() as i64)
        .collect()
}

/// `n choose k`, saturating at `u64::MAX`.
pub(crate) fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u64 = 1;
    for i in 0..k {
        acc = match acc.checked_mul((n - i) as u64) {
            Some(v) => v / (i as u64 + 1),
            None => return u64::MAX,
        };
    }
    acc
}
