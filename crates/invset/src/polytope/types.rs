//! The `Polytope` type: H-representation plus a lazy vertex cache.

use std::cell::OnceCell;

use nalgebra::{DMatrix, DVector};

use super::convert::{h_to_vertices, is_bounded, v_to_halfspaces};
use crate::cfg::{FEAS_EPS, FLAT_EPS};
use crate::error::{check_dim, PolyError, Result};
use crate::lp::{chebyshev_ball, maximize, Chebyshev, LpOutcome};

/// Convex polyhedron `{x : A x <= b}` in R^n.
///
/// Invariants:
/// - `a` is `m × n`, `b` has length `m`; rows need not be minimal or normalized.
/// - `vertices` caches the V-representation once enumerated; the H-rep is
///   never mutated after construction, so the cache cannot go stale.
#[derive(Clone, Debug)]
pub struct Polytope {
    a: DMatrix<f64>,
    b: DVector<f64>,
    vertices: OnceCell<Vec<DVector<f64>>>,
}

impl Polytope {
    /// `{x : A x <= b}`. Only shapes are checked.
    pub fn from_halfspaces(a: DMatrix<f64>, b: DVector<f64>) -> Result<Self> {
        check_dim("halfspace rows vs right-hand side", a.nrows(), b.len())?;
        Ok(Self::from_parts(a, b))
    }

    #[inline]
    pub(crate) fn from_parts(a: DMatrix<f64>, b: DVector<f64>) -> Self {
        Self {
            a,
            b,
            vertices: OnceCell::new(),
        }
    }

    /// Convex hull of `points`; the points must span R^n.
    pub fn from_vertices(points: &[DVector<f64>]) -> Result<Self> {
        let (a, b) = v_to_halfspaces(points)?;
        Ok(Self::from_parts(a, b))
    }

    /// Axis-aligned box `lower <= x <= upper`.
    pub fn from_box(lower: &[f64], upper: &[f64]) -> Result<Self> {
        check_dim("box bounds", lower.len(), upper.len())?;
        let n = lower.len();
        let mut a = DMatrix::zeros(2 * n, n);
        let mut b = DVector::zeros(2 * n);
        for i in 0..n {
            a[(2 * i, i)] = 1.0;
            b[2 * i] = upper[i];
            a[(2 * i + 1, i)] = -1.0;
            b[2 * i + 1] = -lower[i];
        }
        Ok(Self::from_parts(a, b))
    }

    /// Interval `[lower, upper]` in R^1.
    pub fn from_range(lower: f64, upper: f64) -> Self {
        Self::from_parts(
            DMatrix::from_column_slice(2, 1, &[1.0, -1.0]),
            DVector::from_column_slice(&[upper, -lower]),
        )
    }

    /// Canonical empty polytope in R^dim (`0·x <= -1`).
    pub fn empty(dim: usize) -> Self {
        let poly = Self::from_parts(DMatrix::zeros(1, dim), DVector::from_element(1, -1.0));
        let _ = poly.vertices.set(Vec::new());
        poly
    }

    /// Ambient dimension `n`.
    #[inline]
    pub fn dim(&self) -> usize {
        self.a.ncols()
    }

    #[inline]
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    #[inline]
    pub fn b(&self) -> &DVector<f64> {
        &self.b
    }

    #[inline]
    pub fn n_halfspaces(&self) -> usize {
        self.a.nrows()
    }

    /// `A·point <= b` elementwise (with `FEAS_EPS` slack). Wrong-length points
    /// are never members.
    pub fn contains(&self, point: &DVector<f64>) -> bool {
        if point.len() != self.dim() {
            return false;
        }
        let ax = &self.a * point;
        ax.iter().zip(self.b.iter()).all(|(l, r)| *l <= r + FEAS_EPS)
    }

    #[inline]
    pub fn contains_origin(&self) -> bool {
        self.contains(&DVector::zeros(self.dim()))
    }

    /// Extreme points (vertex enumeration on first call, cached afterwards).
    pub fn vertices(&self) -> Result<&[DVector<f64>]> {
        if let Some(v) = self.vertices.get() {
            return Ok(v);
        }
        let verts = h_to_vertices(&self.a, &self.b)?;
        Ok(self.vertices.get_or_init(|| verts))
    }

    /// Alias of [`Polytope::vertices`] for callers that only need the vertex list.
    #[inline]
    pub fn extreme_points(&self) -> Result<&[DVector<f64>]> {
        self.vertices()
    }

    /// Largest inscribed ball.
    pub fn chebyshev(&self) -> Result<Chebyshev> {
        chebyshev_ball(&self.a, &self.b)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(matches!(self.chebyshev()?, Chebyshev::Empty))
    }

    /// Non-empty with a strictly positive inscribed radius.
    pub fn is_full_dimensional(&self) -> Result<bool> {
        Ok(match self.chebyshev()? {
            Chebyshev::Empty => false,
            Chebyshev::Unbounded => true,
            Chebyshev::Ball { radius, .. } => radius > FLAT_EPS,
        })
    }

    /// Bounded in every coordinate direction (empty sets count as bounded).
    pub fn is_bounded(&self) -> Result<bool> {
        if self.is_empty()? {
            return Ok(true);
        }
        is_bounded(&self.a, &self.b)
    }

    /// Support function `max_{x∈P} d·x`; `+∞` for unbounded directions.
    pub fn support(&self, d: &DVector<f64>) -> Result<f64> {
        check_dim("support direction", self.dim(), d.len())?;
        match maximize(d, &self.a, &self.b)? {
            LpOutcome::Optimal { value, .. } => Ok(value),
            LpOutcome::Unbounded => Ok(f64::INFINITY),
            LpOutcome::Infeasible => Err(PolyError::EmptyPolytope {
                context: "support function",
            }),
        }
    }
}
