//! `Shape`: a single convex polytope or a region (union of polytopes).
//!
//! `union` and `difference` may produce several convex pieces; operations that
//! need one convex set (`hull`, `envelope`) take `Polytope` only.

use nalgebra::DVector;

use super::types::Polytope;

#[derive(Clone, Debug)]
pub enum Shape {
    Polytope(Polytope),
    /// Ordered, possibly overlapping or disjoint pieces; empty vec = empty set.
    Region(Vec<Polytope>),
}

impl Shape {
    /// Collapse a piece list: one piece becomes `Shape::Polytope`.
    pub(crate) fn from_pieces(mut pieces: Vec<Polytope>) -> Self {
        if pieces.len() == 1 {
            if let Some(p) = pieces.pop() {
                return Shape::Polytope(p);
            }
        }
        Shape::Region(pieces)
    }

    pub fn pieces(&self) -> &[Polytope] {
        match self {
            Shape::Polytope(p) => std::slice::from_ref(p),
            Shape::Region(ps) => ps,
        }
    }

    #[inline]
    pub fn is_convex_piece(&self) -> bool {
        matches!(self, Shape::Polytope(_))
    }

    /// True when no piece is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces().is_empty()
    }

    pub fn contains(&self, point: &DVector<f64>) -> bool {
        self.pieces().iter().any(|p| p.contains(point))
    }

    pub fn into_polytope(self) -> Option<Polytope> {
        match self {
            Shape::Polytope(p) => Some(p),
            Shape::Region(_) => None,
        }
    }
}
