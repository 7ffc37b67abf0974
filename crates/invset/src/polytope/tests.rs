use super::*;
use crate::error::PolyError;
use nalgebra::{dmatrix, dvector, DVector};
use proptest::prelude::*;

const TOL: f64 = 1e-6;

fn square(r: f64) -> Polytope {
    Polytope::from_box(&[-r, -r], &[r, r]).unwrap()
}

fn same_set(p: &Polytope, q: &Polytope) -> bool {
    subset_of(p, q, TOL) && subset_of(q, p, TOL)
}

fn triangle() -> Polytope {
    Polytope::from_vertices(&[dvector![0.0, 0.0], dvector![2.0, 0.0], dvector![0.0, 1.0]]).unwrap()
}

#[test]
fn halfspace_shapes_are_checked() {
    let err = Polytope::from_halfspaces(dmatrix![1.0, 0.0; 0.0, 1.0], dvector![1.0]).unwrap_err();
    assert!(matches!(err, PolyError::Dimension { expected: 2, found: 1, .. }));
    let err = Polytope::from_box(&[0.0, 0.0], &[1.0]).unwrap_err();
    assert!(matches!(err, PolyError::Dimension { .. }));
}

#[test]
fn box_and_range_vertices() {
    assert_eq!(square(1.0).vertices().unwrap().len(), 4);
    let cube = Polytope::from_box(&[-1.0, -2.0, 0.0], &[1.0, 2.0, 3.0]).unwrap();
    assert_eq!(cube.vertices().unwrap().len(), 8);
    let range = Polytope::from_range(-0.5, 2.0);
    let mut ends: Vec<f64> = range.vertices().unwrap().iter().map(|v| v[0]).collect();
    ends.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert!((ends[0] + 0.5).abs() < 1e-9 && (ends[1] - 2.0).abs() < 1e-9);
}

#[test]
fn hull_drops_interior_points_and_round_trips() {
    let pts = vec![
        dvector![-1.0, -1.0],
        dvector![1.0, -1.0],
        dvector![1.0, 1.0],
        dvector![-1.0, 1.0],
        dvector![0.2, 0.3],
        dvector![0.0, 1.0],
    ];
    let p = Polytope::from_vertices(&pts).unwrap();
    assert_eq!(p.n_halfspaces(), 4);
    assert_eq!(p.vertices().unwrap().len(), 4);
    assert!(same_set(&p, &square(1.0)));
}

#[test]
fn degenerate_points_are_rejected() {
    let collinear = [dvector![0.0, 0.0], dvector![1.0, 1.0], dvector![2.0, 2.0]];
    assert!(matches!(
        Polytope::from_vertices(&collinear),
        Err(PolyError::DegenerateInput { .. })
    ));
    assert!(matches!(
        Polytope::from_vertices(&[]),
        Err(PolyError::EmptyPolytope { .. })
    ));
}

#[test]
fn unbounded_enumeration_fails() {
    // Half-plane x <= 1.
    let p = Polytope::from_halfspaces(dmatrix![1.0, 0.0], dvector![1.0]).unwrap();
    assert!(!p.is_bounded().unwrap());
    assert!(matches!(p.vertices(), Err(PolyError::Enumeration { .. })));
}

#[test]
fn empty_polytope_behaviour() {
    let e = Polytope::empty(2);
    assert!(e.is_empty().unwrap());
    assert!(e.vertices().unwrap().is_empty());
    assert!(!e.contains_origin());
    assert!(matches!(scale(&e, 2.0), Err(PolyError::EmptyPolytope { .. })));
    // Contradictory box.
    let p = Polytope::from_box(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
    assert!(p.is_empty().unwrap());
}

#[test]
fn contains_checks_dimension() {
    let p = square(1.0);
    assert!(p.contains(&dvector![0.5, -1.0]));
    assert!(!p.contains(&dvector![1.5, 0.0]));
    assert!(!p.contains(&dvector![0.0, 0.0, 0.0]));
}

#[test]
fn intersect_is_idempotent() {
    let p = triangle();
    let pp = intersect(&p, &p).unwrap();
    assert_eq!(pp.n_halfspaces(), 2 * p.n_halfspaces());
    assert!(same_set(&pp, &p));
    assert_eq!(pp.vertices().unwrap().len(), 3);
}

#[test]
fn intersect_rejects_mixed_dimensions() {
    let cube = Polytope::from_box(&[0.0; 3], &[1.0; 3]).unwrap();
    assert!(matches!(
        intersect(&square(1.0), &cube),
        Err(PolyError::Dimension { .. })
    ));
}

#[test]
fn pontryagin_of_boxes_is_shrunk_box() {
    let p = square(1.0);
    let q = square(0.2);
    let d = pontryagin_diff(&p, &q).unwrap();
    assert!(same_set(&d, &square(0.8)));
}

#[test]
fn pontryagin_detects_infeasible_erosion() {
    let d = pontryagin_diff(&square(1.0), &square(1.5)).unwrap();
    assert!(d.is_empty().unwrap());
    assert!(matches!(
        pontryagin_diff(&square(1.0), &Polytope::empty(2)),
        Err(PolyError::EmptyPolytope { .. })
    ));
}

#[test]
fn minkowski_of_boxes_and_triangle() {
    let s = minkowski_sum(&square(1.0), &square(0.5)).unwrap();
    assert!(same_set(&s, &square(1.5)));

    let t = minkowski_sum(&triangle(), &square(0.1)).unwrap();
    assert!(t.contains(&dvector![2.1, -0.1]));
    assert!(t.contains(&dvector![-0.1, 1.1]));
    assert!(!t.contains(&dvector![2.1, 0.2]));
    assert_eq!(t.vertices().unwrap().len(), 5);
}

#[test]
fn minkowski_undoes_pontryagin() {
    let p = triangle();
    let q = square(0.1);
    let eroded = pontryagin_diff(&p, &q).unwrap();
    assert!(subset_of(&eroded, &p, TOL));
    let back = minkowski_sum(&eroded, &q).unwrap();
    assert!(subset_of(&back, &p, TOL));
}

#[test]
fn projection_methods_agree() {
    // Tilted 3D prism: |x + z| <= 1, |y| <= 2, |z| <= 1.
    let p = Polytope::from_halfspaces(
        dmatrix![
            1.0, 0.0, 1.0;
            -1.0, 0.0, -1.0;
            0.0, 1.0, 0.0;
            0.0, -1.0, 0.0;
            0.0, 0.0, 1.0;
            0.0, 0.0, -1.0
        ],
        dvector![1.0, 1.0, 2.0, 2.0, 1.0, 1.0],
    )
    .unwrap();
    let ve = project(&p, &[0, 1]).unwrap();
    let fm = project_with(&p, &[0, 1], ProjectionMethod::FourierMotzkin).unwrap();
    let expected = Polytope::from_box(&[-2.0, -2.0], &[2.0, 2.0]).unwrap();
    assert!(same_set(&ve, &expected));
    assert!(same_set(&fm, &expected));

    // Axis order is respected.
    let yx = project(&p, &[1, 0]).unwrap();
    assert!(yx.contains(&dvector![1.9, -1.9]));
    let zx = project(&p, &[2, 0]).unwrap();
    assert!(zx.contains(&dvector![1.0, -2.0]));
    assert!(!zx.contains(&dvector![1.0, 1.0]));
}

#[test]
fn projection_axes_are_validated() {
    let p = square(1.0);
    assert!(matches!(project(&p, &[2]), Err(PolyError::Dimension { .. })));
    assert!(matches!(project(&p, &[0, 0]), Err(PolyError::DegenerateInput { .. })));
    assert!(matches!(project(&p, &[]), Err(PolyError::DegenerateInput { .. })));
    let x = project(&p, &[0]).unwrap();
    assert!(same_set(&x, &Polytope::from_range(-1.0, 1.0)));
}

#[test]
fn scale_uses_vertices() {
    let s = scale(&square(1.0), 2.0).unwrap();
    assert!(same_set(&s, &square(2.0)));
    // Negative factor reflects through the origin.
    let t = scale(&triangle(), -1.0).unwrap();
    assert!(t.contains(&dvector![-1.8, -0.05]));
    assert!(!t.contains(&dvector![1.0, 0.1]));
    assert!(matches!(
        scale(&triangle(), 0.0),
        Err(PolyError::DegenerateInput { .. })
    ));
}

#[test]
fn subset_with_tolerance() {
    assert!(subset_of(&square(1.0), &square(2.0), 0.0));
    assert!(!subset_of(&square(2.0), &square(1.0), 0.0));
    assert!(subset_of(&square(1.0005), &square(1.0), 1e-3));
    let half_plane = Polytope::from_halfspaces(dmatrix![1.0, 0.0], dvector![1.0]).unwrap();
    assert!(!subset_of(&half_plane, &square(1.0), 1.0));
}

#[test]
fn union_collapses_nested_and_keeps_disjoint() {
    let nested = union(&square(0.5), &square(1.0)).unwrap();
    assert!(nested.is_convex_piece());
    let a = Polytope::from_box(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
    let b = Polytope::from_box(&[2.0, 0.0], &[3.0, 1.0]).unwrap();
    let u = union(&a, &b).unwrap();
    assert_eq!(u.pieces().len(), 2);
    assert!(u.contains(&dvector![2.5, 0.5]));
    assert!(!u.contains(&dvector![1.5, 0.5]));
    assert!(u.into_polytope().is_none());
}

#[test]
fn difference_carves_out_the_subtrahend() {
    let ring = difference(&square(1.0), &square(0.5)).unwrap();
    assert_eq!(ring.pieces().len(), 4);
    assert!(ring.contains(&dvector![0.9, 0.0]));
    assert!(ring.contains(&dvector![-0.7, 0.8]));
    assert!(!ring.contains(&dvector![0.1, 0.1]));
    for piece in ring.pieces() {
        assert!(subset_of(piece, &square(1.0), TOL));
    }

    let far = Polytope::from_box(&[5.0, 5.0], &[6.0, 6.0]).unwrap();
    assert!(difference(&square(1.0), &far).unwrap().is_convex_piece());
    assert!(difference(&square(0.5), &square(1.0)).unwrap().is_empty());
}

#[test]
fn hull_and_envelope_of_two_boxes() {
    let a = Polytope::from_box(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
    let b = Polytope::from_box(&[2.0, 0.0], &[3.0, 1.0]).unwrap();
    let h = hull(&a, &b).unwrap();
    let expected = Polytope::from_box(&[0.0, 0.0], &[3.0, 1.0]).unwrap();
    assert!(same_set(&h, &expected));

    let e = envelope(&a, &b).unwrap();
    assert!(e.is_bounded().unwrap());
    assert!(same_set(&e, &expected));

    // Envelope of a triangle and a shifted triangle is an outer bound of the hull.
    let t2 = Polytope::from_vertices(&[dvector![1.0, 0.0], dvector![3.0, 0.0], dvector![1.0, 1.0]])
        .unwrap();
    let h = hull(&triangle(), &t2).unwrap();
    let e = envelope(&triangle(), &t2).unwrap();
    if e.is_bounded().unwrap() {
        assert!(subset_of(&h, &e, TOL));
    }
}

#[test]
fn reduce_removes_redundant_rows() {
    let p = Polytope::from_halfspaces(
        dmatrix![1.0, 0.0; -1.0, 0.0; 0.0, 1.0; 0.0, -1.0; 1.0, 1.0; 2.0, 0.0],
        dvector![1.0, 1.0, 1.0, 1.0, 5.0, 2.0],
    )
    .unwrap();
    let r = reduce(&p).unwrap();
    assert_eq!(r.n_halfspaces(), 4);
    assert!(same_set(&r, &square(1.0)));
    assert!(reduce(&Polytope::from_box(&[1.0], &[0.0]).unwrap())
        .unwrap()
        .is_empty()
        .unwrap());
}

#[test]
fn boxes_survive_reduce_and_elimination() {
    // Every facet of a box is irredundant; its LP against the rest is unbounded.
    let r = reduce(&square(1.0)).unwrap();
    assert_eq!(r.n_halfspaces(), 4);
    let cube = Polytope::from_box(&[-1.0, -2.0, -3.0], &[1.0, 2.0, 3.0]).unwrap();
    assert_eq!(reduce(&cube).unwrap().n_halfspaces(), 6);
    let fm = project_with(&cube, &[0, 1], ProjectionMethod::FourierMotzkin).unwrap();
    assert!(same_set(&fm, &Polytope::from_box(&[-1.0, -2.0], &[1.0, 2.0]).unwrap()));
    assert!(envelope(&square(1.0), &square(2.0)).is_ok());
    assert!(difference(&square(2.0), &square(1.0)).is_ok());
}

#[test]
fn unbounded_directions_have_infinite_support() {
    let half = Polytope::from_halfspaces(dmatrix![-1.0, 0.0; 0.0, 1.0; 0.0, -1.0], dvector![1.0, 1.0, 1.0])
        .unwrap();
    assert_eq!(half.support(&dvector![1.0, 0.0]).unwrap(), f64::INFINITY);
    assert!((half.support(&dvector![-1.0, 0.0]).unwrap() - 1.0).abs() < 1e-9);
    assert!(!half.is_bounded().unwrap());
}

#[test]
fn support_function_of_box() {
    let p = square(1.0);
    assert!((p.support(&dvector![1.0, 2.0]).unwrap() - 3.0).abs() < 1e-9);
    assert!(matches!(
        p.support(&dvector![1.0]),
        Err(PolyError::Dimension { .. })
    ));
}

fn points_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-2.0f64..2.0, -2.0f64..2.0), 5..10)
}

fn to_points(raw: &[(f64, f64)]) -> Vec<DVector<f64>> {
    raw.iter().map(|&(x, y)| dvector![x, y]).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_round_trip_membership(raw in points_strategy()) {
        let Ok(p) = Polytope::from_vertices(&to_points(&raw)) else {
            return Ok(());
        };
        prop_assume!(p.is_full_dimensional().unwrap());
        let verts = p.vertices().unwrap().to_vec();
        let q = Polytope::from_vertices(&verts).unwrap();
        prop_assert!(same_set(&p, &q));
        for (x, y) in raw {
            prop_assert!(q.contains(&dvector![x, y]) || !p.contains(&dvector![x, y]));
        }
    }

    #[test]
    fn prop_erosion_is_subset_and_dual(raw in points_strategy(), r in 0.01f64..0.3) {
        let Ok(p) = Polytope::from_vertices(&to_points(&raw)) else {
            return Ok(());
        };
        let q = square(r);
        let eroded = pontryagin_diff(&p, &q).unwrap();
        prop_assume!(eroded.is_full_dimensional().unwrap());
        prop_assert!(subset_of(&eroded, &p, TOL));
        let back = minkowski_sum(&eroded, &q).unwrap();
        prop_assert!(subset_of(&back, &p, 1e-5));
    }

    #[test]
    fn prop_intersect_self_is_self(lo in -3.0f64..-0.5, hi in 0.5f64..3.0) {
        let p = Polytope::from_box(&[lo, lo], &[hi, hi]).unwrap();
        let pp = intersect(&p, &p).unwrap();
        prop_assert!(same_set(&p, &pp));
    }
}
