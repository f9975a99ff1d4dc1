use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::{CubicPath, Point3, QueryError, Tolerance};

fn coord(rng: &mut StdRng) -> f64 {
    rng.random_range(-4.0..4.0)
}

fn arch() -> Vec<Point3> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(2.0, 1.0, 0.0),
        Point3::new(3.0, 0.0, 0.0),
    ]
}

fn s_curve() -> Vec<Point3> {
    let mut points = arch();
    points.extend([
        Point3::new(4.0, -1.0, 0.0),
        Point3::new(5.0, -1.0, 0.0),
        Point3::new(6.0, 0.0, 0.0),
    ]);
    points
}

#[test]
fn arch_apex_is_found_in_the_interior() {
    let path = CubicPath::from_points(&arch(), Tolerance::DEFAULT).unwrap();
    let projection = path.closest_point(Point3::new(1.5, 1.0, 0.0)).unwrap();
    assert_eq!(projection.index, 0);
    assert!((projection.parameter - 0.5).abs() < 1e-4);
    assert!((projection.distance - 0.25).abs() < 1e-8);
    assert!(Tolerance::new(1e-4).approx_eq_point3(projection.closest, Point3::new(1.5, 0.75, 0.0)));
}

#[test]
fn far_query_beyond_the_end_snaps_to_the_end_point() {
    let path = CubicPath::from_points(&arch(), Tolerance::DEFAULT).unwrap();
    let projection = path.closest_point(Point3::new(10.0, 0.0, 0.0)).unwrap();
    assert_eq!(projection.index, 0);
    assert_eq!(projection.parameter, 1.0);
    assert_eq!(projection.closest, Point3::new(3.0, 0.0, 0.0));
    assert_eq!(projection.distance, 7.0);
}

#[test]
fn off_plane_query_prefers_interior_over_end_point() {
    let path = CubicPath::from_points(&arch(), Tolerance::DEFAULT).unwrap();
    let query = Point3::new(10.0, 10.0, 10.0);
    let projection = path.closest_point(query).unwrap();
    let to_end = Point3::new(3.0, 0.0, 0.0).distance_to(query);
    assert!(projection.parameter > 0.85 && projection.parameter < 0.9);
    assert!(projection.distance < to_end);
    assert!((projection.distance - 15.7459).abs() < 1e-3);
}

#[test]
fn query_near_joint_picks_the_strictly_closer_side() {
    let path = CubicPath::from_points(&s_curve(), Tolerance::DEFAULT).unwrap();

    let above = path.closest_point(Point3::new(3.0, 0.3, 0.0)).unwrap();
    assert_eq!(above.index, 0);
    assert!(above.parameter < 1.0);
    assert!(above.distance < 0.3);

    let below = path.closest_point(Point3::new(3.0, -0.3, 0.0)).unwrap();
    assert_eq!(below.index, 1);
    assert!(below.parameter > 0.0);
    assert!(below.distance < 0.3);
}

#[test]
fn joint_itself_is_reported_once_by_the_lower_segment() {
    let path = CubicPath::from_points(&s_curve(), Tolerance::DEFAULT).unwrap();
    let (projection, diagnostics) = path
        .closest_point_with_diagnostics(Point3::new(3.0, 0.0, 0.0))
        .unwrap();
    assert_eq!(projection.index, 0);
    assert_eq!(projection.parameter, 1.0);
    assert_eq!(projection.distance, 0.0);
    // Start point plus one end point per segment, never the joint twice.
    assert_eq!(
        diagnostics.candidate_count,
        1 + 2 + diagnostics.solver.roots_isolated
    );
}

#[test]
fn points_on_the_curve_project_onto_themselves() {
    let path = CubicPath::from_points(&s_curve(), Tolerance::DEFAULT).unwrap();
    for (index, t) in [(0, 0.25), (0, 0.6), (1, 0.4), (1, 0.9)] {
        let on_curve = path.point_at(index, t).unwrap();
        let projection = path.closest_point(on_curve).unwrap();
        assert!(projection.distance < 1e-4, "({index}, {t}) gave {projection:?}");
        assert_eq!(projection.index, index);
        assert!((projection.parameter - t).abs() < 1e-4);
    }
}

#[test]
fn never_farther_than_dense_samples() {
    let mut rng = StdRng::seed_from_u64(0xc0ffee);

    for _ in 0..24 {
        let points: Vec<Point3> = (0..10)
            .map(|_| Point3::new(coord(&mut rng), coord(&mut rng), coord(&mut rng)))
            .collect();
        let path = CubicPath::from_points(&points, Tolerance::DEFAULT).unwrap();
        let samples = path.sample(1000);

        for _ in 0..8 {
            let query = Point3::new(
                2.0 * coord(&mut rng),
                2.0 * coord(&mut rng),
                2.0 * coord(&mut rng),
            );
            let projection = path.closest_point(query).unwrap();
            let sampled = samples
                .iter()
                .map(|p| p.distance_to(query))
                .fold(f64::INFINITY, f64::min);

            assert!(
                projection.distance <= sampled + 1e-5,
                "solver {} vs samples {sampled}",
                projection.distance
            );
            assert!((0.0..=1.0).contains(&projection.parameter));
            assert!(projection.index < path.segment_count());
            let recomputed = path.point_at(projection.index, projection.parameter).unwrap();
            assert!(recomputed.distance_to(projection.closest) < 1e-9);
        }
    }
}

#[test]
fn unrouted_path_reports_empty_curve() {
    let path = CubicPath::new(Tolerance::DEFAULT).unwrap();
    assert_eq!(path.closest_point(Point3::ORIGIN), Err(QueryError::EmptyCurve));
}
