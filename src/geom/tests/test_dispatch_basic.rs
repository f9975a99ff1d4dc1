use crate::config::{ProjectionConfig, ThreadingMode};
use crate::geom::{PointProjector, Point3};
use crate::platform::FixedPlatform;

fn four_segment_curve() -> Vec<Point3> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 2.0, 0.5),
        Point3::new(2.0, 2.0, -0.5),
        Point3::new(3.0, 0.0, 0.0),
        Point3::new(4.0, -2.0, 0.5),
        Point3::new(5.0, -2.0, 1.0),
        Point3::new(6.0, 0.0, 1.0),
        Point3::new(7.0, 2.0, 1.0),
        Point3::new(8.0, 1.0, 0.0),
        Point3::new(9.0, 0.0, -1.0),
        Point3::new(10.0, -1.0, -2.0),
        Point3::new(11.0, 1.0, -1.0),
        Point3::new(12.0, 0.0, 0.0),
    ]
}

fn projector(threading: ThreadingMode) -> PointProjector<FixedPlatform> {
    let config = ProjectionConfig {
        threading,
        ..ProjectionConfig::default()
    };
    let mut projector = PointProjector::new(config, FixedPlatform::new(8)).unwrap();
    projector.route(&four_segment_curve()).unwrap();
    projector
}

#[test_log::test]
fn eight_cores_four_segments_match_single_thread() {
    let parallel = projector(ThreadingMode::Parallel);
    let single = projector(ThreadingMode::Single);
    assert_eq!(parallel.worker_count(), 4);
    assert_eq!(single.worker_count(), 1);

    let queries = [
        Point3::new(1.5, 3.0, 0.0),
        Point3::new(4.5, -3.0, 1.0),
        Point3::new(7.2, 2.5, 1.5),
        Point3::new(10.5, -2.0, -3.0),
        Point3::new(6.0, 0.0, 5.0),
        Point3::new(-3.0, 0.0, 0.0),
        Point3::new(20.0, 0.0, 0.0),
    ];
    for query in queries {
        let (a, diag) = parallel.localize_with_diagnostics(query).unwrap();
        let b = single.localize(query).unwrap();
        assert_eq!(a.index, b.index, "query {query:?}");
        assert!((a.parameter - b.parameter).abs() < 1e-9, "query {query:?}");
        assert!((a.distance - b.distance).abs() < 1e-12, "query {query:?}");
        assert_eq!(diag.shard_count, 4);
        assert_eq!(diag.segment_count, 4);
    }
}

#[test_log::test]
fn extreme_endpoints_keep_global_indices() {
    let parallel = projector(ThreadingMode::Parallel);

    let start = parallel.localize(Point3::new(-3.0, 0.0, 0.0)).unwrap();
    assert_eq!(start.index, 0);
    assert_eq!(start.parameter, 0.0);
    assert_eq!(start.closest, Point3::ORIGIN);

    let end = parallel.localize(Point3::new(20.0, 0.0, 0.0)).unwrap();
    assert_eq!(end.index, 3);
    assert_eq!(end.parameter, 1.0);
    assert_eq!(end.closest, Point3::new(12.0, 0.0, 0.0));
}

#[test]
fn rerouting_replaces_the_previous_curve() {
    let mut parallel = projector(ThreadingMode::Parallel);
    let short = &four_segment_curve()[..7];
    parallel.route(short).unwrap();
    assert_eq!(parallel.segment_count(), 2);
    assert_eq!(parallel.worker_count(), 2);
    let end = parallel.localize(Point3::new(20.0, 0.0, 0.0)).unwrap();
    assert_eq!(end.index, 1);
    assert_eq!(end.closest, Point3::new(6.0, 0.0, 1.0));
}
