//! Fork-join closest-point search over contiguous shards of a path.
//!
//! [`PointProjector::route`] splits the control points into one shard per
//! worker. Neighbouring shards share their boundary control point, so every
//! shard is a valid [`CubicPath`] on its own. Each query searches all shards
//! independently, then keeps the nearest result and shifts its segment index
//! by the segments of the shards before it.

use std::ops::Range;
use std::path::Path;

use log::debug;
use serde::Serialize;

use super::core::{Point3, Tolerance};
use super::diagnostics::ProjectionDiagnostics;
use super::error::{ConfigError, ConstructionError, ProjectionResult, QueryError};
use super::metrics::{ProjectionMetrics, TimingBucket};
use super::path::{CubicPath, Projection, is_valid_point_count};
use crate::config::ProjectionConfig;
use crate::io::load_control_points;
use crate::platform::{NativePlatform, Platform};

/// A contiguous run of segments assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shard {
    pub first_point: usize,
    pub point_count: usize,
    pub first_segment: usize,
    pub segment_count: usize,
}

impl Shard {
    #[must_use]
    pub const fn point_range(&self) -> Range<usize> {
        self.first_point..self.first_point + self.point_count
    }

    /// Rewrites a shard-local construction error in whole-path indices.
    fn globalize(&self, err: ConstructionError) -> ConstructionError {
        match err {
            ConstructionError::DegenerateSegment { index, .. } => {
                let index = index + self.first_segment;
                ConstructionError::DegenerateSegment {
                    index,
                    first_point: 3 * index,
                    last_point: 3 * index + 3,
                }
            }
            other => other,
        }
    }
}

/// Splits `segment_count` segments over at most `workers` shards.
///
/// Every shard gets `segment_count / workers` segments and the last one also
/// takes the remainder. Fewer segments than workers gives one segment each.
#[must_use]
pub fn plan_shards(segment_count: usize, workers: usize) -> Vec<Shard> {
    if segment_count == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, segment_count);
    let per = segment_count / workers;

    (0..workers)
        .map(|i| {
            let first_segment = i * per;
            let segments = if i + 1 == workers {
                segment_count - first_segment
            } else {
                per
            };
            Shard {
                first_point: 3 * first_segment,
                point_count: 3 * segments + 1,
                first_segment,
                segment_count: segments,
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
struct ShardPath {
    shard: Shard,
    path: CubicPath,
}

type ShardResult = Result<(Projection, ProjectionDiagnostics), QueryError>;

cfg_if::cfg_if! {
    if #[cfg(feature = "parallel")] {
        fn fan_out(shards: &[ShardPath], query: Point3) -> Vec<ShardResult> {
            use rayon::prelude::*;
            shards
                .par_iter()
                .map(|sp| sp.path.closest_point_with_diagnostics(query))
                .collect()
        }
    } else {
        fn fan_out(shards: &[ShardPath], query: Point3) -> Vec<ShardResult> {
            std::thread::scope(|scope| {
                let handles: Vec<_> = shards
                    .iter()
                    .map(|sp| scope.spawn(move || sp.path.closest_point_with_diagnostics(query)))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| match handle.join() {
                        Ok(result) => result,
                        Err(payload) => std::panic::resume_unwind(payload),
                    })
                    .collect()
            })
        }
    }
}

/// Keeps the nearest shard result, lowest shard first on ties.
fn merge(
    shards: &[ShardPath],
    results: Vec<(Projection, ProjectionDiagnostics)>,
) -> Result<(Projection, ProjectionDiagnostics), QueryError> {
    let mut diagnostics = ProjectionDiagnostics::new();
    let mut best: Option<Projection> = None;

    for (sp, (projection, diag)) in shards.iter().zip(results) {
        diagnostics.merge(&diag);
        let global = Projection {
            index: projection.index + sp.shard.first_segment,
            ..projection
        };
        if best.is_none_or(|b| global.distance < b.distance) {
            best = Some(global);
        }
    }

    best.map(|projection| (projection, diagnostics))
        .ok_or(QueryError::EmptyCurve)
}

/// Closest-point engine that fans each query out over worker shards.
#[derive(Debug)]
pub struct PointProjector<P: Platform = NativePlatform> {
    config: ProjectionConfig,
    tolerance: Tolerance,
    platform: P,
    shards: Vec<ShardPath>,
    segment_count: usize,
}

impl PointProjector<NativePlatform> {
    pub fn native(config: ProjectionConfig) -> Result<Self, ConfigError> {
        Self::new(config, NativePlatform)
    }
}

impl<P: Platform> PointProjector<P> {
    /// # Errors
    /// The configured tolerance fails [`Tolerance::projection`].
    pub fn new(config: ProjectionConfig, platform: P) -> Result<Self, ConfigError> {
        let tolerance = config.validated_tolerance()?;
        Ok(Self {
            config,
            tolerance,
            platform,
            shards: Vec::new(),
            segment_count: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    #[must_use]
    pub const fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    #[must_use]
    pub fn platform(&self) -> &P {
        &self.platform
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    #[must_use]
    pub const fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Workers a query fans out to. 0 before a successful route.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.shards.len()
    }

    #[must_use]
    pub fn shards(&self) -> Vec<Shard> {
        self.shards.iter().map(|sp| sp.shard).collect()
    }

    fn clear(&mut self) {
        self.shards.clear();
        self.segment_count = 0;
    }

    /// Rebuilds every shard from `points`, discarding the previous curve.
    ///
    /// # Errors
    /// Same as [`CubicPath::route`], with segment indices relative to the
    /// whole curve. On error the projector is left empty.
    pub fn route(&mut self, points: &[Point3]) -> Result<(), ConstructionError> {
        self.clear();

        let count = points.len();
        if !is_valid_point_count(count) {
            return Err(ConstructionError::InvalidPointCount { count });
        }
        let segment_count = (count - 1) / 3;
        let workers = self
            .config
            .worker_limit(self.platform.hardware_concurrency());
        let plan = plan_shards(segment_count, workers);
        debug!(
            "sharding {segment_count} segments across {} workers (limit {workers})",
            plan.len()
        );

        let mut shards = Vec::with_capacity(plan.len());
        for shard in plan {
            let mut path = CubicPath::with_validated(self.tolerance);
            path.route(&points[shard.point_range()])
                .map_err(|err| shard.globalize(err))?;
            shards.push(ShardPath { shard, path });
        }

        self.shards = shards;
        self.segment_count = segment_count;
        Ok(())
    }

    pub fn route_timed(
        &mut self,
        points: &[Point3],
        metrics: &mut ProjectionMetrics,
    ) -> Result<(), ConstructionError> {
        metrics.time(TimingBucket::Route, || self.route(points))
    }

    /// Loads control points through the platform and routes them.
    pub fn route_file(&mut self, path: impl AsRef<Path>) -> ProjectionResult<()> {
        self.clear();
        let points = load_control_points(&self.platform, path)?;
        self.route(&points)?;
        Ok(())
    }

    /// Samples the routed curve like [`CubicPath::sample`], emitting each shard
    /// boundary once.
    #[must_use]
    pub fn sample(&self, steps_per_segment: usize) -> Vec<Point3> {
        let mut out = Vec::new();
        for (i, sp) in self.shards.iter().enumerate() {
            let skip = usize::from(i > 0);
            out.extend(sp.path.sample(steps_per_segment).into_iter().skip(skip));
        }
        out
    }

    /// Closest point on the routed curve to `query`.
    ///
    /// # Errors
    /// [`QueryError::EmptyCurve`] before a successful route.
    pub fn localize(&self, query: Point3) -> Result<Projection, QueryError> {
        self.localize_with_diagnostics(query)
            .map(|(projection, _)| projection)
    }

    pub fn localize_with_diagnostics(
        &self,
        query: Point3,
    ) -> Result<(Projection, ProjectionDiagnostics), QueryError> {
        let results = self.solve(query)?;
        merge(&self.shards, results)
    }

    /// Like [`localize_with_diagnostics`](Self::localize_with_diagnostics),
    /// timing the search and merge phases into `metrics`.
    pub fn localize_timed(
        &self,
        query: Point3,
        metrics: &mut ProjectionMetrics,
    ) -> Result<(Projection, ProjectionDiagnostics), QueryError> {
        let results = metrics.time(TimingBucket::Solve, || self.solve(query))?;
        let (projection, mut diagnostics) =
            metrics.time(TimingBucket::Merge, || merge(&self.shards, results))?;
        diagnostics.timing = metrics.end();
        Ok((projection, diagnostics))
    }

    fn solve(&self, query: Point3) -> Result<Vec<(Projection, ProjectionDiagnostics)>, QueryError> {
        match self.shards.as_slice() {
            [] => Err(QueryError::EmptyCurve),
            [only] => Ok(vec![only.path.closest_point_with_diagnostics(query)?]),
            shards => fan_out(shards, query).into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThreadingMode;
    use crate::platform::FixedPlatform;

    fn wave(segments: usize) -> Vec<Point3> {
        (0..=3 * segments)
            .map(|i| {
                let x = i as f64;
                Point3::new(x, (x * 0.7).sin() * 2.0, (x * 0.3).cos())
            })
            .collect()
    }

    #[test]
    fn plan_covers_every_segment_once() {
        for (segments, workers) in [(4, 8), (10, 3), (7, 7), (1, 4), (9, 1)] {
            let plan = plan_shards(segments, workers);
            assert_eq!(plan.len(), workers.min(segments));
            assert_eq!(plan[0].first_segment, 0);
            assert_eq!(plan[0].first_point, 0);
            for pair in plan.windows(2) {
                assert_eq!(pair[1].first_segment, pair[0].first_segment + pair[0].segment_count);
                // Neighbours share one boundary point.
                assert_eq!(pair[1].first_point, pair[0].point_range().end - 1);
            }
            let last = plan[plan.len() - 1];
            assert_eq!(last.first_segment + last.segment_count, segments);
            assert_eq!(last.point_range().end, 3 * segments + 1);
        }
    }

    #[test]
    fn last_shard_takes_remainder() {
        let plan = plan_shards(10, 3);
        let counts: Vec<_> = plan.iter().map(|s| s.segment_count).collect();
        assert_eq!(counts, vec![3, 3, 4]);
        assert_eq!(plan[2].point_count, 13);
        assert!(plan_shards(0, 4).is_empty());
    }

    #[test]
    fn single_mode_uses_one_worker() {
        let config = ProjectionConfig {
            threading: ThreadingMode::Single,
            ..ProjectionConfig::default()
        };
        let mut projector = PointProjector::new(config, FixedPlatform::new(8)).unwrap();
        projector.route(&wave(6)).unwrap();
        assert_eq!(projector.worker_count(), 1);
        assert_eq!(projector.segment_count(), 6);
    }

    #[test]
    fn worker_count_clamps_to_segments_and_cap() {
        let mut projector =
            PointProjector::new(ProjectionConfig::default(), FixedPlatform::new(8)).unwrap();
        projector.route(&wave(4)).unwrap();
        assert_eq!(projector.worker_count(), 4);

        let config = ProjectionConfig {
            max_workers: Some(2),
            ..ProjectionConfig::default()
        };
        let mut projector = PointProjector::new(config, FixedPlatform::new(8)).unwrap();
        projector.route(&wave(9)).unwrap();
        assert_eq!(projector.worker_count(), 2);
        let counts: Vec<_> = projector.shards().iter().map(|s| s.segment_count).collect();
        assert_eq!(counts, vec![4, 5]);
    }

    #[test]
    fn invalid_tolerance_is_rejected_up_front() {
        let config = ProjectionConfig {
            tolerance: 0.0,
            ..ProjectionConfig::default()
        };
        assert!(matches!(
            PointProjector::new(config, FixedPlatform::new(2)),
            Err(ConfigError::ToleranceOutOfRange { .. })
        ));
    }

    #[test]
    fn degenerate_segment_index_is_global() {
        let mut points = wave(6);
        // Collapse segment 4 (points 12..=15) inside the last of three shards.
        let p = points[12];
        for slot in &mut points[13..=15] {
            *slot = p;
        }
        let mut projector =
            PointProjector::new(ProjectionConfig::default(), FixedPlatform::new(3)).unwrap();
        let err = projector.route(&points).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::DegenerateSegment {
                index: 4,
                first_point: 12,
                last_point: 15,
            }
        );
        assert!(projector.is_empty());
        assert_eq!(projector.localize(Point3::ORIGIN), Err(QueryError::EmptyCurve));
    }

    #[test]
    fn sharded_and_single_runs_agree() {
        let points = wave(7);
        let single = CubicPath::from_points(&points, Tolerance::DEFAULT).unwrap();
        let mut projector =
            PointProjector::new(ProjectionConfig::default(), FixedPlatform::new(3)).unwrap();
        projector.route(&points).unwrap();
        assert_eq!(projector.worker_count(), 3);

        for query in [
            Point3::new(0.5, 3.0, 0.0),
            Point3::new(10.2, -1.0, 2.0),
            Point3::new(20.0, 0.5, -0.5),
            Point3::new(9.0, 0.0, 0.0),
        ] {
            let expected = single.closest_point(query).unwrap();
            let (got, diag) = projector.localize_with_diagnostics(query).unwrap();
            assert_eq!(got.index, expected.index, "query {query:?}");
            assert!((got.parameter - expected.parameter).abs() < 1e-9);
            assert!((got.distance - expected.distance).abs() < 1e-12);
            assert_eq!(diag.shard_count, 3);
            assert_eq!(diag.segment_count, 7);
        }
    }

    #[test]
    fn sharded_sampling_matches_single_path() {
        let points = wave(7);
        let single = CubicPath::from_points(&points, Tolerance::DEFAULT).unwrap();
        let mut projector =
            PointProjector::new(ProjectionConfig::default(), FixedPlatform::new(3)).unwrap();
        assert!(projector.sample(4).is_empty());
        projector.route(&points).unwrap();
        assert_eq!(projector.sample(4), single.sample(4));
        assert_eq!(projector.sample(4).len(), 7 * 4 + 1);
    }

    #[test]
    fn shared_shard_boundary_resolves_to_lower_shard() {
        let points = wave(4);
        let mut projector =
            PointProjector::new(ProjectionConfig::default(), FixedPlatform::new(2)).unwrap();
        projector.route(&points).unwrap();
        // Points[6] is the joint between shard 0 and shard 1.
        let joint = points[6];
        let projection = projector.localize(joint).unwrap();
        assert_eq!(projection.closest, joint);
        assert_eq!(projection.index, 1);
        assert_eq!(projection.parameter, 1.0);
        assert_eq!(projection.distance, 0.0);
    }

    #[test]
    fn timed_localize_attaches_report_when_enabled() {
        let mut projector =
            PointProjector::new(ProjectionConfig::default(), FixedPlatform::new(2)).unwrap();
        let mut metrics = ProjectionMetrics::default();
        metrics.begin();
        projector.route_timed(&wave(4), &mut metrics).unwrap();
        let (projection, diag) = projector
            .localize_timed(Point3::new(3.0, 0.0, 0.0), &mut metrics)
            .unwrap();
        assert!(projection.distance.is_finite());
        assert_eq!(diag.timing.is_some(), cfg!(feature = "projection_metrics"));
    }
}
