//! A chain of cubic segments and its closest-point query.
//!
//! Control points come in runs of `3n + 1`: segment `i` uses points
//! `3i..=3i+3`, so neighbouring segments share exactly one point.

use log::debug;
use serde::Serialize;

use super::basis::CubicSegment;
use super::core::{Point3, Tolerance};
use super::curve::tessellate_curve_uniform;
use super::diagnostics::ProjectionDiagnostics;
use super::error::{ConfigError, ConstructionError, ProjectionResult, QueryError};
use super::sturm::{SolverSettings, SolverStats, SturmSequence, isolate_roots};

/// Result of a closest-point query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Projection {
    /// Closest point on the curve.
    pub closest: Point3,
    /// Segment holding `closest`.
    pub index: usize,
    /// Parameter of `closest` within its segment, in `[0, 1]`.
    pub parameter: f64,
    /// Euclidean distance from the query to `closest`.
    pub distance: f64,
}

/// Returns `true` when `count` control points form a whole number of segments.
#[must_use]
pub const fn is_valid_point_count(count: usize) -> bool {
    count > 3 && (count - 1) % 3 == 0
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubicPath {
    tolerance: Tolerance,
    settings: SolverSettings,
    points: Vec<Point3>,
    segments: Vec<CubicSegment>,
}

impl CubicPath {
    /// Empty path.
    ///
    /// # Errors
    /// `tolerance` fails [`Tolerance::projection`].
    pub fn new(tolerance: Tolerance) -> Result<Self, ConfigError> {
        let tolerance = Tolerance::projection(tolerance.eps)?;
        Ok(Self::with_validated(tolerance))
    }

    /// Empty path for a tolerance that already passed [`Tolerance::projection`].
    pub(crate) fn with_validated(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            settings: SolverSettings::from_tolerance(tolerance),
            points: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn from_points(points: &[Point3], tolerance: Tolerance) -> ProjectionResult<Self> {
        let mut path = Self::new(tolerance)?;
        path.route(points)?;
        Ok(path)
    }

    /// Rebuilds the path from `points`, discarding whatever it held before.
    ///
    /// # Errors
    /// [`ConstructionError::InvalidPointCount`] unless `points.len()` is `3n + 1`
    /// with `n >= 1`; [`ConstructionError::DegenerateSegment`] for the first
    /// segment that collapses. On error the path is left empty.
    pub fn route(&mut self, points: &[Point3]) -> Result<(), ConstructionError> {
        self.points.clear();
        self.segments.clear();

        let count = points.len();
        if !is_valid_point_count(count) {
            return Err(ConstructionError::InvalidPointCount { count });
        }

        let segments = points
            .windows(4)
            .step_by(3)
            .enumerate()
            .map(|(index, w)| CubicSegment::new(index, [w[0], w[1], w[2], w[3]]))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("routed {count} control points into {} segments", segments.len());
        self.points = points.to_vec();
        self.segments = segments;
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn segments(&self) -> &[CubicSegment] {
        &self.segments
    }

    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub const fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    #[must_use]
    pub const fn solver_settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Point at parameter `t` of segment `index`, or `None` past the last
    /// segment.
    #[must_use]
    pub fn point_at(&self, index: usize, t: f64) -> Option<Point3> {
        self.segments.get(index).map(|seg| seg.eval(t.clamp(0.0, 1.0)))
    }

    /// Samples every segment at `steps_per_segment + 1` uniform parameters,
    /// emitting each shared joint once.
    #[must_use]
    pub fn sample(&self, steps_per_segment: usize) -> Vec<Point3> {
        let steps = steps_per_segment.max(1);
        let mut out = Vec::with_capacity(self.segments.len() * steps + 1);
        for (i, seg) in self.segments.iter().enumerate() {
            let pts = tessellate_curve_uniform(seg, steps);
            let skip = usize::from(i > 0);
            out.extend(pts.into_iter().skip(skip));
        }
        out
    }

    /// Closest point on the path to `query`.
    ///
    /// # Errors
    /// [`QueryError::EmptyCurve`] if no route has succeeded.
    pub fn closest_point(&self, query: Point3) -> Result<Projection, QueryError> {
        self.closest_point_with_diagnostics(query)
            .map(|(projection, _)| projection)
    }

    pub fn closest_point_with_diagnostics(
        &self,
        query: Point3,
    ) -> Result<(Projection, ProjectionDiagnostics), QueryError> {
        let Some(&start) = self.points.first() else {
            return Err(QueryError::EmptyCurve);
        };

        let mut stats = SolverStats::default();
        let mut candidates = 1;
        let mut credited = 0;
        let (lo, hi) = self.settings.interior_bracket();

        // The start point is the only endpoint not owned as a segment's end.
        let mut best = Candidate {
            point: start,
            index: 0,
            parameter: 0.0,
            distance_squared: start.distance_squared_to(query),
        };

        for seg in &self.segments {
            let end = seg.end();
            best.offer(end, seg.index(), 1.0, query);
            candidates += 1;

            let seq = SturmSequence::new(seg.objective().for_query(query));
            stats.sequences_built += 1;
            let roots = isolate_roots(&seq, lo, hi, &self.settings, &mut stats);
            credited += roots.credited();
            for t in roots.iter() {
                best.offer(seg.eval(t), seg.index(), t, query);
                candidates += 1;
            }
        }

        let projection = Projection {
            closest: best.point,
            index: best.index,
            parameter: best.parameter,
            distance: best.point.distance_to(query),
        };
        let diagnostics = ProjectionDiagnostics {
            segment_count: self.segments.len(),
            shard_count: 1,
            candidate_count: candidates,
            credited_root_count: credited,
            solver: stats,
            ..ProjectionDiagnostics::default()
        };
        Ok((projection, diagnostics))
    }
}

/// Running minimum of the reduction, compared on squared distance.
struct Candidate {
    point: Point3,
    index: usize,
    parameter: f64,
    distance_squared: f64,
}

impl Candidate {
    fn offer(&mut self, point: Point3, index: usize, parameter: f64, query: Point3) {
        let distance_squared = point.distance_squared_to(query);
        if distance_squared < self.distance_squared {
            *self = Self {
                point,
                index,
                parameter,
                distance_squared,
            };
        }
    }
}
