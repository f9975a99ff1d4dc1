mod basis;
mod core;
mod curve;
mod diagnostics;
mod dispatch;
mod error;
mod metrics;
mod path;
mod poly;
mod sturm;

pub use basis::{CubicSegment, ObjectivePolynomial};
pub use core::{Point3, SOLVER_EPS_FLOOR, Tolerance, Vec3};
pub use curve::{CubicBezier3, Curve3, tessellate_curve_uniform};
pub use diagnostics::ProjectionDiagnostics;
pub use dispatch::{PointProjector, Shard, plan_shards};
pub use error::{ConfigError, ConstructionError, ProjectionError, ProjectionResult, QueryError};
pub use metrics::{ProjectionMetrics, ProjectionTimingReport, TimingBucket};
pub use path::{CubicPath, Projection, is_valid_point_count};
pub use poly::{Poly1d, QUINTIC};
pub use sturm::{
    PRE_NEWTON_DEPTH, RootSet, SolverSettings, SolverStats, SturmSequence, isolate_roots,
};

#[cfg(test)]
mod tests;
