#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Closest-point projection onto chains of cubic Bézier segments.
//!
//! A curve is given as `3n + 1` control points. Each query finds the point of
//! the curve nearest to a 3-D location, together with the segment holding it
//! and the parameter along that segment.
//!
//! ```ignore
//! use curve_projection::{PointProjector, ProjectionConfig, geom::Point3};
//!
//! let mut projector = PointProjector::native(ProjectionConfig::default())?;
//! projector.route(&points)?;
//! let hit = projector.localize(Point3::new(1.5, 1.0, 0.0))?;
//! println!("segment {} at t={} ({} away)", hit.index, hit.parameter, hit.distance);
//! ```
//!
//! [`geom::CubicPath`] answers queries on the calling thread.
//! [`geom::PointProjector`] splits the curve into one shard per worker and
//! searches the shards in parallel (rayon with the default `parallel`
//! feature, scoped threads without it).

pub mod config;
pub mod geom;
pub mod io;
pub mod platform;

pub use config::{ConfigFileError, ProjectionConfig, ThreadingMode};
pub use geom::{CubicPath, PointProjector, Projection, ProjectionError, ProjectionResult};
pub use platform::{FixedPlatform, NativePlatform, Platform};

/// One-shot projection of `query` onto the curve through `points`.
///
/// Builds a throwaway [`PointProjector`] on the native platform.
pub fn project_point(
    points: &[geom::Point3],
    query: geom::Point3,
    config: ProjectionConfig,
) -> ProjectionResult<Projection> {
    let mut projector = PointProjector::native(config)?;
    projector.route(points)?;
    Ok(projector.localize(query)?)
}
