//! Error taxonomy for building, configuring and querying a projection engine.
//!
//! Every variant is detected synchronously by the call that triggers it and
//! returned to the caller. Numerical trouble inside the root solver (a Newton
//! step that diverges or stalls) is not an error: the solver recovers with
//! bisection and only reports it through [`SolverStats`](super::SolverStats).

use thiserror::Error;

use crate::io::LoadError;

/// Failures while deriving segments from a control-point array.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error(
        "segment {index} is degenerate: control points {first_point}..={last_point} collapse onto a single point"
    )]
    DegenerateSegment {
        index: usize,
        first_point: usize,
        last_point: usize,
    },
    #[error("incompatible number of control points: {count} (expected 3n+1 with n >= 1)")]
    InvalidPointCount { count: usize },
}

/// Failures while validating the configured tolerance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("tolerance {value} is outside the open interval (0, 1)")]
    ToleranceOutOfRange { value: f64 },
    #[error(
        "tolerance {value} needs {required_digits} decimal digits but the coordinate type only represents {available_digits}"
    )]
    ToleranceExceedsPrecision {
        value: f64,
        required_digits: u32,
        available_digits: u32,
    },
}

/// Failures while answering a closest-point query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("closest point requested on an empty curve; route control points first")]
    EmptyCurve,
}

/// Umbrella error for callers that drive the whole pipeline.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;
