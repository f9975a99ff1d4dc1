//! Control-point ingestion.

pub mod points;

pub use points::{LoadError, load_control_points, parse_control_points};
