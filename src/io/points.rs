//! Plain-text control-point files.
//!
//! A file is a flat run of whitespace-separated numbers read as consecutive
//! `x y z` triples. The point count must satisfy the same `3n + 1` rule as
//! [`CubicPath::route`](crate::geom::CubicPath::route); a short file is
//! reported, never truncated.

use std::num::ParseFloatError;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::geom::{ConstructionError, Point3, is_valid_point_count};
use crate::platform::Platform;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{tokens} numbers do not form whole x y z triples")]
    IncompleteTriple { tokens: usize },
    #[error("token {token_index} is not a number: {source}")]
    Number {
        token_index: usize,
        #[source]
        source: ParseFloatError,
    },
    #[error(transparent)]
    InvalidPointCount(ConstructionError),
}

/// Parses control points from text.
pub fn parse_control_points(text: &str) -> Result<Vec<Point3>, LoadError> {
    let tokens = text.split_whitespace().count();
    if tokens % 3 != 0 {
        return Err(LoadError::IncompleteTriple { tokens });
    }

    let values = text
        .split_whitespace()
        .enumerate()
        .map(|(token_index, token)| {
            token
                .parse::<f64>()
                .map_err(|source| LoadError::Number { token_index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let points: Vec<Point3> = values
        .chunks_exact(3)
        .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
        .collect();

    if !is_valid_point_count(points.len()) {
        return Err(LoadError::InvalidPointCount(
            ConstructionError::InvalidPointCount {
                count: points.len(),
            },
        ));
    }
    Ok(points)
}

/// Reads and parses a control-point file through `platform`.
pub fn load_control_points(
    platform: &(impl Platform + ?Sized),
    path: impl AsRef<Path>,
) -> Result<Vec<Point3>, LoadError> {
    let path = path.as_ref();
    let text = platform.map_file(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let points = parse_control_points(&text)?;
    debug!("loaded {} control points from {}", points.len(), path.display());
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::NativePlatform;

    #[test]
    fn parses_triples_across_lines() {
        let points = parse_control_points("0 0 0\n1 1 0\n2 1 0\n3 0 0\n").unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[1], Point3::new(1.0, 1.0, 0.0));

        let points = parse_control_points("0 0 0 1 1 0\t2 1 0   3 0 -1.5e0").unwrap();
        assert_eq!(points[3], Point3::new(3.0, 0.0, -1.5));
    }

    #[test]
    fn incomplete_triple_is_reported() {
        let err = parse_control_points("0 0 0 1 1").unwrap_err();
        assert!(matches!(err, LoadError::IncompleteTriple { tokens: 5 }));
    }

    #[test]
    fn bad_number_reports_token_index() {
        let err = parse_control_points("0 0 0 1 x 0 2 1 0 3 0 0").unwrap_err();
        assert!(matches!(err, LoadError::Number { token_index: 4, .. }));
    }

    #[test]
    fn point_count_must_form_segments() {
        let err = parse_control_points("0 0 0 1 1 0 2 1 0 3 0 0 4 0 0").unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidPointCount(ConstructionError::InvalidPointCount { count: 5 })
        ));
        assert!(matches!(
            parse_control_points(""),
            Err(LoadError::InvalidPointCount(_))
        ));
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join("curve_projection_points_test.txt");
        std::fs::write(&path, "0 0 0\n1 1 0\n2 1 0\n3 0 0\n").unwrap();
        let points = load_control_points(&NativePlatform, &path).unwrap();
        assert_eq!(points.len(), 4);
        let _ = std::fs::remove_file(&path);

        let err = load_control_points(&NativePlatform, &path).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
