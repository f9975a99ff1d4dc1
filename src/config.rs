//! Projector configuration.
//!
//! Deserialized from JSON; every field is optional and falls back to its
//! default, so `{}` is a valid configuration.
//!
//! ```json
//! { "tolerance": 1e-6, "threading": "single", "max_workers": 4 }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::{ConfigError, Tolerance};

/// How a query is spread over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadingMode {
    /// One path searched on the calling thread.
    Single,
    /// One shard per worker, forked and joined per query.
    #[default]
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Root acceptance width and Newton cap driver, in `(0, 1)`.
    pub tolerance: f64,
    pub threading: ThreadingMode,
    /// Upper bound on workers. `None` uses every hardware thread.
    pub max_workers: Option<usize>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT.eps,
            threading: ThreadingMode::default(),
            max_workers: None,
        }
    }
}

/// Failures while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

impl ProjectionConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigFileError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated_tolerance()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// The configured tolerance, checked against `f64` precision.
    pub fn validated_tolerance(&self) -> Result<Tolerance, ConfigError> {
        Tolerance::projection(self.tolerance)
    }

    /// Worker cap for a host with `hardware_concurrency` threads.
    #[must_use]
    pub fn worker_limit(&self, hardware_concurrency: usize) -> usize {
        let hw = hardware_concurrency.max(1);
        match self.threading {
            ThreadingMode::Single => 1,
            ThreadingMode::Parallel => self.max_workers.map_or(hw, |cap| cap.clamp(1, hw)),
        }
    }
}
