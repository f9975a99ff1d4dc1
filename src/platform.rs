//! Host capabilities the projector needs from its environment.
//!
//! The solver itself never touches the operating system. Thread-count
//! detection and file access go through [`Platform`] so tests can pin both.

use std::io;
use std::path::Path;

use log::warn;

/// Capabilities injected into a [`PointProjector`](crate::geom::PointProjector).
pub trait Platform: Sync {
    /// Number of workers that can run in parallel. Never zero.
    fn hardware_concurrency(&self) -> usize;

    /// Reads the whole file at `path` as text.
    fn map_file(&self, path: &Path) -> io::Result<String>;
}

/// The host operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativePlatform;

impl Platform for NativePlatform {
    fn hardware_concurrency(&self) -> usize {
        match std::thread::available_parallelism() {
            Ok(n) => n.get(),
            Err(err) => {
                warn!("hardware concurrency unavailable ({err}); using a single worker");
                1
            }
        }
    }

    fn map_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// A platform with a fixed core count, reading files from the host.
#[derive(Debug, Clone, Copy)]
pub struct FixedPlatform {
    pub cores: usize,
}

impl FixedPlatform {
    #[must_use]
    pub const fn new(cores: usize) -> Self {
        Self { cores }
    }
}

impl Platform for FixedPlatform {
    fn hardware_concurrency(&self) -> usize {
        self.cores.max(1)
    }

    fn map_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}
