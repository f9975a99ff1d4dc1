//! Opt-in timing hooks for routing and querying.
//!
//! Timing is only collected when the `projection_metrics` feature is enabled.
//! Otherwise every call compiles down to running the wrapped closure.
//!
//! ```ignore
//! use curve_projection::geom::{ProjectionMetrics, TimingBucket};
//!
//! let mut metrics = ProjectionMetrics::default();
//! metrics.begin();
//! let projection = projector.localize_timed(query, &mut metrics)?;
//! if let Some(report) = metrics.end() {
//!     println!("solve: {} ns", report.solve_ns);
//! }
//! ```

use serde::Serialize;

/// Phases of a projection that accumulate time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Segment construction (power basis and objective coefficients).
    Route,
    /// Per-shard closest-point search, including Sturm isolation.
    Solve,
    /// Reduction of shard results and index remapping.
    Merge,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionTimingReport {
    pub route_ns: u64,
    pub solve_ns: u64,
    pub merge_ns: u64,
}

impl ProjectionTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.route_ns
            .saturating_add(self.solve_ns)
            .saturating_add(self.merge_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing projection phases.
///
/// Call [`begin`](Self::begin) to reset, wrap work with [`time`](Self::time),
/// and call [`end`](Self::end) to read the report. Without the
/// `projection_metrics` feature [`end`](Self::end) returns `None`.
#[derive(Debug, Default)]
pub struct ProjectionMetrics {
    #[cfg(feature = "projection_metrics")]
    report: ProjectionTimingReport,
}

impl ProjectionMetrics {
    pub fn begin(&mut self) {
        #[cfg(feature = "projection_metrics")]
        {
            self.report = ProjectionTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<ProjectionTimingReport> {
        #[cfg(feature = "projection_metrics")]
        {
            Some(self.report.clone())
        }
        #[cfg(not(feature = "projection_metrics"))]
        {
            None
        }
    }

    /// Runs `f` and adds its elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(feature = "projection_metrics")]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            let slot = match bucket {
                TimingBucket::Route => &mut self.report.route_ns,
                TimingBucket::Solve => &mut self.report.solve_ns,
                TimingBucket::Merge => &mut self.report.merge_ns,
            };
            *slot = slot.saturating_add(nanos);
            result
        }

        #[cfg(not(feature = "projection_metrics"))]
        {
            let _ = bucket;
            f()
        }
    }
}
