//! Diagnostics gathered while answering closest-point queries.
//!
//! A query returns a [`Projection`](super::Projection); callers that want to
//! know how much work the solver did, or whether Newton ever had to hand over
//! to bisection, ask for diagnostics alongside it.
//!
//! ```ignore
//! let (projection, diagnostics) = path.closest_point_with_diagnostics(query)?;
//! if diagnostics.solver.newton_fallbacks > 0 {
//!     log::debug!("{}", diagnostics.summary());
//! }
//! ```

use std::fmt;

use serde::Serialize;

use super::metrics::ProjectionTimingReport;
use super::sturm::SolverStats;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ProjectionDiagnostics {
    /// Segments searched across all shards.
    pub segment_count: usize,

    /// Shards the curve was split into. 1 for a single-threaded query.
    pub shard_count: usize,

    /// Candidate points compared: the start point, every segment end, and
    /// every interior root.
    pub candidate_count: usize,

    /// Roots credited by the Sturm counts. Exceeds the interior candidates
    /// only when roots closer than the tolerance were merged.
    pub credited_root_count: usize,

    pub solver: SolverStats,

    pub timing: Option<ProjectionTimingReport>,
}

impl ProjectionDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every Newton run converged without a bisection fallback.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.solver.newton_fallbacks == 0
    }

    pub fn merge(&mut self, other: &ProjectionDiagnostics) {
        self.segment_count += other.segment_count;
        self.shard_count += other.shard_count;
        self.candidate_count += other.candidate_count;
        self.credited_root_count += other.credited_root_count;
        self.solver.merge(&other.solver);
        // timing is not merged; the dispatcher owns the metrics for a query
    }

    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "segments:{} shards:{} candidates:{}",
            self.segment_count, self.shard_count, self.candidate_count
        )];

        if self.solver.roots_isolated > 0 {
            parts.push(format!("roots:{}", self.solver.roots_isolated));
        }
        if self.solver.newton_fallbacks > 0 {
            parts.push(format!("newton-fallbacks:{}", self.solver.newton_fallbacks));
        }
        if self.solver.bisection_steps > 0 {
            parts.push(format!("bisections:{}", self.solver.bisection_steps));
        }

        parts.join(" ")
    }
}

impl fmt::Display for ProjectionDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Projection Diagnostics:")?;
        writeln!(f, "  Segments: {}", self.segment_count)?;
        writeln!(f, "  Shards: {}", self.shard_count)?;
        writeln!(f, "  Candidates: {}", self.candidate_count)?;

        writeln!(f, "  Solver:")?;
        writeln!(f, "    - Sturm sequences: {}", self.solver.sequences_built)?;
        writeln!(f, "    - Roots isolated: {}", self.solver.roots_isolated)?;
        if self.credited_root_count != self.solver.roots_isolated {
            writeln!(f, "    - Roots credited: {}", self.credited_root_count)?;
        }
        writeln!(f, "    - Newton successes: {}", self.solver.newton_successes)?;
        if self.solver.newton_fallbacks > 0 {
            writeln!(f, "    - Newton fallbacks: {}", self.solver.newton_fallbacks)?;
        }
        if self.solver.bisection_steps > 0 {
            writeln!(f, "    - Bisection steps: {}", self.solver.bisection_steps)?;
        }

        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ms())?;
        }

        Ok(())
    }
}
