//! Real-root isolation for the distance-stationarity quintic.
//!
//! A [`SturmSequence`] counts the distinct real roots of a polynomial in any
//! half-open interval `(a, b]`. [`isolate_roots`] uses those counts to split a
//! bracket until each piece holds a single root, then refines that root with
//! Newton iterations guarded by bisection.
//!
//! Every step either accepts a root or halves a bracket, and each Newton run is
//! capped, so isolation always terminates. A Newton run that fails is never an
//! error: it is counted in [`SolverStats`] and bisection takes over.

use arrayvec::ArrayVec;
use log::{trace, warn};
use serde::Serialize;

use super::core::Tolerance;
use super::poly::{Poly1d, QUINTIC, QUINTIC_COEFFS};

/// Depth below the full search interval a single-root bracket must reach
/// before the first Newton attempt. Each level halves the bracket.
pub const PRE_NEWTON_DEPTH: usize = 4;

/// Solver knobs derived from a [`Tolerance`].
///
/// The epsilon never drops below [`SOLVER_EPS_FLOOR`](super::SOLVER_EPS_FLOOR).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    eps: f64,
    newton_iteration_cap: usize,
    pre_newton_depth: usize,
}

impl SolverSettings {
    #[must_use]
    pub fn from_tolerance(tolerance: Tolerance) -> Self {
        Self {
            eps: tolerance.solver_eps(),
            newton_iteration_cap: tolerance.newton_iteration_cap(),
            pre_newton_depth: PRE_NEWTON_DEPTH,
        }
    }

    /// Bracket width accepted as a root and Newton step convergence bound.
    #[must_use]
    pub const fn eps(&self) -> f64 {
        self.eps
    }

    #[must_use]
    pub const fn newton_iteration_cap(&self) -> usize {
        self.newton_iteration_cap
    }

    #[must_use]
    pub const fn pre_newton_depth(&self) -> usize {
        self.pre_newton_depth
    }

    /// Search bracket for interior roots: `[eps, 1 - eps]`.
    #[must_use]
    pub fn interior_bracket(&self) -> (f64, f64) {
        (self.eps, 1.0 - self.eps)
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self::from_tolerance(Tolerance::DEFAULT)
    }
}

/// Counters for the work done by the root solver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SolverStats {
    pub sequences_built: usize,
    pub roots_isolated: usize,
    pub newton_successes: usize,
    /// Newton runs abandoned for a zero derivative, an escape from the
    /// bracket, or hitting the iteration cap.
    pub newton_fallbacks: usize,
    pub bisection_steps: usize,
}

impl SolverStats {
    pub fn merge(&mut self, other: &Self) {
        self.sequences_built += other.sequences_built;
        self.roots_isolated += other.roots_isolated;
        self.newton_successes += other.newton_successes;
        self.newton_fallbacks += other.newton_fallbacks;
        self.bisection_steps += other.bisection_steps;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sturm sequence
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SturmSequence {
    polys: ArrayVec<Poly1d, QUINTIC_COEFFS>,
}

impl SturmSequence {
    /// Builds `p0 = p`, `p1 = p'`, `p(i+1) = -rem(p(i-1), p(i))`, stopping at a
    /// constant or a vanishing remainder.
    ///
    /// Each remainder is rescaled by a positive factor so that its leading
    /// coefficient has unit magnitude; positive scaling leaves every sign count
    /// unchanged.
    #[must_use]
    pub fn new(p: Poly1d) -> Self {
        let mut polys = ArrayVec::new();
        polys.push(p);
        if p.degree() == 0 {
            return Self { polys };
        }
        polys.push(p.derivative());

        loop {
            let n = polys.len();
            let (prev, cur) = (polys[n - 2], polys[n - 1]);
            if cur.degree() == 0 {
                break;
            }
            let Some(rem) = prev.signed_remainder(&cur) else {
                break;
            };
            let rem = rem.scaled(1.0 / rem.leading_coefficient().abs());
            // Degrees strictly decrease, so a quintic never needs more slots.
            if polys.try_push(rem).is_err() {
                break;
            }
        }

        Self { polys }
    }

    #[must_use]
    pub fn polynomial(&self) -> &Poly1d {
        &self.polys[0]
    }

    /// `p'`, or zero for a constant polynomial.
    #[must_use]
    pub fn derivative(&self) -> Poly1d {
        self.polys.get(1).copied().unwrap_or(Poly1d::ZERO)
    }

    #[must_use]
    pub fn polys(&self) -> &[Poly1d] {
        &self.polys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.polys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polys.is_empty()
    }

    /// Sign alternations along the sequence evaluated at `t`, skipping zeros.
    #[must_use]
    pub fn sign_changes(&self, t: f64) -> usize {
        let mut changes = 0;
        let mut last_positive: Option<bool> = None;
        for poly in &self.polys {
            let v = poly.eval(t);
            if v == 0.0 || !v.is_finite() {
                continue;
            }
            let positive = v > 0.0;
            if last_positive.is_some_and(|prev| prev != positive) {
                changes += 1;
            }
            last_positive = Some(positive);
        }
        changes
    }

    /// Number of distinct real roots in `(a, b]`.
    #[must_use]
    pub fn count_roots(&self, a: f64, b: f64) -> usize {
        self.sign_changes(a).abs_diff(self.sign_changes(b))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Root set
// ─────────────────────────────────────────────────────────────────────────────

/// Refined roots of one polynomial over one bracket, in ascending order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RootSet {
    roots: ArrayVec<f64, QUINTIC>,
    credited: usize,
}

impl RootSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn accept(&mut self, t: f64, credit: usize) {
        self.credited += credit;
        if self.roots.try_push(t).is_err() {
            warn!("root set overflow: dropping root at t={t}");
        }
    }

    fn finish(&mut self) {
        self.roots.sort_by(f64::total_cmp);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.roots
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.roots.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Roots the Sturm counts attributed to the accepted parameters.
    ///
    /// Exceeds [`RootSet::len`] only when roots closer than the tolerance
    /// were accepted as one midpoint.
    #[must_use]
    pub const fn credited(&self) -> usize {
        self.credited
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Isolation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Bracket {
    lo: f64,
    hi: f64,
    roots: usize,
    depth: usize,
}

impl Bracket {
    fn mid(&self) -> f64 {
        0.5 * (self.lo + self.hi)
    }

    fn width(&self) -> f64 {
        self.hi - self.lo
    }
}

/// Isolates and refines every real root of `seq.polynomial()` in `(lo, hi]`.
#[must_use]
pub fn isolate_roots(
    seq: &SturmSequence,
    lo: f64,
    hi: f64,
    settings: &SolverSettings,
    stats: &mut SolverStats,
) -> RootSet {
    let mut roots = RootSet::new();
    if !(lo < hi) || seq.polynomial().is_zero() {
        return roots;
    }
    let total = seq.count_roots(lo, hi);
    if total == 0 {
        return roots;
    }

    // Every pending bracket holds at least one root, so at most `QUINTIC` wait.
    let mut pending: ArrayVec<Bracket, QUINTIC> = ArrayVec::new();
    pending.push(Bracket {
        lo,
        hi,
        roots: total.min(QUINTIC),
        depth: 0,
    });

    while let Some(bracket) = pending.pop() {
        if bracket.width() <= settings.eps {
            roots.accept(bracket.mid(), bracket.roots);
            continue;
        }

        if bracket.roots == 1 {
            let root = refine_single(seq, bracket, settings, stats);
            roots.accept(root, 1);
            continue;
        }

        let mid = bracket.mid();
        if mid <= bracket.lo || mid >= bracket.hi {
            // No double left between the ends.
            roots.accept(mid, bracket.roots);
            continue;
        }
        let right = seq.count_roots(mid, bracket.hi).min(bracket.roots);
        let left = bracket.roots - right;
        let depth = bracket.depth + 1;
        // Right first so the left half is popped next.
        for (lo, hi, count) in [(mid, bracket.hi, right), (bracket.lo, mid, left)] {
            if count == 0 {
                continue;
            }
            let half = Bracket {
                lo,
                hi,
                roots: count,
                depth,
            };
            if pending.try_push(half).is_err() {
                warn!("root isolation work list full: dropping bracket [{lo}, {hi}]");
            }
        }
    }

    roots.finish();
    stats.roots_isolated += roots.len();
    roots
}

/// Refines the single root of a bracket.
fn refine_single(
    seq: &SturmSequence,
    bracket: Bracket,
    settings: &SolverSettings,
    stats: &mut SolverStats,
) -> f64 {
    let p = seq.polynomial();
    let Bracket { mut lo, mut hi, .. } = bracket;

    let f_hi = p.eval(hi);
    if f_hi == 0.0 {
        return hi;
    }
    let mut f_lo = p.eval(lo);

    if f_lo.signum() == f_hi.signum() {
        // Even multiplicity (or lo sits on the root): no sign change to chase.
        while hi - lo > settings.eps {
            let mid = 0.5 * (lo + hi);
            if mid <= lo || mid >= hi {
                return mid;
            }
            if seq.count_roots(lo, mid) > 0 {
                hi = mid;
            } else {
                lo = mid;
            }
            stats.bisection_steps += 1;
        }
        return 0.5 * (lo + hi);
    }

    let dp = seq.derivative();
    let pre_halvings = settings.pre_newton_depth.saturating_sub(bracket.depth);
    for _ in 0..pre_halvings {
        if hi - lo <= settings.eps {
            break;
        }
        if let Some(root) = bisect(p, &mut lo, &mut hi, &mut f_lo, stats) {
            return root;
        }
    }

    loop {
        if hi - lo <= settings.eps {
            return 0.5 * (lo + hi);
        }
        if let Some(root) = newton(p, &dp, lo, hi, settings) {
            stats.newton_successes += 1;
            return root;
        }
        stats.newton_fallbacks += 1;
        trace!("newton fallback on [{lo}, {hi}]");
        if let Some(root) = bisect(p, &mut lo, &mut hi, &mut f_lo, stats) {
            return root;
        }
    }
}

/// Halves `[lo, hi]` toward the sign change. Returns the midpoint if it is an
/// exact root or if `lo` and `hi` are adjacent doubles.
fn bisect(
    p: &Poly1d,
    lo: &mut f64,
    hi: &mut f64,
    f_lo: &mut f64,
    stats: &mut SolverStats,
) -> Option<f64> {
    stats.bisection_steps += 1;
    let mid = 0.5 * (*lo + *hi);
    if mid <= *lo || mid >= *hi {
        return Some(mid);
    }
    let f_mid = p.eval(mid);
    if f_mid == 0.0 {
        return Some(mid);
    }
    if f_mid.signum() == f_lo.signum() {
        *lo = mid;
        *f_lo = f_mid;
    } else {
        *hi = mid;
    }
    None
}

/// Newton iteration from the bracket midpoint. `None` when the derivative
/// vanishes, the iterate leaves `[lo, hi]`, or the cap runs out.
fn newton(p: &Poly1d, dp: &Poly1d, lo: f64, hi: f64, settings: &SolverSettings) -> Option<f64> {
    let mut x = 0.5 * (lo + hi);
    for _ in 0..settings.newton_iteration_cap {
        let fx = p.eval(x);
        if fx == 0.0 {
            return Some(x);
        }
        let dfx = dp.eval(x);
        if dfx == 0.0 || !dfx.is_finite() {
            return None;
        }
        let step = fx / dfx;
        x -= step;
        if !x.is_finite() || x < lo || x > hi {
            return None;
        }
        if step.abs() <= settings.eps {
            return Some(x);
        }
    }
    None
}
