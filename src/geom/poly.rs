//! Fixed-capacity scalar polynomials of degree at most five.
//!
//! Coefficients are stored in ascending order (`coeffs[k]` multiplies `t^k`).
//! Every polynomial the projection engine touches descends from one quintic,
//! so a fixed array avoids heap traffic in the per-query hot path.

/// Degree of the distance-stationarity polynomial.
pub const QUINTIC: usize = 5;

/// Number of coefficients of a quintic.
pub const QUINTIC_COEFFS: usize = QUINTIC + 1;

/// Remainder coefficients below this fraction of the dividend's largest
/// coefficient are cancellation noise and are dropped.
const REMAINDER_NOISE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Poly1d {
    coeffs: [f64; QUINTIC_COEFFS],
    degree: usize,
}

impl Poly1d {
    /// The zero polynomial.
    pub const ZERO: Self = Self {
        coeffs: [0.0; QUINTIC_COEFFS],
        degree: 0,
    };

    /// Builds a polynomial from ascending coefficients, trimming exact zeros
    /// off the top.
    #[must_use]
    pub fn new(coeffs: [f64; QUINTIC_COEFFS]) -> Self {
        let mut poly = Self { coeffs, degree: 0 };
        poly.degree = poly.top_nonzero();
        poly
    }

    /// Builds a polynomial from a slice of ascending coefficients.
    ///
    /// Coefficients beyond the quintic term are ignored.
    #[must_use]
    pub fn from_ascending(coeffs: &[f64]) -> Self {
        let mut buf = [0.0; QUINTIC_COEFFS];
        for (slot, c) in buf.iter_mut().zip(coeffs) {
            *slot = *c;
        }
        Self::new(buf)
    }

    fn top_nonzero(&self) -> usize {
        self.top_above(0.0)
    }

    fn top_above(&self, threshold: f64) -> usize {
        self.coeffs
            .iter()
            .rposition(|c| c.abs() > threshold)
            .unwrap_or(0)
    }

    /// Largest coefficient magnitude.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.coeffs().iter().fold(0.0, |acc, c| acc.max(c.abs()))
    }

    #[must_use]
    pub const fn degree(&self) -> usize {
        self.degree
    }

    #[must_use]
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs[..=self.degree]
    }

    #[must_use]
    pub fn leading_coefficient(&self) -> f64 {
        self.coeffs[self.degree]
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.degree == 0 && self.coeffs[0] == 0.0
    }

    /// Horner evaluation.
    #[must_use]
    pub fn eval(&self, t: f64) -> f64 {
        self.coeffs[..=self.degree]
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * t + c)
    }

    #[must_use]
    pub fn derivative(&self) -> Self {
        let mut out = [0.0; QUINTIC_COEFFS];
        for k in 1..=self.degree {
            out[k - 1] = k as f64 * self.coeffs[k];
        }
        Self::new(out)
    }

    #[must_use]
    pub fn negated(&self) -> Self {
        self.scaled(-1.0)
    }

    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = self.coeffs;
        for c in &mut out {
            *c *= factor;
        }
        Self::new(out)
    }

    /// Remainder of the long division `self / divisor`.
    ///
    /// Returns `None` when the remainder vanishes (up to cancellation noise)
    /// or when `divisor` is the zero polynomial.
    #[must_use]
    pub fn remainder(&self, divisor: &Self) -> Option<Self> {
        if divisor.is_zero() {
            return None;
        }
        let lead = divisor.leading_coefficient();
        let noise = REMAINDER_NOISE * self.magnitude();
        let mut rem = *self;

        while !rem.is_zero() && rem.degree >= divisor.degree {
            let shift = rem.degree - divisor.degree;
            let q = rem.coeffs[rem.degree] / lead;
            for k in 0..divisor.degree {
                rem.coeffs[k + shift] -= q * divisor.coeffs[k];
            }
            // The leading term cancels by construction; pin it so rounding
            // cannot leave a residue behind.
            rem.coeffs[rem.degree] = 0.0;
            rem.degree = rem.top_nonzero();
        }

        rem.degree = rem.top_above(noise);
        for c in &mut rem.coeffs[rem.degree + 1..] {
            *c = 0.0;
        }
        if rem.coeffs[rem.degree].abs() <= noise {
            return None;
        }
        Some(rem)
    }

    /// The negated remainder used to extend a Sturm chain.
    #[must_use]
    pub fn signed_remainder(&self, divisor: &Self) -> Option<Self> {
        self.remainder(divisor).map(|rem| rem.negated())
    }
}

impl Default for Poly1d {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_leading_zeros() {
        let p = Poly1d::from_ascending(&[1.0, 2.0, 0.0, 0.0]);
        assert_eq!(p.degree(), 1);
        assert_eq!(p.coeffs(), &[1.0, 2.0]);
        assert!(Poly1d::ZERO.is_zero());
        assert!(!Poly1d::from_ascending(&[3.0]).is_zero());
    }

    #[test]
    fn horner_matches_direct_expansion() {
        // 2t^3 - t + 4
        let p = Poly1d::from_ascending(&[4.0, -1.0, 0.0, 2.0]);
        for t in [-1.5, 0.0, 0.3, 2.0] {
            let direct = 2.0 * t * t * t - t + 4.0;
            assert!((p.eval(t) - direct).abs() < 1e-12);
        }
    }

    #[test]
    fn derivative_scales_by_exponent() {
        let p = Poly1d::from_ascending(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(p.derivative().coeffs(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(Poly1d::from_ascending(&[7.0]).derivative().is_zero());
    }

    #[test]
    fn remainder_of_exact_division_vanishes() {
        // (t - 1)(t + 2) = t^2 + t - 2
        let p = Poly1d::from_ascending(&[-2.0, 1.0, 1.0]);
        let d = Poly1d::from_ascending(&[-1.0, 1.0]);
        assert_eq!(p.remainder(&d), None);
    }

    #[test]
    fn remainder_has_lower_degree() {
        // t^3 + 2t + 5 divided by t^2 + 1 leaves t + 5
        let p = Poly1d::from_ascending(&[5.0, 2.0, 0.0, 1.0]);
        let d = Poly1d::from_ascending(&[1.0, 0.0, 1.0]);
        let rem = p.remainder(&d).expect("nonzero remainder");
        assert_eq!(rem.degree(), 1);
        assert!((rem.coeffs()[0] - 5.0).abs() < 1e-12);
        assert!((rem.coeffs()[1] - 1.0).abs() < 1e-12);

        let signed = p.signed_remainder(&d).expect("nonzero remainder");
        assert!((signed.coeffs()[0] + 5.0).abs() < 1e-12);
    }

    #[test]
    fn remainder_drops_cancellation_noise() {
        // (t - 0.1)(t - 0.7) divided by a slightly perturbed (t - 0.1)
        let p = Poly1d::from_ascending(&[0.07, -0.8, 1.0]);
        let d = Poly1d::from_ascending(&[-0.1 + 1e-15, 1.0]);
        assert_eq!(p.remainder(&d), None);
    }

    #[test]
    fn scaling_preserves_signs() {
        let p = Poly1d::from_ascending(&[-3.0, 0.0, 6.0]);
        let s = p.scaled(1.0 / 6.0);
        assert_eq!(s.degree(), 2);
        for t in [0.0, 0.5, 0.9] {
            assert_eq!(p.eval(t).signum(), s.eval(t).signum());
        }
        assert_eq!(p.negated().coeffs(), &[3.0, 0.0, -6.0]);
    }

    #[test]
    fn remainder_by_constant_is_zero() {
        let p = Poly1d::from_ascending(&[1.0, 2.0, 3.0]);
        assert_eq!(p.remainder(&Poly1d::from_ascending(&[2.0])), None);
        assert_eq!(p.remainder(&Poly1d::ZERO), None);
    }
}
