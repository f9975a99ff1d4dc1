use std::ops::{Add, Div, Mul, Neg, Sub};

use super::error::ConfigError;

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub const fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn mul_scalar(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    #[must_use]
    pub const fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    #[must_use]
    pub const fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    /// Returns `true` when every component is finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    // Colour and texture-coordinate views over the same three components.

    #[must_use]
    pub const fn r(self) -> f64 {
        self.x
    }

    #[must_use]
    pub const fn g(self) -> f64 {
        self.y
    }

    #[must_use]
    pub const fn b(self) -> f64 {
        self.z
    }

    #[must_use]
    pub const fn s(self) -> f64 {
        self.x
    }

    #[must_use]
    pub const fn t(self) -> f64 {
        self.y
    }

    #[must_use]
    pub const fn p(self) -> f64 {
        self.z
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Vec3::add(self, rhs)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Vec3::sub(self, rhs)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        self.mul_scalar(rhs)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Self::Output {
        rhs.mul_scalar(self)
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// The origin point (0, 0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Position vector from the origin.
    #[must_use]
    pub const fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    #[must_use]
    pub const fn add_vec(self, v: Vec3) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }

    #[must_use]
    pub const fn sub_point(self, rhs: Self) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        self.sub_point(other).length()
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared_to(self, other: Self) -> f64 {
        self.sub_point(other).length_squared()
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.to_vec3().is_finite()
    }
}

impl Default for Point3 {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(arr: [f64; 3]) -> Self {
        Self::from_array(arr)
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

impl From<Vec3> for Point3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Point3> for Vec3 {
    fn from(p: Point3) -> Self {
        p.to_vec3()
    }
}

impl Add<Vec3> for Point3 {
    type Output = Self;
    fn add(self, rhs: Vec3) -> Self::Output {
        self.add_vec(rhs)
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_point(rhs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Smallest epsilon the root solver will ever work with. Two ulps at 1.0, so a
/// bracket inside `[0, 1]` that is still wider than this can always be split.
pub const SOLVER_EPS_FLOOR: f64 = 2.0 * f64::EPSILON;

/// Absorbs `log10` rounding so that exact powers of ten count their own digits.
const DIGIT_SLACK: f64 = 1e-9;

fn decimal_digits(eps: f64) -> f64 {
    (-eps.log10() - DIGIT_SLACK).ceil()
}

/// Tolerance configuration for projection.
///
/// A single value drives three things in the solver:
/// - the bracket width at which an isolating interval is accepted as a root,
/// - the Newton iteration cap ([`Tolerance::newton_iteration_cap`]),
/// - the precision check against `f64` ([`Tolerance::projection`]).
///
/// The named constants cover the non-solver comparisons:
/// - `Tolerance::DEFAULT` - projection default (1e-5)
/// - `Tolerance::ZERO_LENGTH` - detecting a vanishing cubic coefficient (1e-12)
/// - `Tolerance::LOOSE` - coarse comparisons in tests and reports (1e-6)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    /// Default projection tolerance (1e-5).
    pub const DEFAULT: Self = Self { eps: 1e-5 };

    /// Tolerance for detecting zero-length/degenerate vectors (1e-12).
    pub const ZERO_LENGTH: Self = Self { eps: 1e-12 };

    /// Loose tolerance for coarse comparisons (1e-6).
    pub const LOOSE: Self = Self { eps: 1e-6 };

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    /// Validates `eps` for use by the projection solver.
    ///
    /// # Errors
    /// [`ConfigError::ToleranceOutOfRange`] unless `0 < eps < 1`;
    /// [`ConfigError::ToleranceExceedsPrecision`] when `eps` asks for more
    /// decimal digits than `f64` represents.
    pub fn projection(eps: f64) -> Result<Self, ConfigError> {
        let tol = Self::new(eps);
        tol.validate_for_digits(f64::DIGITS)?;
        Ok(tol)
    }

    /// Checks this tolerance against a coordinate type with `available_digits`
    /// significant decimal digits.
    pub fn validate_for_digits(self, available_digits: u32) -> Result<(), ConfigError> {
        if !(self.eps > 0.0 && self.eps < 1.0) {
            return Err(ConfigError::ToleranceOutOfRange { value: self.eps });
        }
        let required_digits = self.required_digits();
        if required_digits > available_digits {
            return Err(ConfigError::ToleranceExceedsPrecision {
                value: self.eps,
                required_digits,
                available_digits,
            });
        }
        Ok(())
    }

    /// Number of decimal digits needed to represent this tolerance.
    #[must_use]
    pub fn required_digits(self) -> u32 {
        if self.eps >= 1.0 {
            return 1;
        }
        let digits = decimal_digits(self.eps);
        if digits.is_finite() && digits > 0.0 {
            digits as u32
        } else {
            u32::MAX
        }
    }

    /// Epsilon used for bracket acceptance and Newton residuals.
    #[must_use]
    pub fn solver_eps(self) -> f64 {
        self.eps.max(SOLVER_EPS_FLOOR)
    }

    /// Newton iterations allowed before falling back to bisection:
    /// `ceil(log2(ceil(-log10(eps)))) + 1`.
    #[must_use]
    pub fn newton_iteration_cap(self) -> usize {
        let digits = decimal_digits(self.solver_eps()).max(1.0);
        let cap = digits.log2().ceil() + 1.0;
        if cap.is_finite() && cap >= 1.0 {
            cap as usize
        } else {
            1
        }
    }

    #[must_use]
    pub const fn eps_squared(self) -> f64 {
        self.eps * self.eps
    }

    #[must_use]
    pub fn approx_eq_point3(self, a: Point3, b: Point3) -> bool {
        a.sub_point(b).length_squared() <= self.eps_squared()
    }

    /// Check if a vector is approximately zero (degenerate).
    #[must_use]
    pub fn is_zero_vec3(self, v: Vec3) -> bool {
        v.length_squared() <= self.eps_squared()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
