//! Power-basis form of a cubic Bézier segment and its distance objective.
//!
//! A segment with control points `P0..P3` is rewritten as
//! `B(t) = a t^3 + b t^2 + c t + d` so that the polynomial
//! `(B(t) - Q) . B'(t)` can be assembled coefficient by coefficient. Its real
//! roots are the parameters where the squared distance from `Q` is stationary.
//!
//! Everything that does not depend on `Q` is computed once at construction.
//! When the cubic term vanishes (a parabola or an evenly parameterised line
//! written as a cubic) the objective drops to degree 3 or 1 and is normalised
//! by its actual leading coefficient. Only a segment whose control points
//! collapse onto one point is rejected.

use super::core::{Point3, Tolerance, Vec3};
use super::curve::Curve3;
use super::error::ConstructionError;
use super::poly::{Poly1d, QUINTIC_COEFFS};

/// Query-independent part of the distance-stationarity polynomial, normalised
/// to be monic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectivePolynomial {
    /// Ascending coefficients of `(B(t) - O) . B'(t)` divided by its leading
    /// coefficient.
    base: [f64; QUINTIC_COEFFS],
    /// Derivative coefficients `[c, 2b, 3a]` under the same scaling.
    /// Dotted with the query they give the terms it subtracts from `t^0..t^2`.
    query_terms: [Vec3; 3],
    degree: usize,
}

impl ObjectivePolynomial {
    /// `None` when every coefficient vanishes, i.e. `B'` is identically zero.
    fn from_power_basis(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Option<Self> {
        let raw = [
            c.dot(d),
            2.0 * b.dot(d) + c.dot(c),
            3.0 * (a.dot(d) + b.dot(c)),
            4.0 * a.dot(c) + 2.0 * b.dot(b),
            5.0 * a.dot(b),
            3.0 * a.dot(a),
        ];
        // The top surviving coefficient is a squared norm: 3a.a, 2b.b or c.c.
        let degree = [5, 3, 1].into_iter().find(|&k| raw[k] > 0.0)?;
        let inv_lead = 1.0 / raw[degree];
        if !inv_lead.is_finite() {
            return None;
        }

        let mut base = [0.0; QUINTIC_COEFFS];
        for (slot, coeff) in base.iter_mut().zip(raw).take(degree) {
            *slot = coeff * inv_lead;
        }
        base[degree] = 1.0;

        Some(Self {
            base,
            query_terms: [c * inv_lead, b * (2.0 * inv_lead), a * (3.0 * inv_lead)],
            degree,
        })
    }

    /// Monic coefficients with the query point folded in.
    #[must_use]
    pub fn for_query(&self, query: Point3) -> Poly1d {
        let q = query.to_vec3();
        let mut coeffs = self.base;
        for (slot, term) in coeffs.iter_mut().zip(self.query_terms) {
            *slot -= term.dot(q);
        }
        Poly1d::new(coeffs)
    }

    #[must_use]
    pub const fn base_coefficients(&self) -> &[f64; QUINTIC_COEFFS] {
        &self.base
    }

    /// 5 for a true cubic, 3 when the cubic term vanishes, 1 for a line.
    #[must_use]
    pub const fn degree(&self) -> usize {
        self.degree
    }
}

/// One cubic piece of a path, in power-basis form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    index: usize,
    control: [Point3; 4],
    /// `[a, b, c, d]`, highest power first.
    coeffs: [Vec3; 4],
    /// `[3a, 2b, c]`, highest power first.
    derivative: [Vec3; 3],
    objective: ObjectivePolynomial,
}

impl CubicSegment {
    /// Builds segment `index` of a path from its four control points.
    ///
    /// # Errors
    /// [`ConstructionError::DegenerateSegment`] when the control points are not
    /// finite or collapse onto a single point.
    pub fn new(index: usize, control: [Point3; 4]) -> Result<Self, ConstructionError> {
        let degenerate = || ConstructionError::DegenerateSegment {
            index,
            first_point: 3 * index,
            last_point: 3 * index + 3,
        };

        let [p0, p1, p2, p3] = control.map(Point3::to_vec3);
        let mut a = p3 - p0 + (p1 - p2) * 3.0;
        let mut b = (p0 + p2) * 3.0 - p1 * 6.0;
        let c = (p1 - p0) * 3.0;
        let d = p0;

        if !(a.is_finite() && b.is_finite() && c.is_finite() && d.is_finite()) {
            return Err(degenerate());
        }
        // Snap vanishing leading terms so the objective degree drops cleanly.
        if Tolerance::ZERO_LENGTH.is_zero_vec3(a) {
            a = Vec3::ZERO;
            if Tolerance::ZERO_LENGTH.is_zero_vec3(b) {
                b = Vec3::ZERO;
            }
        }
        if Tolerance::ZERO_LENGTH.is_zero_vec3(a)
            && Tolerance::ZERO_LENGTH.is_zero_vec3(b)
            && Tolerance::ZERO_LENGTH.is_zero_vec3(c)
        {
            return Err(degenerate());
        }

        let objective = ObjectivePolynomial::from_power_basis(a, b, c, d).ok_or_else(degenerate)?;

        Ok(Self {
            index,
            control,
            coeffs: [a, b, c, d],
            derivative: [a * 3.0, b * 2.0, c],
            objective,
        })
    }

    /// Position of this segment within its path.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn control_points(&self) -> &[Point3; 4] {
        &self.control
    }

    #[must_use]
    pub const fn start(&self) -> Point3 {
        self.control[0]
    }

    #[must_use]
    pub const fn end(&self) -> Point3 {
        self.control[3]
    }

    #[must_use]
    pub const fn power_coefficients(&self) -> &[Vec3; 4] {
        &self.coeffs
    }

    #[must_use]
    pub const fn derivative_coefficients(&self) -> &[Vec3; 3] {
        &self.derivative
    }

    #[must_use]
    pub const fn objective(&self) -> &ObjectivePolynomial {
        &self.objective
    }

    /// Evaluates the cubic without clamping `t`.
    #[must_use]
    pub fn eval(&self, t: f64) -> Point3 {
        let [a, b, c, d] = self.coeffs;
        Point3::from(((a * t + b) * t + c) * t + d)
    }

    #[must_use]
    pub fn eval_derivative(&self, t: f64) -> Vec3 {
        let [a3, b2, c] = self.derivative;
        (a3 * t + b2) * t + c
    }
}

impl Curve3 for CubicSegment {
    fn point_at(&self, t: f64) -> Point3 {
        self.eval(t.clamp(0.0, 1.0))
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        self.eval_derivative(t.clamp(0.0, 1.0))
    }

    fn second_derivative_at(&self, t: f64) -> Vec3 {
        let [a3, b2, _] = self.derivative;
        a3 * (2.0 * t.clamp(0.0, 1.0)) + b2
    }
}
