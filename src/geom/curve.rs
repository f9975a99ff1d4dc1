use super::core::{Point3, Vec3};

/// A parametric curve in 3-D, evaluated over [`Curve3::domain`].
pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    fn derivative_at(&self, t: f64) -> Vec3;

    fn second_derivative_at(&self, t: f64) -> Vec3;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}

/// Cubic Bézier in Bernstein form.
///
/// [`CubicSegment`](super::CubicSegment) evaluates the same curve through its
/// power basis; this form is kept as the reference evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier3 {
    pub p0: Point3,
    pub p1: Point3,
    pub p2: Point3,
    pub p3: Point3,
}

impl CubicBezier3 {
    #[must_use]
    pub const fn new(p0: Point3, p1: Point3, p2: Point3, p3: Point3) -> Self {
        Self { p0, p1, p2, p3 }
    }

    #[must_use]
    pub const fn from_array(points: [Point3; 4]) -> Self {
        Self::new(points[0], points[1], points[2], points[3])
    }
}

impl Curve3 for CubicBezier3 {
    fn point_at(&self, t: f64) -> Point3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let u2 = u * u;
        let t2 = t * t;
        let sum = self.p0.to_vec3() * (u2 * u)
            + self.p1.to_vec3() * (3.0 * u2 * t)
            + self.p2.to_vec3() * (3.0 * u * t2)
            + self.p3.to_vec3() * (t2 * t);
        Point3::from(sum)
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let a = self.p1.sub_point(self.p0);
        let b = self.p2.sub_point(self.p1);
        let c = self.p3.sub_point(self.p2);
        a.mul_scalar(3.0 * u * u)
            .add(b.mul_scalar(6.0 * u * t))
            .add(c.mul_scalar(3.0 * t * t))
    }

    fn second_derivative_at(&self, t: f64) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let a = self.p2.sub_point(self.p1).sub(self.p1.sub_point(self.p0));
        let b = self.p3.sub_point(self.p2).sub(self.p2.sub_point(self.p1));
        a.mul_scalar(6.0 * (1.0 - t)).add(b.mul_scalar(6.0 * t))
    }
}

/// Samples `steps + 1` points at uniformly spaced parameters over the domain.
#[must_use]
pub fn tessellate_curve_uniform(curve: &impl Curve3, steps: usize) -> Vec<Point3> {
    let steps = steps.max(1);
    let (t0, t1) = curve.domain();
    let span = t1 - t0;
    (0..=steps)
        .map(|i| curve.point_at(t0 + span * (i as f64 / steps as f64)))
        .collect()
}
