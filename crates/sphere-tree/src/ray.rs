//! Ray representation for ray casts.

use nalgebra::{Point3, Vector3};

/// A half-line starting at `origin` and extending along `direction`.
///
/// The direction is stored as given and need not be normalized. Callers that
/// want `t` to be a metric distance should normalize it themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Point3<f32>,
    direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    /// Creates a ray from `origin` through `target`.
    pub fn through(origin: Point3<f32>, target: Point3<f32>) -> Self {
        Self::new(origin, target - origin)
    }

    #[inline]
    pub fn origin(&self) -> Point3<f32> {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    /// Returns `origin + direction * t`.
    #[inline]
    pub fn point_at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn direction_is_not_normalized() {
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 3.0, 0.0));
        assert_relative_eq!(ray.direction().norm(), 3.0);
        assert_relative_eq!(ray.point_at(2.0), Point3::new(0.0, 6.0, 0.0));
    }

    #[test]
    fn through_points_at_target() {
        let ray = Ray::through(Point3::new(1.0, 1.0, 1.0), Point3::new(2.0, 3.0, 4.0));
        assert_relative_eq!(ray.point_at(1.0), Point3::new(2.0, 3.0, 4.0));
    }
}
