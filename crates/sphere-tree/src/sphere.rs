//! Bounding sphere and its volume tests.

use std::f32::consts::PI;

use nalgebra::{Point3, Vector3};

use crate::{Classification, Plane3D, Ray};

/// Slack allowed by [`Sphere::contains`] to absorb rounding in [`Sphere::merged`].
pub const CONTAINMENT_EPSILON: f32 = 1e-4;

/// A sphere in 3D space, the bounding volume of every tree node.
///
/// Spheres are plain values and compare equal by center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Point3<f32>,
    radius: f32,
}

impl Sphere {
    /// Creates a sphere. Negative radii are clamped to zero.
    pub fn new(center: Point3<f32>, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Creates a zero-radius sphere at `center`.
    pub fn point(center: Point3<f32>) -> Self {
        Self::new(center, 0.0)
    }

    /// Fits a sphere around a point set: centroid center, farthest point radius.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[Point3<f32>]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let sum: Vector3<f32> = points.iter().map(|p| p.coords).sum();
        let center = Point3::from(sum / points.len() as f32);
        let radius = points
            .iter()
            .map(|p| (p - center).norm())
            .fold(0.0, f32::max);
        Some(Self::new(center, radius))
    }

    #[inline]
    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Returns the enclosed volume, the cost measure of the insertion heuristic.
    #[inline]
    pub fn volume(&self) -> f32 {
        4.0 / 3.0 * PI * self.radius * self.radius * self.radius
    }

    #[inline]
    pub fn surface_area(&self) -> f32 {
        4.0 * PI * self.radius * self.radius
    }

    /// Returns this sphere moved by `offset`.
    #[inline]
    pub fn translated(&self, offset: Vector3<f32>) -> Self {
        Self::new(self.center + offset, self.radius)
    }

    /// Returns the smallest sphere enclosing both `self` and `other`.
    ///
    /// If one sphere already encloses the other, the enclosing one is
    /// returned unchanged.
    pub fn merged(&self, other: &Sphere) -> Sphere {
        let delta = other.center - self.center;
        let distance = delta.norm();

        if distance + other.radius <= self.radius {
            return *self;
        }
        if distance + self.radius <= other.radius {
            return *other;
        }

        // Both extremes lie on the line through the centers.
        let radius = (distance + self.radius + other.radius) * 0.5;
        let center = self.center + delta * ((radius - self.radius) / distance);

        // The rounded center drifts with coordinate magnitude. Grow the radius
        // so both inputs pass `contains` under the same arithmetic.
        let reach_self = (self.center - center).norm() + self.radius;
        let reach_other = (other.center - center).norm() + other.radius;
        Sphere::new(center, radius.max(reach_self).max(reach_other))
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    ///
    /// Allows [`CONTAINMENT_EPSILON`] of slack, scaled by the radius.
    pub fn contains(&self, other: &Sphere) -> bool {
        let distance = (other.center - self.center).norm();
        distance + other.radius <= self.radius + CONTAINMENT_EPSILON * (1.0 + self.radius)
    }

    /// Returns `true` if the two spheres touch or overlap.
    #[inline]
    pub fn intersects(&self, other: &Sphere) -> bool {
        let radius_sum = self.radius + other.radius;
        (other.center - self.center).norm_squared() <= radius_sum * radius_sum
    }

    /// Returns `true` if the ray touches the sphere at some `t >= 0`.
    ///
    /// A ray starting inside the sphere always hits. A zero-length direction
    /// degenerates to a point-in-sphere test.
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        let m = ray.origin() - self.center;
        let c = m.norm_squared() - self.radius * self.radius;
        if c <= 0.0 {
            return true;
        }

        let d = ray.direction();
        let a = d.norm_squared();
        if a <= f32::EPSILON {
            return false;
        }

        // Origin outside and pointing away.
        let b = m.dot(&d);
        if b > 0.0 {
            return false;
        }

        b * b - a * c >= 0.0
    }

    /// Classifies the sphere against a plane.
    pub fn classify(&self, plane: &Plane3D) -> Classification {
        let distance = plane.signed_distance(self.center);
        if distance < -self.radius {
            Classification::Back
        } else if distance >= self.radius {
            Classification::Front
        } else {
            Classification::Spanning
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sphere(x: f32, y: f32, z: f32, r: f32) -> Sphere {
        Sphere::new(Point3::new(x, y, z), r)
    }

    #[test]
    fn negative_radius_is_clamped() {
        assert_eq!(sphere(0.0, 0.0, 0.0, -2.0).radius(), 0.0);
    }

    #[test]
    fn merge_disjoint_spheres() {
        let merged = sphere(0.0, 0.0, 0.0, 1.0).merged(&sphere(4.0, 0.0, 0.0, 1.0));
        assert_relative_eq!(merged.center(), Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(merged.radius(), 3.0);
    }

    #[test]
    fn merge_unequal_spheres_is_tight() {
        let a = sphere(0.0, 0.0, 0.0, 1.0);
        let b = sphere(0.0, 5.0, 0.0, 2.0);
        let merged = a.merged(&b);
        // Extremes at y = -1 and y = 7.
        assert_relative_eq!(merged.center(), Point3::new(0.0, 3.0, 0.0));
        assert_relative_eq!(merged.radius(), 4.0);
        assert!(merged.contains(&a));
        assert!(merged.contains(&b));
    }

    #[test]
    fn merge_returns_enclosing_sphere_unchanged() {
        let big = sphere(1.0, 1.0, 1.0, 5.0);
        let small = sphere(2.0, 1.0, 1.0, 1.0);
        assert_eq!(big.merged(&small), big);
        assert_eq!(small.merged(&big), big);
    }

    #[test]
    fn merge_of_coincident_zero_radius_spheres() {
        let p = sphere(3.0, -1.0, 2.0, 0.0);
        assert_eq!(p.merged(&p), p);
    }

    #[test]
    fn merge_encloses_inputs_far_from_origin() {
        for base in [1.0e4_f32, 1.0e5, 1.0e6] {
            for i in 0..50 {
                let t = i as f32;
                let a = sphere(base + t * 0.37, base - t * 1.13, base + 0.5, 0.1 * t);
                let b = sphere(base - 3.1 + t, base + 7.9, base - t * 0.71, 2.9 - 0.05 * t);
                let merged = a.merged(&b);
                assert!(merged.contains(&a), "base {base}, step {i}");
                assert!(merged.contains(&b), "base {base}, step {i}");
            }
        }
    }

    #[test]
    fn contains_and_intersects() {
        let a = sphere(0.0, 0.0, 0.0, 2.0);
        assert!(a.contains(&sphere(1.0, 0.0, 0.0, 1.0)));
        assert!(!a.contains(&sphere(1.5, 0.0, 0.0, 1.0)));
        assert!(a.intersects(&sphere(3.0, 0.0, 0.0, 1.0)));
        assert!(!a.intersects(&sphere(3.1, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn ray_hits_sphere_ahead() {
        let ray = Ray::new(Point3::origin(), Vector3::new(10.0, 0.0, 0.0));
        assert!(sphere(5.0, 0.5, 0.0, 1.0).intersects_ray(&ray));
        assert!(!sphere(5.0, 1.5, 0.0, 1.0).intersects_ray(&ray));
    }

    #[test]
    fn ray_ignores_sphere_behind_origin() {
        let ray = Ray::new(Point3::origin(), Vector3::x());
        assert!(!sphere(-1.0, 0.0, 0.0, 0.5).intersects_ray(&ray));
    }

    #[test]
    fn ray_starting_inside_hits() {
        let ray = Ray::new(Point3::origin(), -Vector3::x());
        assert!(sphere(0.5, 0.0, 0.0, 1.0).intersects_ray(&ray));
    }

    #[test]
    fn zero_direction_ray_is_a_point_test() {
        let ray = Ray::new(Point3::new(1.0, 0.0, 0.0), Vector3::zeros());
        assert!(sphere(0.0, 0.0, 0.0, 2.0).intersects_ray(&ray));
        assert!(!sphere(5.0, 0.0, 0.0, 2.0).intersects_ray(&ray));
    }

    #[test]
    fn zero_radius_sphere_on_ray() {
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, 2.0));
        assert!(Sphere::point(Point3::new(0.0, 0.0, 3.0)).intersects_ray(&ray));
        assert!(!Sphere::point(Point3::new(0.0, 0.1, 3.0)).intersects_ray(&ray));
    }

    #[test]
    fn classify_against_plane() {
        let plane = Plane3D::new(Vector3::x(), 0.0);
        assert_eq!(sphere(2.0, 0.0, 0.0, 1.0).classify(&plane), Classification::Front);
        assert_eq!(sphere(-2.0, 0.0, 0.0, 1.0).classify(&plane), Classification::Back);
        assert_eq!(sphere(0.5, 0.0, 0.0, 1.0).classify(&plane), Classification::Spanning);
    }

    #[test]
    fn fit_from_points() {
        let points = [
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let fitted = Sphere::from_points(&points).unwrap();
        assert_relative_eq!(fitted.center(), Point3::origin());
        assert_relative_eq!(fitted.radius(), 1.0);
        assert!(Sphere::from_points(&[]).is_none());
    }

    #[test]
    fn volume_and_area() {
        let unit = sphere(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(unit.volume(), 4.0 / 3.0 * PI);
        assert_relative_eq!(unit.surface_area(), 4.0 * PI);
    }
}
