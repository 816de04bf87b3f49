//! View frustum: six inward-facing planes plus the plane mask used by
//! hierarchical culling.

use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector3, Vector4};

use crate::{Classification, GeometryError, Plane3D, Sphere};

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Number of planes bounding a frustum.
pub const PLANE_COUNT: usize = 6;

/// Bitset over the six frustum planes.
///
/// Bit `i` set means plane `i` must still be tested for the current subtree.
/// A plane is dropped once an ancestor's bound is proven fully in front of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaneMask(u8);

impl PlaneMask {
    /// Every plane still needs testing.
    pub const ALL: PlaneMask = PlaneMask((1 << PLANE_COUNT) - 1);
    /// Nothing left to test: the subtree is inside the frustum.
    pub const EMPTY: PlaneMask = PlaneMask(0);

    #[inline]
    pub fn contains(self, plane: usize) -> bool {
        plane < PLANE_COUNT && self.0 & (1 << plane) != 0
    }

    /// Returns the mask with `plane` added.
    #[inline]
    pub fn with(self, plane: usize) -> PlaneMask {
        PlaneMask(self.0 | (1 << plane))
    }

    /// Returns the mask with `plane` removed.
    #[inline]
    pub fn without(self, plane: usize) -> PlaneMask {
        PlaneMask(self.0 & !(1 << plane))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterates over the indices of the planes in the mask.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..PLANE_COUNT).filter(move |&plane| self.contains(plane))
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }
}

impl Default for PlaneMask {
    fn default() -> Self {
        PlaneMask::ALL
    }
}

/// Outcome of testing one bound against the planes of a [`PlaneMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskStep {
    /// Behind one of the tested planes; the whole subtree is invisible.
    Outside,
    /// Not behind any tested plane. Carries the planes the bound still
    /// straddles, which is the mask to hand to its children.
    Visible(PlaneMask),
}

/// Six clipping planes for visibility culling.
///
/// Plane normals point inward, so a point is inside the frustum when it lies
/// in front of (or on) all six planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Plane3D; PLANE_COUNT],
}

impl Frustum {
    /// Creates a frustum from planes ordered left, right, bottom, top, near, far.
    pub fn new(planes: [Plane3D; PLANE_COUNT]) -> Self {
        Self { planes }
    }

    /// Creates a frustum from its eight corners.
    ///
    /// Corners are the near face followed by the far face, each ordered
    /// left-bottom, right-bottom, right-top, left-top. Plane orientation is
    /// fixed up against the corner centroid, so winding does not matter.
    pub fn from_corners(corners: [Point3<f32>; 8]) -> Result<Self, GeometryError> {
        const FACES: [[usize; 3]; PLANE_COUNT] = [
            [0, 3, 4], // left
            [1, 5, 2], // right
            [0, 4, 1], // bottom
            [3, 2, 7], // top
            [0, 1, 2], // near
            [4, 5, 6], // far
        ];

        let sum: Vector3<f32> = corners.iter().map(|c| c.coords).sum();
        let centroid = Point3::from(sum / 8.0);

        let mut planes = [Plane3D::new(Vector3::x(), 0.0); PLANE_COUNT];
        for (plane, [a, b, c]) in planes.iter_mut().zip(FACES) {
            let face = Plane3D::try_from_three_points(corners[a], corners[b], corners[c])
                .map_err(|_| GeometryError::DegenerateFrustum)?;
            let distance = face.signed_distance(centroid);
            if distance.abs() <= f32::EPSILON {
                return Err(GeometryError::DegenerateFrustum);
            }
            *plane = if distance < 0.0 { face.flipped() } else { face };
        }

        Ok(Self { planes })
    }

    /// Extracts the frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method with OpenGL clip conventions
    /// (`-w <= z <= w`), which is what [`Perspective3`] produces.
    ///
    /// # Panics
    /// Panics if a row combination yields a zero normal, which only happens
    /// for a singular matrix.
    pub fn from_view_projection(vp: &Matrix4<f32>) -> Self {
        let row = |i: usize| -> Vector4<f32> { vp.row(i).transpose() };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let to_plane = |v: Vector4<f32>| Plane3D::new(Vector3::new(v.x, v.y, v.z), -v.w);

        Self {
            planes: [
                to_plane(r3 + r0),
                to_plane(r3 - r0),
                to_plane(r3 + r1),
                to_plane(r3 - r1),
                to_plane(r3 + r2),
                to_plane(r3 - r2),
            ],
        }
    }

    /// Builds a perspective frustum for a camera at `eye` looking at `target`.
    ///
    /// `fovy` is the vertical field of view in radians.
    pub fn perspective(
        eye: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fovy: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let view = Isometry3::look_at_rh(&eye, &target, &up);
        let projection = Perspective3::new(aspect, fovy, near, far);
        Self::from_view_projection(&(projection.as_matrix() * view.to_homogeneous()))
    }

    #[inline]
    pub fn planes(&self) -> &[Plane3D; PLANE_COUNT] {
        &self.planes
    }

    #[inline]
    pub fn plane(&self, index: usize) -> &Plane3D {
        &self.planes[index]
    }

    /// Classifies a sphere against the whole frustum.
    ///
    /// - `Back`: outside at least one plane
    /// - `Front`: inside all planes
    /// - `Spanning`: crosses the boundary
    pub fn classify_sphere(&self, sphere: &Sphere) -> Classification {
        match self.narrow_mask(sphere, PlaneMask::ALL).0 {
            MaskStep::Outside => Classification::Back,
            MaskStep::Visible(mask) if mask.is_empty() => Classification::Front,
            MaskStep::Visible(_) => Classification::Spanning,
        }
    }

    /// Tests `sphere` against the planes in `mask` and returns the narrowed mask.
    ///
    /// Planes the sphere is fully in front of are dropped; planes it
    /// straddles are kept. Testing stops at the first plane the sphere is
    /// behind. The second value is the number of plane tests performed.
    pub fn narrow_mask(&self, sphere: &Sphere, mask: PlaneMask) -> (MaskStep, u32) {
        let mut narrowed = mask;
        let mut tests = 0;

        for index in mask.iter() {
            tests += 1;
            match sphere.classify(&self.planes[index]) {
                Classification::Back => return (MaskStep::Outside, tests),
                Classification::Front => narrowed = narrowed.without(index),
                Classification::Spanning => {}
            }
        }

        (MaskStep::Visible(narrowed), tests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn unit_box() -> Frustum {
        Frustum::from_corners([
            Point3::new(-1.0, -1.0, 1.0),
            Point3::new(1.0, -1.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(-1.0, 1.0, 1.0),
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(1.0, 1.0, -1.0),
            Point3::new(-1.0, 1.0, -1.0),
        ])
        .unwrap()
    }

    fn sphere(x: f32, y: f32, z: f32, r: f32) -> Sphere {
        Sphere::new(Point3::new(x, y, z), r)
    }

    #[test]
    fn plane_mask_operations() {
        let mask = PlaneMask::ALL.without(PLANE_NEAR).without(PLANE_LEFT);
        assert!(!mask.contains(PLANE_NEAR));
        assert!(mask.contains(PLANE_FAR));
        assert_eq!(mask.len(), 4);
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![1, 2, 3, 5]);
        assert!(PlaneMask::EMPTY.is_empty());
        assert_eq!(PlaneMask::default(), PlaneMask::ALL);
    }

    #[test]
    fn corners_produce_inward_planes() {
        let frustum = unit_box();
        for plane in frustum.planes() {
            assert!(plane.signed_distance(Point3::origin()) > 0.0);
        }
    }

    #[test]
    fn degenerate_corners_are_rejected() {
        let flat = [Point3::origin(); 8];
        assert_eq!(
            Frustum::from_corners(flat),
            Err(GeometryError::DegenerateFrustum)
        );
    }

    #[test]
    fn classify_sphere_in_box() {
        let frustum = unit_box();
        assert_eq!(frustum.classify_sphere(&sphere(0.0, 0.0, 0.0, 0.5)), Classification::Front);
        assert_eq!(frustum.classify_sphere(&sphere(0.0, 0.0, 5.0, 1.0)), Classification::Back);
        assert_eq!(
            frustum.classify_sphere(&sphere(1.0, 0.0, 0.0, 0.5)),
            Classification::Spanning
        );
    }

    #[test]
    fn narrow_mask_drops_inside_planes() {
        let frustum = unit_box();
        // Straddles only the right plane.
        let (step, tests) = frustum.narrow_mask(&sphere(1.0, 0.0, 0.0, 0.5), PlaneMask::ALL);
        assert_eq!(tests, 6);
        match step {
            MaskStep::Visible(mask) => {
                assert_eq!(mask.iter().collect::<Vec<_>>(), vec![PLANE_RIGHT]);
            }
            MaskStep::Outside => panic!("sphere should be visible"),
        }
    }

    #[test]
    fn narrow_mask_only_tests_masked_planes() {
        let frustum = unit_box();
        let (step, tests) = frustum.narrow_mask(&sphere(0.0, 0.0, 0.0, 0.1), PlaneMask::EMPTY);
        assert_eq!(tests, 0);
        assert_eq!(step, MaskStep::Visible(PlaneMask::EMPTY));

        // A sphere outside the left plane is not noticed when that plane is masked out.
        let only_right = PlaneMask::EMPTY.with(PLANE_RIGHT);
        let (step, tests) = frustum.narrow_mask(&sphere(-5.0, 0.0, 0.0, 1.0), only_right);
        assert_eq!(tests, 1);
        assert_eq!(step, MaskStep::Visible(PlaneMask::EMPTY));
        assert_eq!(only_right.bits(), 1 << PLANE_RIGHT);
    }

    #[test]
    fn narrow_mask_stops_at_first_outside_plane() {
        let frustum = unit_box();
        // Left of the box: the left plane is the first tested.
        let (step, tests) = frustum.narrow_mask(&sphere(-5.0, 0.0, 0.0, 1.0), PlaneMask::ALL);
        assert_eq!(step, MaskStep::Outside);
        assert_eq!(tests, 1);
    }

    #[test]
    fn perspective_frustum_culls_behind_camera() {
        let frustum = Frustum::perspective(
            Point3::origin(),
            Point3::new(0.0, 0.0, -1.0),
            Vector3::y(),
            FRAC_PI_2,
            1.0,
            0.1,
            100.0,
        );
        assert_eq!(frustum.classify_sphere(&sphere(0.0, 0.0, -10.0, 1.0)), Classification::Front);
        assert_eq!(frustum.classify_sphere(&sphere(0.0, 0.0, 10.0, 1.0)), Classification::Back);
        assert_eq!(
            frustum.classify_sphere(&sphere(0.0, 0.0, -100.0, 1.0)),
            Classification::Spanning
        );
        assert_eq!(frustum.classify_sphere(&sphere(50.0, 0.0, -10.0, 1.0)), Classification::Back);
    }
}
