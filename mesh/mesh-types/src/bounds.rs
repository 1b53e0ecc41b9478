//! Axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

use crate::{CoordSystem, Tri, TriMesh};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box (AABB).
///
/// Represents a 3D box aligned with the coordinate axes, defined by
/// minimum and maximum corner points. The *empty* box has `min = +INF`
/// and `max = -INF`, so expanding an empty box by a point always yields
/// that point.
///
/// # Example
///
/// ```
/// use mesh_types::{Aabb, Point3};
///
/// let mut aabb = Aabb::empty();
/// assert!(aabb.is_empty());
///
/// aabb.expand_to_include(&Point3::new(1.0, 2.0, 3.0));
/// aabb.expand_to_include(&Point3::new(-1.0, 0.0, 0.0));
///
/// assert!(aabb.contains(&Point3::new(0.0, 1.0, 1.5)));
/// assert_eq!(aabb.size(), nalgebra::Vector3::new(2.0, 2.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner (smallest x, y, z values).
    pub min: Point3<f32>,
    /// Maximum corner (largest x, y, z values).
    pub max: Point3<f32>,
}

impl Aabb {
    /// Create a new AABB from minimum and maximum corners.
    ///
    /// The corners are reordered if min > max for any axis.
    #[must_use]
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self {
            min: Point3::new(min.x.min(max.x), min.y.min(max.y), min.z.min(max.z)),
            max: Point3::new(min.x.max(max.x), min.y.max(max.y), min.z.max(max.z)),
        }
    }

    /// Create an AABB containing a single point (zero volume).
    #[inline]
    #[must_use]
    pub const fn from_point(point: Point3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Create an empty (degenerate) AABB.
    ///
    /// An empty AABB has min > max, which is the identity for
    /// [`Aabb::expand_to_include`] and [`Aabb::union`].
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Create an AABB from an iterator of points.
    ///
    /// Returns an empty AABB if the iterator is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    ///
    /// let points = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(10.0, 5.0, 3.0),
    ///     Point3::new(-2.0, 8.0, 1.0),
    /// ];
    ///
    /// let aabb = Aabb::from_points(points.iter());
    /// assert_eq!(aabb.min, Point3::new(-2.0, 0.0, 0.0));
    /// assert_eq!(aabb.max, Point3::new(10.0, 8.0, 3.0));
    /// ```
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f32>>) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand_to_include(point);
        }
        aabb
    }

    /// Check if the AABB is empty (min > max on any axis).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the AABB to include a point.
    pub fn expand_to_include(&mut self, point: &Point3<f32>) {
        self.min = Point3::new(
            self.min.x.min(point.x),
            self.min.y.min(point.y),
            self.min.z.min(point.z),
        );
        self.max = Point3::new(
            self.max.x.max(point.x),
            self.max.y.max(point.y),
            self.max.z.max(point.z),
        );
    }

    /// Return the smallest AABB containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Check if the AABB contains a point.
    ///
    /// Points on the boundary are considered inside.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: &Point3<f32>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if the AABB fully contains another AABB (faces inclusive).
    #[inline]
    #[must_use]
    pub fn contains_aabb(&self, other: &Self) -> bool {
        self.contains(&other.min) && self.contains(&other.max)
    }

    /// Check if two AABBs overlap (faces inclusive).
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, Point3};
    ///
    /// let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0));
    /// let b = Aabb::new(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0));
    /// assert!(a.intersects(&b)); // shared face counts
    /// ```
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Get the center of the AABB.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Get the size (dimensions) of the AABB.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Get the half-extents of the AABB.
    #[inline]
    #[must_use]
    pub fn half_extents(&self) -> Vector3<f32> {
        self.size() * 0.5
    }

    /// Get the volume of the AABB. Returns 0.0 for empty AABBs.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let s = self.size();
        s.x * s.y * s.z
    }

    /// Get the surface area of the AABB. Returns 0.0 for empty AABBs.
    #[inline]
    #[must_use]
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let s = self.size();
        2.0 * s.z.mul_add(s.x, s.x.mul_add(s.y, s.y * s.z))
    }

    /// Get the diagonal length of the AABB.
    #[inline]
    #[must_use]
    pub fn diagonal(&self) -> f32 {
        self.size().norm()
    }

    /// Get the length of the longest edge.
    #[inline]
    #[must_use]
    pub fn max_extent(&self) -> f32 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }

    /// Get the length of the shortest edge.
    #[inline]
    #[must_use]
    pub fn min_extent(&self) -> f32 {
        let s = self.size();
        s.x.min(s.y).min(s.z)
    }

    /// Get the eight corners of the AABB.
    ///
    /// Corners are ordered bottom face first (z = min), counter-clockwise
    /// from the minimum corner, then the top face in the same order.
    #[must_use]
    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Point3::new(lo.x, lo.y, lo.z),
            Point3::new(hi.x, lo.y, lo.z),
            Point3::new(hi.x, hi.y, lo.z),
            Point3::new(lo.x, hi.y, lo.z),
            Point3::new(lo.x, lo.y, hi.z),
            Point3::new(hi.x, lo.y, hi.z),
            Point3::new(hi.x, hi.y, hi.z),
            Point3::new(lo.x, hi.y, hi.z),
        ]
    }

    /// Triangulate the AABB into an 8-vertex, 12-triangle box mesh.
    ///
    /// Normals point outward; winding follows `cs`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Aabb, CoordSystem, Point3};
    ///
    /// let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let mesh = aabb.to_mesh(CoordSystem::RightHanded);
    /// assert_eq!(mesh.vertex_count(), 8);
    /// assert_eq!(mesh.face_count(), 12);
    /// assert!(mesh.is_closed());
    /// ```
    #[must_use]
    pub fn to_mesh(&self, cs: CoordSystem) -> TriMesh {
        // Two triangles per face, CCW viewed from outside (right-handed).
        const FACES: [[u32; 3]; 12] = [
            [0, 2, 1], // bottom (z = min)
            [0, 3, 2],
            [4, 5, 6], // top (z = max)
            [4, 6, 7],
            [0, 1, 5], // front (y = min)
            [0, 5, 4],
            [3, 7, 6], // back (y = max)
            [3, 6, 2],
            [0, 4, 7], // left (x = min)
            [0, 7, 3],
            [1, 2, 6], // right (x = max)
            [1, 6, 5],
        ];

        let vertices = self.corners().to_vec();
        let faces = FACES
            .iter()
            .map(|&[a, b, c]| {
                let (a, b, c) = cs.wind(a, b, c);
                Tri::new(a, b, c)
            })
            .collect();

        TriMesh::from_validated_parts(vertices, faces, true)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_orders_corners() {
        let aabb = Aabb::new(Point3::new(1.0, 0.0, 5.0), Point3::new(0.0, 2.0, 3.0));
        assert_eq!(aabb.min, Point3::new(0.0, 0.0, 3.0));
        assert_eq!(aabb.max, Point3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn test_empty_expand() {
        let mut aabb = Aabb::empty();
        assert!(aabb.is_empty());

        aabb.expand_to_include(&Point3::new(1.0, 2.0, 3.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb.min, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_from_points() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 5.0, 3.0),
            Point3::new(-2.0, 8.0, 1.0),
        ];
        let aabb = Aabb::from_points(points.iter());
        assert_eq!(aabb.min, Point3::new(-2.0, 0.0, 0.0));
        assert_eq!(aabb.max, Point3::new(10.0, 8.0, 3.0));
    }

    #[test]
    fn test_contains_inclusive() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert!(aabb.contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(aabb.contains(&Point3::new(1.0, 1.0, 1.0)));
        assert!(aabb.contains(&Point3::new(0.5, 0.5, 0.5)));
        assert!(!aabb.contains(&Point3::new(1.001, 0.5, 0.5)));
    }

    #[test]
    fn test_contains_aabb() {
        let outer = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 10.0, 10.0));
        let inner = Aabb::new(Point3::new(1.0, 1.0, 1.0), Point3::new(9.0, 9.0, 9.0));
        assert!(outer.contains_aabb(&inner));
        assert!(!inner.contains_aabb(&outer));
        assert!(outer.contains_aabb(&outer));
    }

    #[test]
    fn test_intersects_shared_face() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Point3::new(1.5, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_center_size() {
        let aabb = Aabb::new(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.center(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.size(), Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.half_extents(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_surface_area() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        // 2 * (1*2 + 2*3 + 3*1) = 22
        assert_relative_eq!(aabb.surface_area(), 22.0);
        assert_eq!(Aabb::empty().surface_area(), 0.0);
    }

    #[test]
    fn test_volume() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 3.0, 4.0));
        assert_relative_eq!(aabb.volume(), 24.0);
        assert_eq!(Aabb::empty().volume(), 0.0);
    }

    #[test]
    fn test_union() {
        let a = Aabb::from_point(Point3::new(0.0, 0.0, 0.0));
        let b = Aabb::from_point(Point3::new(1.0, -1.0, 2.0));
        let u = a.union(&b);
        assert_eq!(u.min, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(u.max, Point3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_corners() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let corners = aabb.corners();
        assert_eq!(corners[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(corners[6], Point3::new(1.0, 1.0, 1.0));
        // All corners are distinct
        for i in 0..8 {
            for j in (i + 1)..8 {
                assert_ne!(corners[i], corners[j]);
            }
        }
    }

    #[test]
    fn test_to_mesh_closed_both_windings() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));

        let rh = aabb.to_mesh(CoordSystem::RightHanded);
        assert_eq!(rh.vertex_count(), 8);
        assert_eq!(rh.face_count(), 12);
        assert!(rh.is_closed());

        let lh = aabb.to_mesh(CoordSystem::LeftHanded);
        assert!(lh.is_closed());
        // Left-handed swaps the last two indices of every face.
        let f0_rh = rh.faces()[0];
        let f0_lh = lh.faces()[0];
        assert_eq!(f0_rh.a, f0_lh.a);
        assert_eq!(f0_rh.b, f0_lh.c);
        assert_eq!(f0_rh.c, f0_lh.b);
    }

    #[test]
    fn test_diagonal_and_extents() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 4.0, 0.0));
        assert_relative_eq!(aabb.diagonal(), 5.0);
        assert_relative_eq!(aabb.max_extent(), 4.0);
        assert_relative_eq!(aabb.min_extent(), 0.0);
    }
}
