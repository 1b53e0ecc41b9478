//! Separating-axis and slab overlap tests.

use mesh_types::{Point3, Vector3};

/// Slack added to every separating-axis comparison.
///
/// Keeps triangles that touch a voxel exactly on a face or edge from
/// dropping out of the rasterization due to floating-point error.
pub const SAT_EPS: f32 = 1e-5;

/// Padding of the triangle-plane slab in [`covered_by_triangle`].
const PLANE_PAD: f32 = 1e-4;

/// Barycentric tolerance in [`covered_by_triangle`]; slightly negative to
/// close the gap between adjacent cells.
const BARY_EPS: f32 = -1e-5;

/// Squared-normal threshold below which a triangle counts as degenerate.
const DEGENERATE_NORMAL_EPS: f32 = 1e-12;

/// Parallel-direction threshold for the segment slab clip.
const SLAB_EPS: f32 = 1e-12;

/// Triangle-box overlap test (Akenine-Moller separating axis theorem).
///
/// The box is given by its `center` and `half` extents. Thirteen axes are
/// tested: the three box axes (as an AABB pre-reject), the triangle's
/// plane normal, and the nine edge-cross-axis directions.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, Vector3};
/// use voxel_rasterize::tri_box_overlap;
///
/// let center = Point3::new(0.5, 0.5, 0.5);
/// let half = Vector3::new(0.5, 0.5, 0.5);
///
/// let inside = tri_box_overlap(
///     &center,
///     &half,
///     &Point3::new(0.2, 0.2, 0.5),
///     &Point3::new(0.8, 0.2, 0.5),
///     &Point3::new(0.5, 0.8, 0.5),
/// );
/// assert!(inside);
///
/// let far = tri_box_overlap(
///     &center,
///     &half,
///     &Point3::new(5.0, 5.0, 5.0),
///     &Point3::new(6.0, 5.0, 5.0),
///     &Point3::new(5.0, 6.0, 5.0),
/// );
/// assert!(!far);
/// ```
#[must_use]
pub fn tri_box_overlap(
    center: &Point3<f32>,
    half: &Vector3<f32>,
    v0: &Point3<f32>,
    v1: &Point3<f32>,
    v2: &Point3<f32>,
) -> bool {
    // Triangle in the box's local frame.
    let a = v0 - center;
    let b = v1 - center;
    let c = v2 - center;

    // 1. The triangle's AABB against the box.
    for axis in 0..3 {
        let lo = a[axis].min(b[axis]).min(c[axis]);
        let hi = a[axis].max(b[axis]).max(c[axis]);
        if lo > half[axis] + SAT_EPS || hi < -half[axis] - SAT_EPS {
            return false;
        }
    }

    let edges = [b - a, c - b, a - c];

    // 2. The triangle's supporting plane.
    let normal = edges[0].cross(&edges[1]);
    let radius = half.x * normal.x.abs() + half.y * normal.y.abs() + half.z * normal.z.abs();
    let dist = normal.dot(&a);
    if dist > radius + SAT_EPS || dist < -radius - SAT_EPS {
        return false;
    }

    // 3. The nine edge-cross-axis directions.
    for edge in &edges {
        for axis in 0..3 {
            let mut unit = Vector3::zeros();
            unit[axis] = 1.0;
            let l = unit.cross(edge);

            let p0 = l.dot(&a);
            let p1 = l.dot(&b);
            let p2 = l.dot(&c);
            let lo = p0.min(p1).min(p2);
            let hi = p0.max(p1).max(p2);

            let radius = half.x * l.x.abs() + half.y * l.y.abs() + half.z * l.z.abs();
            if lo > radius + SAT_EPS || hi < -radius - SAT_EPS {
                return false;
            }
        }
    }

    true
}

/// Companion test for voxels deep inside a large triangle's footprint.
///
/// A voxel well inside a triangle many times its size touches no triangle
/// edge, but its center lies in a thin slab around the triangle's plane
/// and projects into the triangle. This test checks exactly that: plane
/// slab membership (padded by the box's projection radius), then a
/// barycentric containment test of the projected center with a slightly
/// negative tolerance.
///
/// Returns `false` for near-degenerate triangles (`|n|^2 < 1e-12`); the
/// caller still sees the edge-touch result from [`tri_box_overlap`].
#[must_use]
pub fn covered_by_triangle(
    center: &Point3<f32>,
    half: &Vector3<f32>,
    v0: &Point3<f32>,
    v1: &Point3<f32>,
    v2: &Point3<f32>,
) -> bool {
    let e0 = v1 - v0;
    let e1 = v2 - v0;
    let normal = e0.cross(&e1);
    let n2 = normal.norm_squared();
    if n2 < DEGENERATE_NORMAL_EPS {
        return false;
    }

    let to_center = center - v0;
    let dist = normal.dot(&to_center);
    let radius = half.x * normal.x.abs() + half.y * normal.y.abs() + half.z * normal.z.abs();
    if dist.abs() > radius + PLANE_PAD {
        return false;
    }

    // Project the center onto the plane (no normalization needed).
    let projected = to_center - normal * (dist / n2);

    // Barycentric containment of the projected point.
    let d00 = e0.dot(&e0);
    let d01 = e0.dot(&e1);
    let d11 = e1.dot(&e1);
    let d20 = projected.dot(&e0);
    let d21 = projected.dot(&e1);
    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < DEGENERATE_NORMAL_EPS {
        return false;
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    let u = 1.0 - v - w;

    u >= BARY_EPS && v >= BARY_EPS && w >= BARY_EPS
}

/// Segment-box overlap by Liang-Barsky slab clipping.
///
/// Directions within `1e-12` of parallel to a slab are handled by a
/// point-in-slab check on that axis.
#[must_use]
pub fn segment_box_overlap(
    p0: &Point3<f32>,
    p1: &Point3<f32>,
    box_min: &Point3<f32>,
    box_max: &Point3<f32>,
) -> bool {
    let dir = p1 - p0;
    let mut t_enter = 0.0_f32;
    let mut t_exit = 1.0_f32;

    for axis in 0..3 {
        if dir[axis].abs() < SLAB_EPS {
            if p0[axis] < box_min[axis] || p0[axis] > box_max[axis] {
                return false;
            }
        } else {
            let inv = 1.0 / dir[axis];
            let mut t_lo = (box_min[axis] - p0[axis]) * inv;
            let mut t_hi = (box_max[axis] - p0[axis]) * inv;
            if t_lo > t_hi {
                std::mem::swap(&mut t_lo, &mut t_hi);
            }
            t_enter = t_enter.max(t_lo);
            t_exit = t_exit.min(t_hi);
            if t_enter > t_exit {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> (Point3<f32>, Vector3<f32>) {
        (Point3::new(0.5, 0.5, 0.5), Vector3::new(0.5, 0.5, 0.5))
    }

    #[test]
    fn test_triangle_inside_box() {
        let (center, half) = unit_box();
        assert!(tri_box_overlap(
            &center,
            &half,
            &Point3::new(0.3, 0.3, 0.3),
            &Point3::new(0.7, 0.3, 0.3),
            &Point3::new(0.5, 0.7, 0.3),
        ));
    }

    #[test]
    fn test_triangle_far_away() {
        let (center, half) = unit_box();
        assert!(!tri_box_overlap(
            &center,
            &half,
            &Point3::new(3.0, 3.0, 3.0),
            &Point3::new(4.0, 3.0, 3.0),
            &Point3::new(3.0, 4.0, 3.0),
        ));
    }

    #[test]
    fn test_triangle_pierces_box() {
        let (center, half) = unit_box();
        // Large triangle cutting diagonally through the box.
        assert!(tri_box_overlap(
            &center,
            &half,
            &Point3::new(-5.0, -5.0, 0.5),
            &Point3::new(5.0, -5.0, 0.5),
            &Point3::new(0.0, 5.0, 0.5),
        ));
    }

    #[test]
    fn test_triangle_plane_misses_box() {
        let (center, half) = unit_box();
        // Plane z = 2 never enters the box.
        assert!(!tri_box_overlap(
            &center,
            &half,
            &Point3::new(-5.0, -5.0, 2.0),
            &Point3::new(5.0, -5.0, 2.0),
            &Point3::new(0.0, 5.0, 2.0),
        ));
    }

    #[test]
    fn test_triangle_touching_face_is_kept() {
        let (center, half) = unit_box();
        // Triangle in the z = 1 plane exactly on the box's top face.
        assert!(tri_box_overlap(
            &center,
            &half,
            &Point3::new(0.2, 0.2, 1.0),
            &Point3::new(0.8, 0.2, 1.0),
            &Point3::new(0.5, 0.8, 1.0),
        ));
    }

    #[test]
    fn test_edge_axis_separation() {
        let (center, half) = unit_box();
        // Triangle whose AABB overlaps the box but which is separated by
        // an edge-cross axis (the diagonal edge passes the box corner).
        assert!(!tri_box_overlap(
            &center,
            &half,
            &Point3::new(1.3, 0.9, 0.5),
            &Point3::new(0.9, 1.3, 0.5),
            &Point3::new(2.0, 2.0, 0.5),
        ));
    }

    #[test]
    fn test_covered_center_inside_large_triangle() {
        let (center, half) = unit_box();
        // Triangle much larger than the voxel, passing through its center
        // plane; no edge goes near the box.
        assert!(covered_by_triangle(
            &center,
            &half,
            &Point3::new(-100.0, -100.0, 0.5),
            &Point3::new(100.0, -100.0, 0.5),
            &Point3::new(0.0, 100.0, 0.5),
        ));
    }

    #[test]
    fn test_covered_center_outside_footprint() {
        let (center, half) = unit_box();
        assert!(!covered_by_triangle(
            &center,
            &half,
            &Point3::new(10.0, 10.0, 0.5),
            &Point3::new(20.0, 10.0, 0.5),
            &Point3::new(10.0, 20.0, 0.5),
        ));
    }

    #[test]
    fn test_covered_plane_too_far() {
        let (center, half) = unit_box();
        assert!(!covered_by_triangle(
            &center,
            &half,
            &Point3::new(-100.0, -100.0, 3.0),
            &Point3::new(100.0, -100.0, 3.0),
            &Point3::new(0.0, 100.0, 3.0),
        ));
    }

    #[test]
    fn test_covered_degenerate_triangle_is_false() {
        let (center, half) = unit_box();
        // Collinear vertices: zero normal.
        assert!(!covered_by_triangle(
            &center,
            &half,
            &Point3::new(0.0, 0.0, 0.5),
            &Point3::new(1.0, 0.0, 0.5),
            &Point3::new(2.0, 0.0, 0.5),
        ));
    }

    #[test]
    fn test_segment_through_box() {
        assert!(segment_box_overlap(
            &Point3::new(-1.0, 0.5, 0.5),
            &Point3::new(2.0, 0.5, 0.5),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 1.0),
        ));
    }

    #[test]
    fn test_segment_stops_short() {
        assert!(!segment_box_overlap(
            &Point3::new(-2.0, 0.5, 0.5),
            &Point3::new(-1.0, 0.5, 0.5),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 1.0),
        ));
    }

    #[test]
    fn test_segment_parallel_outside_slab() {
        assert!(!segment_box_overlap(
            &Point3::new(0.0, 2.0, 0.5),
            &Point3::new(1.0, 2.0, 0.5),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 1.0),
        ));
    }

    #[test]
    fn test_degenerate_segment_inside() {
        let p = Point3::new(0.5, 0.5, 0.5);
        assert!(segment_box_overlap(
            &p,
            &p,
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 1.0),
        ));
    }
}
