//! Voxel traversal along line segments.
//!
//! Amanatides & Woo's fast voxel traversal, bounded to a segment: the
//! parametric position along `p0 -> p1` is tracked per axis, and at each
//! step the axis with the nearest cell boundary advances. Traversal ends
//! when the parameter passes the segment end or the index leaves the
//! segment's voxel AABB, so the voxel containing the endpoint is included.

use mesh_types::{Point3, Vector3};
use voxel_grid::{world_to_grid_max, world_to_grid_min};

/// Iterator over the lattice cells intersected by a segment.
///
/// Yields each cell once, in traversal order from `p0` to `p1`. A
/// zero-length segment yields the single cell containing it.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, Vector3};
/// use voxel_rasterize::segment_voxels;
///
/// let cells: Vec<_> = segment_voxels(
///     &Point3::new(0.0, 0.0, 0.0),
///     &Point3::new(3.0, 0.0, 0.0),
///     &Vector3::new(1.0, 1.0, 1.0),
/// )
/// .collect();
/// assert_eq!(cells, vec![[0, 0, 0], [1, 0, 0], [2, 0, 0]]);
/// ```
#[must_use]
pub fn segment_voxels(
    p0: &Point3<f32>,
    p1: &Point3<f32>,
    voxel_size: &Vector3<f32>,
) -> SegmentTraversal {
    SegmentTraversal::new(p0, p1, voxel_size)
}

/// See [`segment_voxels`].
#[derive(Debug, Clone)]
pub struct SegmentTraversal {
    current: [i32; 3],
    lo: [i32; 3],
    hi: [i32; 3],
    step: [i32; 3],
    t_max: [f32; 3],
    t_delta: [f32; 3],
    done: bool,
}

impl SegmentTraversal {
    fn new(p0: &Point3<f32>, p1: &Point3<f32>, voxel_size: &Vector3<f32>) -> Self {
        let seg_min = Point3::new(p0.x.min(p1.x), p0.y.min(p1.y), p0.z.min(p1.z));
        let seg_max = Point3::new(p0.x.max(p1.x), p0.y.max(p1.y), p0.z.max(p1.z));

        let lo = world_to_grid_min(&seg_min, voxel_size);
        let mut hi = world_to_grid_max(&seg_max, voxel_size);
        // A segment flat on a lattice plane can quantize to an inverted
        // range on that axis; keep at least one cell.
        for axis in 0..3 {
            hi[axis] = hi[axis].max(lo[axis]);
        }

        let start = world_to_grid_min(p0, voxel_size);
        let current = [
            start[0].clamp(lo[0], hi[0]),
            start[1].clamp(lo[1], hi[1]),
            start[2].clamp(lo[2], hi[2]),
        ];

        let dir = p1 - p0;
        let mut step = [0_i32; 3];
        let mut t_max = [f32::INFINITY; 3];
        let mut t_delta = [f32::INFINITY; 3];

        for axis in 0..3 {
            if dir[axis].abs() <= f32::EPSILON {
                continue;
            }
            step[axis] = if dir[axis] > 0.0 { 1 } else { -1 };
            t_delta[axis] = (voxel_size[axis] / dir[axis]).abs();

            #[allow(clippy::cast_precision_loss)]
            let boundary = if dir[axis] > 0.0 {
                (current[axis] + 1) as f32 * voxel_size[axis]
            } else {
                current[axis] as f32 * voxel_size[axis]
            };
            t_max[axis] = (boundary - p0[axis]) / dir[axis];
        }

        Self {
            current,
            lo,
            hi,
            step,
            t_max,
            t_delta,
            done: false,
        }
    }
}

impl Iterator for SegmentTraversal {
    type Item = [i32; 3];

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.current;

        // Advance along the axis with the nearest boundary.
        let mut axis = 0;
        for candidate in 1..3 {
            if self.t_max[candidate] < self.t_max[axis] {
                axis = candidate;
            }
        }

        if self.t_max[axis] > 1.0 {
            self.done = true;
        } else {
            self.current[axis] += self.step[axis];
            if self.current[axis] < self.lo[axis] || self.current[axis] > self.hi[axis] {
                self.done = true;
            } else {
                self.t_max[axis] += self.t_delta[axis];
            }
        }

        Some(result)
    }
}
