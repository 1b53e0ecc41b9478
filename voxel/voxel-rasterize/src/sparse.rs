//! Grid-free rasterization to deduplicated voxel origins.

use hashbrown::HashSet;
use mesh_types::{Point3, Polyline, TriMesh, Vector3};
use rayon::prelude::*;
use tracing::{debug, info};
use voxel_grid::{world_to_grid_max, world_to_grid_min};

use crate::overlap::{covered_by_triangle, tri_box_overlap};
use crate::traverse::segment_voxels;
use crate::DEFAULT_PARALLEL_THRESHOLD;

/// Rasterizes meshes and polylines to voxel origins on an unbounded
/// lattice anchored at the world origin.
///
/// Faces are rasterized independently and merged through a set keyed on
/// the **quantized** origin - the integer triple
/// `round(origin / voxel_size)` - so origins that differ only by
/// floating-point noise below half a voxel collapse to one entry. The
/// result is deterministic as a set; enumeration order is unspecified.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, Tri, TriMesh, Vector3};
/// use voxel_rasterize::SparseRasterizer;
///
/// let mesh = TriMesh::new(
///     vec![
///         Point3::new(2.0, 2.0, 0.0),
///         Point3::new(7.0, 2.0, 0.0),
///         Point3::new(4.0, 6.0, 0.0),
///     ],
///     vec![Tri::new(0, 1, 2)],
/// )
/// .unwrap();
///
/// let origins = SparseRasterizer::default()
///     .rasterize_mesh(&mesh, &Vector3::new(1.0, 0.5, 1.0));
/// assert!(!origins.is_empty());
/// assert!(origins.contains(&Point3::new(2.0, 2.0, 0.0)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SparseRasterizer {
    /// Face count at which mesh rasterization switches to rayon.
    parallel_threshold: usize,
}

impl Default for SparseRasterizer {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl SparseRasterizer {
    /// Creates a rasterizer that goes parallel at `parallel_threshold`
    /// faces.
    #[must_use]
    pub const fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }

    /// Voxel origins (cell minimum corners) of every lattice cell
    /// overlapping a face of `mesh`.
    #[must_use]
    pub fn rasterize_mesh(&self, mesh: &TriMesh, voxel_size: &Vector3<f32>) -> Vec<Point3<f32>> {
        if mesh.is_empty() {
            return Vec::new();
        }

        let faces: Vec<[Point3<f32>; 3]> = mesh.triangles().collect();
        info!(faces = faces.len(), "sparse-rasterizing mesh");

        let mut seen: HashSet<[i32; 3]> = HashSet::new();
        if faces.len() >= self.parallel_threshold {
            let per_face: Vec<Vec<[i32; 3]>> = faces
                .par_iter()
                .map(|tri| face_voxels(tri, voxel_size))
                .collect();
            for cell in per_face.into_iter().flatten() {
                seen.insert(cell);
            }
        } else {
            for tri in &faces {
                seen.extend(face_voxels(tri, voxel_size));
            }
        }
        debug!(voxels = seen.len(), "deduplicated sparse voxels");

        to_origins(&seen, voxel_size)
    }

    /// Voxel origins of every lattice cell traversed by the polyline.
    ///
    /// The closing segment of a closed polyline is included unless
    /// `include_closing` is `false`.
    #[must_use]
    pub fn rasterize_polyline(
        &self,
        polyline: &Polyline,
        voxel_size: &Vector3<f32>,
        include_closing: bool,
    ) -> Vec<Point3<f32>> {
        let mut seen: HashSet<[i32; 3]> = HashSet::new();
        if polyline.len() == 1 {
            // A single point still occupies its voxel.
            seen.insert(world_to_grid_min(&polyline.points()[0], voxel_size));
        }
        for (start, end) in polyline.segments(include_closing) {
            seen.extend(segment_voxels(&start, &end, voxel_size));
        }
        to_origins(&seen, voxel_size)
    }
}

/// Lattice cells overlapping one triangle.
fn face_voxels(tri: &[Point3<f32>; 3], voxel_size: &Vector3<f32>) -> Vec<[i32; 3]> {
    let half = voxel_size * 0.5;

    let tri_min = Point3::new(
        tri[0].x.min(tri[1].x).min(tri[2].x),
        tri[0].y.min(tri[1].y).min(tri[2].y),
        tri[0].z.min(tri[1].z).min(tri[2].z),
    );
    let tri_max = Point3::new(
        tri[0].x.max(tri[1].x).max(tri[2].x),
        tri[0].y.max(tri[1].y).max(tri[2].y),
        tri[0].z.max(tri[1].z).max(tri[2].z),
    );

    let lo = world_to_grid_min(&tri_min, voxel_size);
    let mut hi = world_to_grid_max(&tri_max, voxel_size);
    for axis in 0..3 {
        hi[axis] = hi[axis].max(lo[axis]);
    }

    let mut out = Vec::new();
    #[allow(clippy::cast_precision_loss)]
    for z in lo[2]..=hi[2] {
        for y in lo[1]..=hi[1] {
            for x in lo[0]..=hi[0] {
                let center = Point3::new(
                    (x as f32 + 0.5) * voxel_size.x,
                    (y as f32 + 0.5) * voxel_size.y,
                    (z as f32 + 0.5) * voxel_size.z,
                );
                let hit = tri_box_overlap(&center, &half, &tri[0], &tri[1], &tri[2])
                    || covered_by_triangle(&center, &half, &tri[0], &tri[1], &tri[2]);
                if hit {
                    out.push([x, y, z]);
                }
            }
        }
    }
    out
}

/// Converts lattice cells back to world-space origins.
#[allow(clippy::cast_precision_loss)]
fn to_origins(cells: &HashSet<[i32; 3]>, voxel_size: &Vector3<f32>) -> Vec<Point3<f32>> {
    cells
        .iter()
        .map(|&[x, y, z]| {
            Point3::new(
                x as f32 * voxel_size.x,
                y as f32 * voxel_size.y,
                z as f32 * voxel_size.z,
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mesh_types::{Aabb, CoordSystem, Tri};

    fn wide_triangle() -> TriMesh {
        TriMesh::new(
            vec![
                Point3::new(2.0, 2.0, 0.0),
                Point3::new(7.0, 2.0, 0.0),
                Point3::new(4.0, 6.0, 0.0),
            ],
            vec![Tri::new(0, 1, 2)],
        )
        .unwrap()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn quantize(origins: &[Point3<f32>], size: &Vector3<f32>) -> Vec<[i32; 3]> {
        origins
            .iter()
            .map(|o| {
                [
                    (o.x / size.x).round() as i32,
                    (o.y / size.y).round() as i32,
                    (o.z / size.z).round() as i32,
                ]
            })
            .collect()
    }

    #[test]
    fn test_wide_triangle_contains_corner_voxel() {
        let size = Vector3::new(1.0, 0.5, 1.0);
        let origins = SparseRasterizer::default().rasterize_mesh(&wide_triangle(), &size);

        assert!(!origins.is_empty());
        assert!(origins.contains(&Point3::new(2.0, 2.0, 0.0)));
    }

    #[test]
    fn test_no_duplicate_quantized_origins() {
        let size = Vector3::new(1.0, 0.5, 1.0);
        let origins = SparseRasterizer::default().rasterize_mesh(&wide_triangle(), &size);

        let mut keys = quantize(&origins, &size);
        let before = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), before);
    }

    #[test]
    fn test_parallel_matches_sequential_as_set() {
        let cube = Aabb::new(Point3::new(0.2, 0.2, 0.2), Point3::new(2.8, 2.8, 2.8))
            .to_mesh(CoordSystem::RightHanded);
        let size = Vector3::new(0.5, 0.5, 0.5);

        let mut sequential =
            quantize(&SparseRasterizer::new(usize::MAX).rasterize_mesh(&cube, &size), &size);
        let mut parallel =
            quantize(&SparseRasterizer::new(1).rasterize_mesh(&cube, &size), &size);
        sequential.sort_unstable();
        parallel.sort_unstable();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_shared_edge_voxels_deduplicated() {
        // Two faces sharing an edge; the shared edge's voxels must appear
        // once.
        let mesh = TriMesh::new(
            vec![
                Point3::new(0.2, 0.2, 0.5),
                Point3::new(2.8, 0.2, 0.5),
                Point3::new(2.8, 2.8, 0.5),
                Point3::new(0.2, 2.8, 0.5),
            ],
            vec![Tri::new(0, 1, 2), Tri::new(0, 2, 3)],
        )
        .unwrap();
        let size = Vector3::new(1.0, 1.0, 1.0);

        let origins = SparseRasterizer::default().rasterize_mesh(&mesh, &size);
        let mut keys = quantize(&origins, &size);
        let before = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), before);
        // The quad spans a 3x3 cell footprint in one z-slab.
        assert_eq!(before, 9);
    }

    #[test]
    fn test_polyline_dda_origins() {
        let mut line = Polyline::new();
        line.push(Point3::new(0.0, 0.0, 0.0));
        line.push(Point3::new(3.0, 0.0, 0.0));

        let origins = SparseRasterizer::default().rasterize_polyline(
            &line,
            &Vector3::new(1.0, 1.0, 1.0),
            true,
        );

        let mut keys = quantize(&origins, &Vector3::new(1.0, 1.0, 1.0));
        keys.sort_unstable();
        assert_eq!(keys, vec![[0, 0, 0], [1, 0, 0], [2, 0, 0]]);
    }

    #[test]
    fn test_closed_polyline_closing_toggle() {
        // A closed triangle loop around three corners.
        let line = Polyline::from_points(vec![
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(2.5, 0.5, 0.5),
            Point3::new(2.5, 2.5, 0.5),
            Point3::new(0.5, 0.5, 0.5),
        ]);
        assert!(line.is_closed());
        let size = Vector3::new(1.0, 1.0, 1.0);

        let with_closing = SparseRasterizer::default().rasterize_polyline(&line, &size, true);
        let without = SparseRasterizer::default().rasterize_polyline(&line, &size, false);
        // The explicit final point coincides with the start, so both
        // cover the same cells; the toggle only controls the extra
        // segment.
        assert_eq!(with_closing.len(), without.len());
    }

    #[test]
    fn test_empty_inputs() {
        let size = Vector3::new(1.0, 1.0, 1.0);
        let mesh = TriMesh::new(Vec::new(), Vec::new()).unwrap();
        assert!(SparseRasterizer::default()
            .rasterize_mesh(&mesh, &size)
            .is_empty());

        let line = Polyline::new();
        assert!(SparseRasterizer::default()
            .rasterize_polyline(&line, &size, true)
            .is_empty());
    }
}
