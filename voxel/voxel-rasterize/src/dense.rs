//! Rasterization into a dense occupancy grid.

use mesh_types::{Point3, Polyline, TriMesh};
use rayon::prelude::*;
use tracing::{debug, info};
use voxel_grid::{world_to_grid_max, world_to_grid_min, GridMeta, GridResult, Occupancy, OccupancyGrid};

use crate::overlap::{covered_by_triangle, tri_box_overlap};
use crate::traverse::segment_voxels;
use crate::DEFAULT_PARALLEL_THRESHOLD;

/// Marks boundary voxels of meshes and polylines in an
/// [`OccupancyGrid`].
///
/// Every face is rasterized independently: the face's voxel range is
/// clamped to the grid and each cell in it is tested with the SAT
/// predicate pair. Writes are idempotent (`Boundary` only), so face order
/// does not matter and faces can be processed in parallel.
///
/// # Example
///
/// ```
/// use mesh_types::{Aabb, CoordSystem, Point3, Vector3};
/// use voxel_grid::{Occupancy, OccupancyGrid};
/// use voxel_rasterize::DenseRasterizer;
///
/// let cube = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
///     .to_mesh(CoordSystem::RightHanded);
///
/// let bounds = Aabb::new(Point3::new(-2.0, -2.0, -2.0), Point3::new(2.0, 2.0, 2.0));
/// let mut grid = OccupancyGrid::from_bounds(&bounds, &Vector3::new(0.5, 0.5, 0.5)).unwrap();
///
/// DenseRasterizer::default()
///     .rasterize_mesh(&mut grid, &cube, true)
///     .unwrap();
///
/// assert!(grid.count_state(Occupancy::Boundary) > 0);
/// assert_eq!(grid.get(0, 0, 0).unwrap(), Occupancy::Inside);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DenseRasterizer {
    /// Face count at which mesh rasterization switches to rayon.
    parallel_threshold: usize,
}

impl Default for DenseRasterizer {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl DenseRasterizer {
    /// Creates a rasterizer that goes parallel at `parallel_threshold`
    /// faces.
    #[must_use]
    pub const fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }

    /// Marks every grid cell whose box overlaps a face of `mesh` as
    /// [`Occupancy::Boundary`], optionally classifying the interior
    /// afterwards.
    ///
    /// No-ops when the mesh is empty or its bounds miss the grid.
    /// Running the rasterization twice leaves the grid unchanged.
    ///
    /// # Errors
    ///
    /// Propagates flood-fill errors when `flood_fill` is set.
    pub fn rasterize_mesh(
        &self,
        grid: &mut OccupancyGrid,
        mesh: &TriMesh,
        flood_fill: bool,
    ) -> GridResult<()> {
        if mesh.is_empty() {
            return Ok(());
        }
        if !mesh.bounds().intersects(&grid.meta().world_bounds()) {
            debug!("mesh bounds miss the grid; nothing to rasterize");
            return Ok(());
        }

        let meta = *grid.meta();
        let faces: Vec<[Point3<f32>; 3]> = mesh.triangles().collect();

        info!(
            faces = faces.len(),
            cells = meta.cell_count(),
            "rasterizing mesh into grid"
        );

        // Cell indices are computed read-only (and in parallel for large
        // meshes); the idempotent writes happen afterwards.
        let mut marked = 0_usize;
        if faces.len() >= self.parallel_threshold {
            let per_face: Vec<Vec<usize>> = faces
                .par_iter()
                .map(|tri| face_cells(&meta, tri))
                .collect();
            let cells = grid.cells_mut();
            for linear in per_face.into_iter().flatten() {
                cells[linear] = Occupancy::Boundary;
                marked += 1;
            }
        } else {
            let cells = grid.cells_mut();
            for tri in &faces {
                for linear in face_cells(&meta, tri) {
                    cells[linear] = Occupancy::Boundary;
                    marked += 1;
                }
            }
        }
        debug!(writes = marked, "marked boundary cells");

        if flood_fill {
            grid.classify_interior()?;
        }
        Ok(())
    }

    /// Marks every grid cell traversed by the polyline as
    /// [`Occupancy::Boundary`].
    ///
    /// Closed polylines include their closing segment. Cells outside the
    /// grid window are skipped.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible for parity with mesh
    /// rasterization.
    pub fn rasterize_polyline(
        &self,
        grid: &mut OccupancyGrid,
        polyline: &Polyline,
    ) -> GridResult<()> {
        let meta = *grid.meta();
        let size = *meta.voxel_size();
        let cells = grid.cells_mut();

        let mut marked = 0_usize;
        for (start, end) in polyline.segments(true) {
            for [x, y, z] in segment_voxels(&start, &end, &size) {
                if let Some(linear) = meta.linear_index(x, y, z) {
                    cells[linear] = Occupancy::Boundary;
                    marked += 1;
                }
            }
        }
        debug!(writes = marked, "rasterized polyline into grid");
        Ok(())
    }
}

/// Linear indices of all grid cells overlapping one triangle.
fn face_cells(meta: &GridMeta, tri: &[Point3<f32>; 3]) -> Vec<usize> {
    let size = meta.voxel_size();
    let half = size * 0.5;

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

    let lo = world_to_grid_min(&tri_min, size);
    let mut hi = world_to_grid_max(&tri_max, size);
    for axis in 0..3 {
        hi[axis] = hi[axis].max(lo[axis]);
    }

    // Clamp the face's voxel range to the grid window; if it lies fully
    // outside, there is nothing to visit.
    let grid_lo = meta.min_index();
    let grid_hi = [
        grid_lo[0] + meta.dims()[0] - 1,
        grid_lo[1] + meta.dims()[1] - 1,
        grid_lo[2] + meta.dims()[2] - 1,
    ];
    if (0..3).any(|i| lo[i] > grid_hi[i] || hi[i] < grid_lo[i]) {
        return Vec::new();
    }
    let lo = meta.clamp_index(lo);
    let hi = meta.clamp_index(hi);

    let mut out = Vec::new();
    for z in lo[2]..=hi[2] {
        for y in lo[1]..=hi[1] {
            for x in lo[0]..=hi[0] {
                let center = meta.cell_center([x, y, z]);
                let hit = tri_box_overlap(&center, &half, &tri[0], &tri[1], &tri[2])
                    || covered_by_triangle(&center, &half, &tri[0], &tri[1], &tri[2]);
                if hit {
                    if let Some(linear) = meta.linear_index(x, y, z) {
                        out.push(linear);
                    }
                }
            }
        }
    }
    out
}
