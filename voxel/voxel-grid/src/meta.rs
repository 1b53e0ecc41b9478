//! Grid metadata and lattice quantization.

use mesh_types::{Aabb, Point3, Vector3};

use crate::error::{GridError, GridResult};

/// Quantization tolerance for world ↔ grid conversion, in world units.
///
/// Biases positions that sit exactly on a lattice plane into the lower
/// cell for "min" queries and into the upper cell for "max inclusive"
/// queries, so geometry on cell boundaries is never double-counted. This
/// is the single tolerance knob for the whole stack; the sparse
/// rasterizer's origin hashing relies on the same constant.
pub const QUANT_EPS: f32 = 1e-6;

/// Lattice cell containing a world position, biased down on cell planes.
///
/// Computes `floor((p + eps) / size)` componentwise; the lattice is
/// anchored at the world origin.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, Vector3};
/// use voxel_grid::world_to_grid_min;
///
/// let size = Vector3::new(1.0, 0.5, 1.0);
/// assert_eq!(world_to_grid_min(&Point3::new(2.0, 2.0, 0.0), &size), [2, 4, 0]);
/// // Exactly on a plane: goes to the cell whose min corner this is.
/// assert_eq!(world_to_grid_min(&Point3::new(1.0, 0.0, 0.0), &size), [1, 0, 0]);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)] // floor of in-range lattice coordinates
pub fn world_to_grid_min(p: &Point3<f32>, size: &Vector3<f32>) -> [i32; 3] {
    [
        ((p.x + QUANT_EPS) / size.x).floor() as i32,
        ((p.y + QUANT_EPS) / size.y).floor() as i32,
        ((p.z + QUANT_EPS) / size.z).floor() as i32,
    ]
}

/// Lattice cell containing a world position, biased up on cell planes.
///
/// Computes `floor((p - eps) / size)` componentwise. Used for the upper
/// (inclusive) end of voxel ranges, so a box ending exactly on a lattice
/// plane does not claim the next cell.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn world_to_grid_max(p: &Point3<f32>, size: &Vector3<f32>) -> [i32; 3] {
    [
        ((p.x - QUANT_EPS) / size.x).floor() as i32,
        ((p.y - QUANT_EPS) / size.y).floor() as i32,
        ((p.z - QUANT_EPS) / size.z).floor() as i32,
    ]
}

/// Immutable description of a rectilinear voxel lattice window.
///
/// A `GridMeta` pins down a dense grid: the lattice index of its minimum
/// cell, the cell counts per axis, and the (possibly anisotropic) voxel
/// size. The lattice itself is anchored at the world origin: cell
/// `(i, j, k)` spans `[i*sx, (i+1)*sx) x [j*sy, ...) x [k*sz, ...)`.
///
/// # Example
///
/// ```
/// use mesh_types::{Aabb, Point3, Vector3};
/// use voxel_grid::GridMeta;
///
/// let bounds = Aabb::new(Point3::new(-2.0, -2.0, -2.0), Point3::new(2.0, 2.0, 2.0));
/// let meta = GridMeta::from_bounds(&bounds, &Vector3::new(1.0, 1.0, 1.0)).unwrap();
///
/// assert_eq!(meta.min_index(), [-2, -2, -2]);
/// assert_eq!(meta.dims(), [4, 4, 4]);
/// assert_eq!(meta.cell_count(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridMeta {
    min: [i32; 3],
    dims: [i32; 3],
    voxel_size: Vector3<f32>,
}

impl GridMeta {
    /// Creates grid metadata from a minimum lattice index, per-axis cell
    /// counts, and voxel size.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] for non-positive extents
    /// and [`GridError::InvalidVoxelSize`] for non-positive or non-finite
    /// spacings.
    pub fn new(min: [i32; 3], dims: [i32; 3], voxel_size: Vector3<f32>) -> GridResult<Self> {
        if dims.iter().any(|&n| n <= 0) {
            return Err(GridError::InvalidDimensions {
                nx: dims[0],
                ny: dims[1],
                nz: dims[2],
            });
        }
        if voxel_size.iter().any(|&s| s <= 0.0 || !s.is_finite()) {
            return Err(GridError::InvalidVoxelSize {
                x: voxel_size.x,
                y: voxel_size.y,
                z: voxel_size.z,
            });
        }
        Ok(Self {
            min,
            dims,
            voxel_size,
        })
    }

    /// Derives the lattice window covering a world-space box.
    ///
    /// The minimum index comes from [`world_to_grid_min`] of the box
    /// minimum and the (inclusive) maximum index from
    /// [`world_to_grid_max`] of the box maximum.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if the box is empty and
    /// [`GridError::InvalidVoxelSize`] for bad spacings.
    pub fn from_bounds(bounds: &Aabb, voxel_size: &Vector3<f32>) -> GridResult<Self> {
        if voxel_size.iter().any(|&s| s <= 0.0 || !s.is_finite()) {
            return Err(GridError::InvalidVoxelSize {
                x: voxel_size.x,
                y: voxel_size.y,
                z: voxel_size.z,
            });
        }
        if bounds.is_empty() {
            return Err(GridError::InvalidDimensions {
                nx: 0,
                ny: 0,
                nz: 0,
            });
        }

        let lo = world_to_grid_min(&bounds.min, voxel_size);
        let hi = world_to_grid_max(&bounds.max, voxel_size);
        let dims = [
            (hi[0] - lo[0] + 1).max(1),
            (hi[1] - lo[1] + 1).max(1),
            (hi[2] - lo[2] + 1).max(1),
        ];
        Self::new(lo, dims, *voxel_size)
    }

    /// Lattice index of the minimum cell.
    #[inline]
    #[must_use]
    pub const fn min_index(&self) -> [i32; 3] {
        self.min
    }

    /// Cell counts per axis.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> [i32; 3] {
        self.dims
    }

    /// Voxel size per axis, in world units.
    #[inline]
    #[must_use]
    pub const fn voxel_size(&self) -> &Vector3<f32> {
        &self.voxel_size
    }

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.dims.iter().map(|&n| n as usize).product()
    }

    /// World-space extent of the grid.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_world(&self) -> Vector3<f32> {
        Vector3::new(
            self.dims[0] as f32 * self.voxel_size.x,
            self.dims[1] as f32 * self.voxel_size.y,
            self.dims[2] as f32 * self.voxel_size.z,
        )
    }

    /// World-space box covered by the grid.
    #[must_use]
    pub fn world_bounds(&self) -> Aabb {
        let min = self.index_min_corner(self.min);
        Aabb::new(min, min + self.size_world())
    }

    /// Whether a lattice index lies inside the grid window.
    #[inline]
    #[must_use]
    pub const fn contains_index(&self, x: i32, y: i32, z: i32) -> bool {
        x >= self.min[0]
            && x < self.min[0] + self.dims[0]
            && y >= self.min[1]
            && y < self.min[1] + self.dims[1]
            && z >= self.min[2]
            && z < self.min[2] + self.dims[2]
    }

    /// Linear storage index for a lattice index (x fastest), or `None`
    /// outside the grid.
    #[inline]
    #[must_use]
    pub fn linear_index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !self.contains_index(x, y, z) {
            return None;
        }
        let lx = (x - self.min[0]) as usize;
        let ly = (y - self.min[1]) as usize;
        let lz = (z - self.min[2]) as usize;
        let nx = self.dims[0] as usize;
        let ny = self.dims[1] as usize;
        Some(lz * nx * ny + ly * nx + lx)
    }

    /// Lattice index for a linear storage index.
    ///
    /// The inverse of [`GridMeta::linear_index`]; the caller must pass a
    /// value below [`GridMeta::cell_count`].
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn delinearize(&self, linear: usize) -> [i32; 3] {
        let nx = self.dims[0] as usize;
        let ny = self.dims[1] as usize;
        let lz = linear / (nx * ny);
        let rem = linear % (nx * ny);
        [
            self.min[0] + (rem % nx) as i32,
            self.min[1] + (rem / nx) as i32,
            self.min[2] + lz as i32,
        ]
    }

    /// World-space minimum corner of a cell.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn index_min_corner(&self, index: [i32; 3]) -> Point3<f32> {
        Point3::new(
            index[0] as f32 * self.voxel_size.x,
            index[1] as f32 * self.voxel_size.y,
            index[2] as f32 * self.voxel_size.z,
        )
    }

    /// World-space maximum corner of a cell.
    #[inline]
    #[must_use]
    pub fn index_max_corner(&self, index: [i32; 3]) -> Point3<f32> {
        self.index_min_corner([index[0] + 1, index[1] + 1, index[2] + 1])
    }

    /// World-space center of a cell.
    #[inline]
    #[must_use]
    pub fn cell_center(&self, index: [i32; 3]) -> Point3<f32> {
        self.index_min_corner(index) + self.voxel_size * 0.5
    }

    /// Clamps a lattice index into the grid window.
    #[inline]
    #[must_use]
    pub fn clamp_index(&self, index: [i32; 3]) -> [i32; 3] {
        [
            index[0].clamp(self.min[0], self.min[0] + self.dims[0] - 1),
            index[1].clamp(self.min[1], self.min[1] + self.dims[1] - 1),
            index[2].clamp(self.min[2], self.min[2] + self.dims[2] - 1),
        ]
    }
}
