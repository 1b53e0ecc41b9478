//! Dense occupancy volume.

use mesh_types::{Aabb, Point3, Vector3};
use rayon::prelude::*;
use tracing::debug;

use crate::error::{GridError, GridResult};
use crate::flood::{self, FloodFillStats};
use crate::meta::GridMeta;

/// Classification of a single voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Occupancy {
    /// The cell is outside the surface (or unclassified).
    #[default]
    Outside = 0,
    /// The cell is enclosed by the surface.
    Inside = 1,
    /// The cell overlaps the surface.
    Boundary = 2,
}

impl Occupancy {
    /// The state as its stored byte value.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a stored byte value.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Outside),
            1 => Some(Self::Inside),
            2 => Some(Self::Boundary),
            _ => None,
        }
    }
}

/// A dense 3D grid of [`Occupancy`] states.
///
/// Storage is row-major with x fastest (see [`GridMeta::linear_index`]).
/// Grids are created with every cell [`Occupancy::Outside`] and are never
/// resized; rasterization marks boundary cells and
/// [`classify_interior`](crate::classify_interior) labels the rest.
///
/// # Example
///
/// ```
/// use mesh_types::Vector3;
/// use voxel_grid::{GridMeta, Occupancy, OccupancyGrid};
///
/// let meta = GridMeta::new([0, 0, 0], [8, 8, 8], Vector3::new(0.5, 0.5, 0.5)).unwrap();
/// let mut grid = OccupancyGrid::new(meta);
///
/// grid.set(3, 3, 3, Occupancy::Boundary).unwrap();
/// assert_eq!(grid.get(3, 3, 3).unwrap(), Occupancy::Boundary);
/// assert!(grid.get(8, 0, 0).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    meta: GridMeta,
    cells: Vec<Occupancy>,
}

impl OccupancyGrid {
    /// Creates a grid with every cell [`Occupancy::Outside`].
    #[must_use]
    pub fn new(meta: GridMeta) -> Self {
        let cells = vec![Occupancy::Outside; meta.cell_count()];
        Self { meta, cells }
    }

    /// Creates a grid covering a world-space box.
    ///
    /// # Errors
    ///
    /// Returns an error for empty bounds or invalid voxel sizes.
    pub fn from_bounds(bounds: &Aabb, voxel_size: &Vector3<f32>) -> GridResult<Self> {
        Ok(Self::new(GridMeta::from_bounds(bounds, voxel_size)?))
    }

    /// Creates a grid from existing cell data.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::BufferLength`] if `cells` does not match the
    /// metadata's cell count.
    pub fn from_cells(meta: GridMeta, cells: Vec<Occupancy>) -> GridResult<Self> {
        if cells.len() != meta.cell_count() {
            return Err(GridError::BufferLength {
                expected: meta.cell_count(),
                got: cells.len(),
            });
        }
        Ok(Self { meta, cells })
    }

    /// The grid's lattice metadata.
    #[inline]
    #[must_use]
    pub const fn meta(&self) -> &GridMeta {
        &self.meta
    }

    /// Read-only view of the cell buffer.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Occupancy] {
        &self.cells
    }

    /// Mutable view of the cell buffer.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Occupancy] {
        &mut self.cells
    }

    /// The state of the cell at a lattice index.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] outside the grid window.
    pub fn get(&self, x: i32, y: i32, z: i32) -> GridResult<Occupancy> {
        self.meta
            .linear_index(x, y, z)
            .map(|i| self.cells[i])
            .ok_or(GridError::OutOfBounds { x, y, z })
    }

    /// Sets the state of the cell at a lattice index.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] outside the grid window.
    pub fn set(&mut self, x: i32, y: i32, z: i32, value: Occupancy) -> GridResult<()> {
        let i = self
            .meta
            .linear_index(x, y, z)
            .ok_or(GridError::OutOfBounds { x, y, z })?;
        self.cells[i] = value;
        Ok(())
    }

    /// The state at a linear storage index.
    #[inline]
    #[must_use]
    pub fn get_linear(&self, linear: usize) -> Option<Occupancy> {
        self.cells.get(linear).copied()
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: Occupancy) {
        self.cells.fill(value);
    }

    /// Number of cells in a given state.
    #[must_use]
    pub fn count_state(&self, state: Occupancy) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Shifts grid contents by the nearest whole-voxel offset for a world
    /// translation.
    ///
    /// The lattice window itself stays put; the *contents* move within it.
    /// Cells shifted out of the window are dropped, and cells exposed by
    /// the shift become [`Occupancy::Outside`]. This data loss is
    /// intentional: the grid models a fixed region of space.
    #[allow(clippy::cast_possible_truncation)] // rounded voxel offsets are small
    pub fn translate_world(&mut self, offset: &Vector3<f32>) {
        let size = self.meta.voxel_size();
        let shift = [
            (offset.x / size.x).round() as i32,
            (offset.y / size.y).round() as i32,
            (offset.z / size.z).round() as i32,
        ];
        if shift == [0, 0, 0] {
            return;
        }

        debug!(dx = shift[0], dy = shift[1], dz = shift[2], "shifting grid contents");

        let [min_x, min_y, min_z] = self.meta.min_index();
        let [nx, ny, nz] = self.meta.dims();
        let mut shifted = vec![Occupancy::Outside; self.cells.len()];
        for z in min_z..min_z + nz {
            for y in min_y..min_y + ny {
                for x in min_x..min_x + nx {
                    let Some(src) = self
                        .meta
                        .linear_index(x - shift[0], y - shift[1], z - shift[2])
                    else {
                        continue;
                    };
                    if let Some(dst) = self.meta.linear_index(x, y, z) {
                        shifted[dst] = self.cells[src];
                    }
                }
            }
        }
        self.cells = shifted;
    }

    /// Shifts grid contents by the world translation `to - from`.
    pub fn translate_between(&mut self, from: &Point3<f32>, to: &Point3<f32>) {
        self.translate_world(&(to - from));
    }

    /// Builds a 0/1 mask with 1 for every cell whose state is in `states`.
    #[must_use]
    pub fn binary_mask(&self, states: &[Occupancy]) -> Vec<u8> {
        self.cells
            .iter()
            .map(|c| u8::from(states.contains(c)))
            .collect()
    }

    /// Builds a mask of raw states: 0 outside, 1 inside, 2 boundary.
    #[must_use]
    pub fn ternary_mask(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.as_u8()).collect()
    }

    /// Visits every cell in storage order with its lattice index.
    pub fn for_each_voxel(&self, mut visit: impl FnMut(i32, i32, i32, Occupancy)) {
        let [min_x, min_y, min_z] = self.meta.min_index();
        let [nx, ny, _] = self.meta.dims();
        for (linear, &cell) in self.cells.iter().enumerate() {
            let rem = linear % (nx as usize * ny as usize);
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let (x, y, z) = (
                min_x + (rem % nx as usize) as i32,
                min_y + (rem / nx as usize) as i32,
                min_z + (linear / (nx as usize * ny as usize)) as i32,
            );
            visit(x, y, z, cell);
        }
    }

    /// Visits every cell in parallel.
    ///
    /// `max_threads` caps the worker count; `None` uses the global pool.
    /// The callback must be safe to run concurrently; visit order is
    /// unspecified.
    pub fn for_each_voxel_parallel(
        &self,
        visit: impl Fn(i32, i32, i32, Occupancy) + Sync,
        max_threads: Option<usize>,
    ) {
        let body = |(linear, &cell): (usize, &Occupancy)| {
            let [x, y, z] = self.meta.delinearize(linear);
            visit(x, y, z, cell);
        };

        match max_threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build();
                match pool {
                    Ok(pool) => {
                        pool.install(|| self.cells.par_iter().enumerate().for_each(body));
                    }
                    // Pool construction only fails on resource exhaustion;
                    // fall back to the global pool.
                    Err(_) => self.cells.par_iter().enumerate().for_each(body),
                }
            }
            None => self.cells.par_iter().enumerate().for_each(body),
        }
    }

    /// Labels non-boundary cells as inside or outside by flood fill from
    /// the grid faces. See [`classify_interior`](crate::classify_interior).
    ///
    /// # Errors
    ///
    /// Propagates [`GridError::QueueOverflow`] (traversal invariant
    /// violation).
    pub fn classify_interior(&mut self) -> GridResult<FloodFillStats> {
        flood::classify_interior(self)
    }
}
