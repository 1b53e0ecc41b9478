//! Dense signed distance field.

use mesh_types::Point3;
use tracing::info;
use voxel_grid::{world_to_grid_min, GridMeta, OccupancyGrid};

use crate::edt::{edt_3d_isotropic, edt_3d_weighted, FLOAT_SENTINEL, INT_SENTINEL};
use crate::error::{SdfError, SdfResult};
use crate::pool;

/// Per-axis cell count above which the integer transform's `1 << 28`
/// sentinel could be dominated; larger grids use the weighted form.
const ISOTROPIC_DIM_LIMIT: i32 = 32768;

/// A dense 3D field of signed distances in world units.
///
/// Sign convention: **positive outside** the surface, **negative
/// inside**, zero on the boundary. Storage is row-major with x fastest,
/// sharing [`GridMeta`] with [`OccupancyGrid`].
///
/// The field is built in place from a binary or ternary mask with two
/// exact Euclidean distance transforms (one toward the foreground, one
/// toward the background); see [`DistanceGrid::build_from_binary_mask`].
///
/// # Example
///
/// ```
/// use mesh_types::Vector3;
/// use voxel_grid::GridMeta;
/// use voxel_sdf::DistanceGrid;
///
/// let meta = GridMeta::new([0, 0, 0], [3, 1, 1], Vector3::new(1.0, 1.0, 1.0)).unwrap();
/// let mut sdf = DistanceGrid::new(meta);
/// sdf.build_from_binary_mask(&[1, 0, 0], false).unwrap();
///
/// assert_eq!(sdf.get(0, 0, 0).unwrap(), -1.0); // inside
/// assert_eq!(sdf.get(1, 0, 0).unwrap(), 1.0); // one cell out
/// assert_eq!(sdf.get(2, 0, 0).unwrap(), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceGrid {
    meta: GridMeta,
    values: Vec<f32>,
}

impl DistanceGrid {
    /// Creates a zero-filled field.
    #[must_use]
    pub fn new(meta: GridMeta) -> Self {
        let values = vec![0.0; meta.cell_count()];
        Self { meta, values }
    }

    /// Creates a field sharing an occupancy grid's lattice.
    #[must_use]
    pub fn with_meta_of(grid: &OccupancyGrid) -> Self {
        Self::new(*grid.meta())
    }

    /// Builds the signed field of an occupancy grid in one step.
    ///
    /// Boundary cells are pinned to exactly zero; see
    /// [`DistanceGrid::build_from_ternary_mask`].
    ///
    /// # Errors
    ///
    /// Propagates mask-build errors (cannot occur for a well-formed
    /// grid).
    pub fn from_occupancy(grid: &OccupancyGrid, parallel: bool) -> SdfResult<Self> {
        let mut field = Self::with_meta_of(grid);
        field.build_from_ternary_mask(&grid.ternary_mask(), parallel)?;
        Ok(field)
    }

    /// The field's lattice metadata.
    #[inline]
    #[must_use]
    pub const fn meta(&self) -> &GridMeta {
        &self.meta
    }

    /// Read-only view of the value buffer.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Mutable view of the value buffer.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// The value at a lattice index.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::OutOfBounds`] outside the grid window.
    pub fn get(&self, x: i32, y: i32, z: i32) -> SdfResult<f32> {
        self.meta
            .linear_index(x, y, z)
            .map(|i| self.values[i])
            .ok_or(SdfError::OutOfBounds { x, y, z })
    }

    /// The value at a linear storage index.
    #[inline]
    #[must_use]
    pub fn get_linear(&self, linear: usize) -> Option<f32> {
        self.values.get(linear).copied()
    }

    /// The value of the cell containing a world position, clamped to the
    /// nearest cell for positions outside the grid.
    #[must_use]
    pub fn value_at(&self, world: &Point3<f32>) -> f32 {
        let index = self
            .meta
            .clamp_index(world_to_grid_min(world, self.meta.voxel_size()));
        // A clamped index is always inside the window.
        self.meta
            .linear_index(index[0], index[1], index[2])
            .map_or(0.0, |i| self.values[i])
    }

    /// Shifts the whole field by a constant, morphing the zero
    /// iso-surface inward or outward.
    pub fn add_offset(&mut self, delta: f32) {
        for value in &mut self.values {
            *value += delta;
        }
    }

    /// Minimum and maximum field values.
    #[must_use]
    pub fn min_max(&self) -> (f32, f32) {
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &value in &self.values {
            lo = lo.min(value);
            hi = hi.max(value);
        }
        (lo, hi)
    }

    /// Builds the field from a binary mask (1 = inside, 0 = outside).
    ///
    /// Runs two exact distance transforms - one with the foreground
    /// cells as seeds, one with the background - and combines them as
    /// `sqrt(d_fg) - sqrt(d_bg)`, giving positive distances outside and
    /// negative inside. Uniform voxel sizes take the integer-exact
    /// isotropic path (unless a dimension reaches 32768 cells, where its
    /// sentinel would stop dominating); anisotropic sizes use the
    /// weighted transform.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::BufferLength`] if the mask does not match the
    /// cell count.
    pub fn build_from_binary_mask(&mut self, mask: &[u8], parallel: bool) -> SdfResult<()> {
        self.build(mask, |m| m != 0, |m| m == 0, parallel)?;
        Ok(())
    }

    /// Builds the field from a ternary mask (0 = outside, 1 = inside,
    /// 2 = boundary).
    ///
    /// Boundary cells seed **both** transforms, and after the combine
    /// every boundary cell is snapped to exactly `0.0` to remove
    /// floating-point noise on the zero level set.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::BufferLength`] if the mask does not match the
    /// cell count.
    pub fn build_from_ternary_mask(&mut self, mask: &[u8], parallel: bool) -> SdfResult<()> {
        self.build(mask, |m| m == 1 || m == 2, |m| m == 0 || m == 2, parallel)?;
        for (value, &m) in self.values.iter_mut().zip(mask) {
            if m == 2 {
                *value = 0.0;
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_sign_loss)] // dims are validated positive
    fn build(
        &mut self,
        mask: &[u8],
        is_fg: impl Fn(u8) -> bool,
        is_bg: impl Fn(u8) -> bool,
        parallel: bool,
    ) -> SdfResult<()> {
        let cells = self.meta.cell_count();
        if mask.len() != cells {
            return Err(SdfError::BufferLength {
                expected: cells,
                got: mask.len(),
            });
        }

        let [nx, ny, nz] = self.meta.dims();
        let dims = [nx as usize, ny as usize, nz as usize];
        let size = self.meta.voxel_size();

        #[allow(clippy::float_cmp)] // uniform spacing is constructed, not computed
        let isotropic = size.x == size.y
            && size.y == size.z
            && [nx, ny, nz].iter().all(|&n| n < ISOTROPIC_DIM_LIMIT);

        info!(
            cells,
            isotropic, parallel, "building signed distance field from mask"
        );

        if isotropic {
            let mut cost_fg = pool::rent_i64(cells);
            let mut cost_bg = pool::rent_i64(cells);
            for (i, &m) in mask.iter().enumerate() {
                cost_fg[i] = if is_fg(m) { 0 } else { INT_SENTINEL };
                cost_bg[i] = if is_bg(m) { 0 } else { INT_SENTINEL };
            }

            let mut d_fg = pool::rent_i64(cells);
            let mut d_bg = pool::rent_i64(cells);
            edt_3d_isotropic(&cost_fg, &mut d_fg, dims, parallel)?;
            edt_3d_isotropic(&cost_bg, &mut d_bg, dims, parallel)?;

            let spacing = f64::from(size.x);
            for (i, value) in self.values.iter_mut().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let signed = {
                    let fg = (d_fg[i] as f64).sqrt();
                    let bg = (d_bg[i] as f64).sqrt();
                    ((fg - bg) * spacing) as f32
                };
                *value = signed;
            }
        } else {
            let weights = [
                f64::from(size.x) * f64::from(size.x),
                f64::from(size.y) * f64::from(size.y),
                f64::from(size.z) * f64::from(size.z),
            ];

            let mut cost_fg = pool::rent_f64(cells);
            let mut cost_bg = pool::rent_f64(cells);
            for (i, &m) in mask.iter().enumerate() {
                cost_fg[i] = if is_fg(m) { 0.0 } else { FLOAT_SENTINEL };
                cost_bg[i] = if is_bg(m) { 0.0 } else { FLOAT_SENTINEL };
            }

            let mut d_fg = pool::rent_f64(cells);
            let mut d_bg = pool::rent_f64(cells);
            edt_3d_weighted(&cost_fg, &mut d_fg, dims, weights, parallel)?;
            edt_3d_weighted(&cost_bg, &mut d_bg, dims, weights, parallel)?;

            for (i, value) in self.values.iter_mut().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let signed = (d_fg[i].sqrt() - d_bg[i].sqrt()) as f32;
                *value = signed;
            }
        }

        Ok(())
    }
}
