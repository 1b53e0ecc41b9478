//! Continuous reconstruction over a [`DistanceGrid`].
//!
//! Field values are taken to live at **cell centers**; trilinear
//! interpolation reconstructs between the eight surrounding centers, so
//! sampling exactly at a center returns that cell's stored value.

use mesh_types::{Point3, Vector3};

use crate::distance::DistanceGrid;
use crate::error::{SdfError, SdfResult};

/// Gradient magnitudes below this produce a zero normal.
const NORMAL_EPS: f32 = 1e-8;

impl DistanceGrid {
    /// Trilinearly interpolated field value at a world position.
    ///
    /// With `clamp` set, positions beyond the outermost cell centers are
    /// clamped to the field edge (constant extrapolation); otherwise
    /// such positions fail. Axes with a single cell use that cell's
    /// value directly.
    ///
    /// # Errors
    ///
    /// Returns [`SdfError::SampleOutOfBounds`] when `clamp` is `false`
    /// and the position leaves the sampled lattice.
    #[allow(clippy::cast_sign_loss)] // dims are validated positive
    pub fn sample_trilinear(&self, world: &Point3<f32>, clamp: bool) -> SdfResult<f32> {
        let (cell, frac) = self.locate(world, clamp)?;

        let [nx, ny, _] = self.meta().dims();
        let (nx, ny) = (nx as usize, ny as usize);
        let base = cell[2] * nx * ny + cell[1] * nx + cell[0];
        let values = self.values();

        // Step sizes collapse to zero on degenerate axes so the eight
        // corner fetches stay in bounds.
        let step_x = if self.meta().dims()[0] > 1 { 1 } else { 0 };
        let step_y = if self.meta().dims()[1] > 1 { nx } else { 0 };
        let step_z = if self.meta().dims()[2] > 1 { nx * ny } else { 0 };

        let c000 = values[base];
        let c100 = values[base + step_x];
        let c010 = values[base + step_y];
        let c110 = values[base + step_y + step_x];
        let c001 = values[base + step_z];
        let c101 = values[base + step_z + step_x];
        let c011 = values[base + step_z + step_y];
        let c111 = values[base + step_z + step_y + step_x];

        // Interpolate along x, then y, then z.
        let x00 = c000 + (c100 - c000) * frac.x;
        let x10 = c010 + (c110 - c010) * frac.x;
        let x01 = c001 + (c101 - c001) * frac.x;
        let x11 = c011 + (c111 - c011) * frac.x;
        let y0 = x00 + (x10 - x00) * frac.y;
        let y1 = x01 + (x11 - x01) * frac.y;
        Ok(y0 + (y1 - y0) * frac.z)
    }

    /// Central-difference gradient of the field, in world units.
    ///
    /// Each component is `(sample(p + s) - sample(p - s)) / (2 s)` with
    /// `s` the voxel size on that axis; degenerate single-cell axes
    /// contribute zero.
    ///
    /// # Errors
    ///
    /// Propagates sampling failures when `clamp` is `false`.
    pub fn sample_gradient(&self, world: &Point3<f32>, clamp: bool) -> SdfResult<Vector3<f32>> {
        let size = *self.meta().voxel_size();
        let dims = self.meta().dims();
        let mut gradient = Vector3::zeros();

        for axis in 0..3 {
            if dims[axis] <= 1 {
                continue;
            }
            let mut offset = Vector3::zeros();
            offset[axis] = size[axis];
            let ahead = self.sample_trilinear(&(world + offset), clamp)?;
            let behind = self.sample_trilinear(&(world - offset), clamp)?;
            gradient[axis] = (ahead - behind) / (2.0 * size[axis]);
        }
        Ok(gradient)
    }

    /// Unit surface normal (normalized gradient) at a world position.
    ///
    /// Returns the zero vector where the gradient magnitude falls below
    /// `1e-8` (flat or symmetric regions).
    ///
    /// # Errors
    ///
    /// Propagates sampling failures when `clamp` is `false`.
    pub fn sample_normal(&self, world: &Point3<f32>, clamp: bool) -> SdfResult<Vector3<f32>> {
        let gradient = self.sample_gradient(world, clamp)?;
        let norm = gradient.norm();
        if norm < NORMAL_EPS {
            return Ok(Vector3::zeros());
        }
        Ok(gradient / norm)
    }

    /// Lower interpolation corner (grid-local) and in-cell fractions for
    /// a world position.
    fn locate(&self, world: &Point3<f32>, clamp: bool) -> SdfResult<([usize; 3], Vector3<f32>)> {
        let meta = self.meta();
        let size = meta.voxel_size();
        let dims = meta.dims();
        let origin = meta.index_min_corner(meta.min_index());

        let mut cell = [0_usize; 3];
        let mut frac = Vector3::zeros();

        for axis in 0..3 {
            let n = dims[axis];
            if n <= 1 {
                continue; // degenerate axis: zero offset
            }

            // Continuous coordinate in units of cell centers.
            let rel = (world[axis] - origin[axis]) / size[axis] - 0.5;
            let lower = rel.floor();
            #[allow(clippy::cast_possible_truncation)]
            let mut index = lower as i64;
            let mut t = rel - lower;

            let last_pair = i64::from(n) - 2;
            if index < 0 || index > last_pair {
                if !clamp {
                    return Err(SdfError::SampleOutOfBounds {
                        x: world.x,
                        y: world.y,
                        z: world.z,
                    });
                }
                if index < 0 {
                    index = 0;
                    t = 0.0;
                } else {
                    index = last_pair;
                    t = 1.0;
                }
            }

            #[allow(clippy::cast_sign_loss)]
            {
                cell[axis] = index as usize;
            }
            frac[axis] = t.clamp(0.0, 1.0);
        }

        Ok((cell, frac))
    }
}
