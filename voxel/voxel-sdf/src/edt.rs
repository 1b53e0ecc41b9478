//! Exact Euclidean distance transforms.
//!
//! Felzenszwalb-Huttenlocher distance transform: the 1-D transform
//! computes `D[i] = min_j (w * (i - j)^2 + f[j])` in `O(n)` by
//! maintaining the lower envelope of the parabolas rooted at each `j`,
//! and the 2-D/3-D transforms apply it separably along each axis.
//!
//! Two instantiations exist: an **isotropic** integer form (`w = 1`,
//! exact squared cell distances) and a **weighted** floating form for
//! anisotropic spacing (`w = spacing^2` per axis).
//!
//! The 3-D drivers use the output volume plus one pooled scratch volume
//! as ping-pong buffers; no per-pass volume is allocated.

use rayon::prelude::*;

use crate::error::{SdfError, SdfResult};
use crate::pool;

/// Seed-cost sentinel for the integer transform.
///
/// Large enough to dominate any reachable `(i - j)^2` for volumes up to
/// 32768 cells per axis; above that the weighted form must be used.
pub const INT_SENTINEL: i64 = 1 << 28;

/// Seed-cost sentinel for the floating transform.
pub const FLOAT_SENTINEL: f64 = 1e30;

/// Reusable 1-D lower-envelope transformer.
///
/// Holds the parabola stack (`v`: apex positions, `z`: region
/// boundaries) so repeated line transforms allocate nothing.
///
/// # Example
///
/// ```
/// use voxel_sdf::{Edt1d, INT_SENTINEL};
///
/// let f = [0, INT_SENTINEL, INT_SENTINEL, INT_SENTINEL, 0];
/// let mut d = [0_i64; 5];
/// Edt1d::new().isotropic(&f, &mut d);
/// assert_eq!(d, [0, 1, 4, 1, 0]);
/// ```
#[derive(Debug, Default)]
pub struct Edt1d {
    /// Apex position of each envelope parabola.
    v: Vec<usize>,
    /// Region boundaries; parabola `k` is lowest on `[z[k], z[k + 1])`.
    z: Vec<f64>,
}

impl Edt1d {
    /// Creates a transformer with empty scratch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact integer transform with unit weight.
    ///
    /// `d[i] = min_j ((i - j)^2 + f[j])`, integer-exact. `f` and `d`
    /// must have equal lengths.
    #[allow(clippy::cast_precision_loss)] // apex positions are < 2^28
    pub fn isotropic(&mut self, f: &[i64], d: &mut [i64]) {
        let n = f.len();
        debug_assert_eq!(d.len(), n);
        if n == 0 {
            return;
        }
        self.v.resize(n, 0);
        self.z.resize(n + 1, 0.0);

        let cost = |q: usize| f[q] as f64 + (q * q) as f64;

        let mut k = 0_usize;
        self.v[0] = 0;
        self.z[0] = f64::NEG_INFINITY;
        self.z[1] = f64::INFINITY;

        for q in 1..n {
            let fq = cost(q);
            loop {
                let p = self.v[k];
                // Intersection of the parabolas rooted at p and q; s can
                // never fall below z[0] = -inf, so k never underflows.
                let s = (fq - cost(p)) / (2.0 * (q as f64 - p as f64));
                if s <= self.z[k] {
                    k -= 1;
                } else {
                    k += 1;
                    self.v[k] = q;
                    self.z[k] = s;
                    self.z[k + 1] = f64::INFINITY;
                    break;
                }
            }
        }

        k = 0;
        for (x, out) in d.iter_mut().enumerate() {
            while self.z[k + 1] < x as f64 {
                k += 1;
            }
            let p = self.v[k];
            let dx = x as i64 - p as i64;
            *out = dx * dx + f[p];
        }
    }

    /// Weighted transform for anisotropic spacing.
    ///
    /// `d[i] = min_j (weight * (i - j)^2 + f[j])` with
    /// `weight = spacing^2`.
    #[allow(clippy::cast_precision_loss)]
    pub fn weighted(&mut self, f: &[f64], d: &mut [f64], weight: f64) {
        let n = f.len();
        debug_assert_eq!(d.len(), n);
        if n == 0 {
            return;
        }
        self.v.resize(n, 0);
        self.z.resize(n + 1, 0.0);

        let cost = |q: usize| weight.mul_add((q * q) as f64, f[q]);

        let mut k = 0_usize;
        self.v[0] = 0;
        self.z[0] = f64::NEG_INFINITY;
        self.z[1] = f64::INFINITY;

        for q in 1..n {
            let fq = cost(q);
            loop {
                let p = self.v[k];
                let s = (fq - cost(p)) / (2.0 * weight * (q as f64 - p as f64));
                if s <= self.z[k] {
                    k -= 1;
                } else {
                    k += 1;
                    self.v[k] = q;
                    self.z[k] = s;
                    self.z[k + 1] = f64::INFINITY;
                    break;
                }
            }
        }

        k = 0;
        for (x, out) in d.iter_mut().enumerate() {
            while self.z[k + 1] < x as f64 {
                k += 1;
            }
            let p = self.v[k];
            let dx = x as f64 - p as f64;
            *out = weight.mul_add(dx * dx, f[p]);
        }
    }
}

/// Allocating convenience form of [`Edt1d::isotropic`].
#[must_use]
pub fn edt_1d_isotropic(f: &[i64]) -> Vec<i64> {
    let mut d = vec![0; f.len()];
    Edt1d::new().isotropic(f, &mut d);
    d
}

/// Allocating convenience form of [`Edt1d::weighted`].
#[must_use]
pub fn edt_1d_weighted(f: &[f64], weight: f64) -> Vec<f64> {
    let mut d = vec![0.0; f.len()];
    Edt1d::new().weighted(f, &mut d, weight);
    d
}

fn check_dims(len_f: usize, len_out: usize, cells: usize, dims: &[usize]) -> SdfResult<()> {
    if dims.iter().any(|&n| n == 0) {
        return Err(SdfError::EmptyVolume {
            nx: dims.first().copied().unwrap_or(0),
            ny: dims.get(1).copied().unwrap_or(0),
            nz: dims.get(2).copied().unwrap_or(0),
        });
    }
    if len_f != cells {
        return Err(SdfError::BufferLength {
            expected: cells,
            got: len_f,
        });
    }
    if len_out != cells {
        return Err(SdfError::BufferLength {
            expected: cells,
            got: len_out,
        });
    }
    Ok(())
}

/// 2-D exact integer distance transform (x pass, then y pass).
///
/// # Errors
///
/// Returns an error for zero dimensions or mismatched buffer lengths.
pub fn edt_2d_isotropic(
    f: &[i64],
    out: &mut [i64],
    dims: [usize; 2],
    parallel: bool,
) -> SdfResult<()> {
    let [nx, ny] = dims;
    check_dims(f.len(), out.len(), nx * ny, &dims)?;

    let mut tmp = pool::rent_i64(nx * ny);
    iso_pass_rows(f, &mut tmp, nx, parallel);
    iso_pass_columns(&tmp, out, nx, ny, 1, parallel);
    Ok(())
}

/// 2-D weighted distance transform with per-axis weights.
///
/// # Errors
///
/// Returns an error for zero dimensions or mismatched buffer lengths.
pub fn edt_2d_weighted(
    f: &[f64],
    out: &mut [f64],
    dims: [usize; 2],
    weights: [f64; 2],
    parallel: bool,
) -> SdfResult<()> {
    let [nx, ny] = dims;
    check_dims(f.len(), out.len(), nx * ny, &dims)?;

    let mut tmp = pool::rent_f64(nx * ny);
    weighted_pass_rows(f, &mut tmp, nx, weights[0], parallel);
    weighted_pass_columns(&tmp, out, nx, ny, 1, weights[1], parallel);
    Ok(())
}

/// 3-D exact integer distance transform (x, then y, then z pass).
///
/// Output cells hold the exact squared cell distance to the nearest
/// seed. Results are bit-identical for both values of `parallel`.
///
/// # Errors
///
/// Returns an error for zero dimensions or mismatched buffer lengths.
pub fn edt_3d_isotropic(
    f: &[i64],
    out: &mut [i64],
    dims: [usize; 3],
    parallel: bool,
) -> SdfResult<()> {
    let [nx, ny, nz] = dims;
    check_dims(f.len(), out.len(), nx * ny * nz, &dims)?;

    // Ping-pong: f -> out (x), out -> tmp (y), tmp -> out (z).
    let mut tmp = pool::rent_i64(nx * ny * nz);
    iso_pass_rows(f, out, nx, parallel);
    iso_pass_columns(out, &mut tmp, nx, ny, nz, parallel);
    iso_pass_depth(&tmp, out, nx, ny, nz, parallel);
    Ok(())
}

/// 3-D weighted distance transform with per-axis weights.
///
/// # Errors
///
/// Returns an error for zero dimensions or mismatched buffer lengths.
pub fn edt_3d_weighted(
    f: &[f64],
    out: &mut [f64],
    dims: [usize; 3],
    weights: [f64; 3],
    parallel: bool,
) -> SdfResult<()> {
    let [nx, ny, nz] = dims;
    check_dims(f.len(), out.len(), nx * ny * nz, &dims)?;

    let mut tmp = pool::rent_f64(nx * ny * nz);
    weighted_pass_rows(f, out, nx, weights[0], parallel);
    weighted_pass_columns(out, &mut tmp, nx, ny, nz, weights[1], parallel);
    weighted_pass_depth(&tmp, out, nx, ny, nz, weights[2], parallel);
    Ok(())
}

// The passes below come in an integer and a floating flavour with the
// same shape: x lines are contiguous rows, y lines are gathered and
// scattered per z-slab, and z lines stride across slabs (their outputs
// are collected per line and scattered afterwards so parallel workers
// never share cells).

fn iso_pass_rows(src: &[i64], dst: &mut [i64], nx: usize, parallel: bool) {
    if parallel {
        dst.par_chunks_mut(nx)
            .zip(src.par_chunks(nx))
            .for_each_init(Edt1d::new, |t, (d_row, f_row)| t.isotropic(f_row, d_row));
    } else {
        let mut t = Edt1d::new();
        for (d_row, f_row) in dst.chunks_mut(nx).zip(src.chunks(nx)) {
            t.isotropic(f_row, d_row);
        }
    }
}

fn weighted_pass_rows(src: &[f64], dst: &mut [f64], nx: usize, weight: f64, parallel: bool) {
    if parallel {
        dst.par_chunks_mut(nx)
            .zip(src.par_chunks(nx))
            .for_each_init(Edt1d::new, |t, (d_row, f_row)| {
                t.weighted(f_row, d_row, weight);
            });
    } else {
        let mut t = Edt1d::new();
        for (d_row, f_row) in dst.chunks_mut(nx).zip(src.chunks(nx)) {
            t.weighted(f_row, d_row, weight);
        }
    }
}

fn iso_pass_columns(src: &[i64], dst: &mut [i64], nx: usize, ny: usize, nz: usize, parallel: bool) {
    let slab = nx * ny;
    let run = |(d_slab, s_slab): (&mut [i64], &[i64])| {
        let mut t = Edt1d::new();
        let mut f_line = vec![0_i64; ny];
        let mut d_line = vec![0_i64; ny];
        for x in 0..nx {
            for y in 0..ny {
                f_line[y] = s_slab[y * nx + x];
            }
            t.isotropic(&f_line, &mut d_line);
            for y in 0..ny {
                d_slab[y * nx + x] = d_line[y];
            }
        }
    };

    debug_assert_eq!(src.len(), slab * nz);
    if parallel {
        dst.par_chunks_mut(slab).zip(src.par_chunks(slab)).for_each(run);
    } else {
        dst.chunks_mut(slab).zip(src.chunks(slab)).for_each(run);
    }
}

fn weighted_pass_columns(
    src: &[f64],
    dst: &mut [f64],
    nx: usize,
    ny: usize,
    nz: usize,
    weight: f64,
    parallel: bool,
) {
    let slab = nx * ny;
    let run = |(d_slab, s_slab): (&mut [f64], &[f64])| {
        let mut t = Edt1d::new();
        let mut f_line = vec![0.0_f64; ny];
        let mut d_line = vec![0.0_f64; ny];
        for x in 0..nx {
            for y in 0..ny {
                f_line[y] = s_slab[y * nx + x];
            }
            t.weighted(&f_line, &mut d_line, weight);
            for y in 0..ny {
                d_slab[y * nx + x] = d_line[y];
            }
        }
    };

    debug_assert_eq!(src.len(), slab * nz);
    if parallel {
        dst.par_chunks_mut(slab).zip(src.par_chunks(slab)).for_each(run);
    } else {
        dst.chunks_mut(slab).zip(src.chunks(slab)).for_each(run);
    }
}

fn iso_pass_depth(src: &[i64], dst: &mut [i64], nx: usize, ny: usize, nz: usize, parallel: bool) {
    let slab = nx * ny;
    if parallel {
        let lines: Vec<Vec<i64>> = (0..slab)
            .into_par_iter()
            .map_init(
                || (Edt1d::new(), vec![0_i64; nz]),
                |(t, f_line), base| {
                    for z in 0..nz {
                        f_line[z] = src[z * slab + base];
                    }
                    let mut d_line = vec![0_i64; nz];
                    t.isotropic(f_line, &mut d_line);
                    d_line
                },
            )
            .collect();
        for (base, d_line) in lines.iter().enumerate() {
            for z in 0..nz {
                dst[z * slab + base] = d_line[z];
            }
        }
    } else {
        let mut t = Edt1d::new();
        let mut f_line = vec![0_i64; nz];
        let mut d_line = vec![0_i64; nz];
        for base in 0..slab {
            for z in 0..nz {
                f_line[z] = src[z * slab + base];
            }
            t.isotropic(&f_line, &mut d_line);
            for z in 0..nz {
                dst[z * slab + base] = d_line[z];
            }
        }
    }
}

fn weighted_pass_depth(
    src: &[f64],
    dst: &mut [f64],
    nx: usize,
    ny: usize,
    nz: usize,
    weight: f64,
    parallel: bool,
) {
    let slab = nx * ny;
    if parallel {
        let lines: Vec<Vec<f64>> = (0..slab)
            .into_par_iter()
            .map_init(
                || (Edt1d::new(), vec![0.0_f64; nz]),
                |(t, f_line), base| {
                    for z in 0..nz {
                        f_line[z] = src[z * slab + base];
                    }
                    let mut d_line = vec![0.0_f64; nz];
                    t.weighted(f_line, &mut d_line, weight);
                    d_line
                },
            )
            .collect();
        for (base, d_line) in lines.iter().enumerate() {
            for z in 0..nz {
                dst[z * slab + base] = d_line[z];
            }
        }
    } else {
        let mut t = Edt1d::new();
        let mut f_line = vec![0.0_f64; nz];
        let mut d_line = vec![0.0_f64; nz];
        for base in 0..slab {
            for z in 0..nz {
                f_line[z] = src[z * slab + base];
            }
            t.weighted(&f_line, &mut d_line, weight);
            for z in 0..nz {
                dst[z * slab + base] = d_line[z];
            }
        }
    }
}
