//! Exact Euclidean distance transforms and signed distance fields.
//!
//! The distance side of the voxfield stack:
//!
//! - 1-D, 2-D, and 3-D **exact** Euclidean distance transforms
//!   (Felzenszwalb-Huttenlocher lower envelope of parabolas), in an
//!   integer-exact isotropic form and a weighted form for anisotropic
//!   voxel spacing
//! - [`DistanceGrid`] - Dense `f32` field with the convention **positive
//!   outside, negative inside, zero on the boundary**, built from binary
//!   or ternary occupancy masks
//! - Trilinear sampling, central-difference gradients, and unit normals
//!   over the field
//!
//! # Determinism
//!
//! Every transform is deterministic down to the bit regardless of the
//! `parallel` flag: scanlines are independent and write disjoint cells.
//!
//! # Example
//!
//! ```
//! use mesh_types::Vector3;
//! use voxel_grid::GridMeta;
//! use voxel_sdf::DistanceGrid;
//!
//! // A 4x4x4 grid with a 2x2x2 solid block in one corner.
//! let meta = GridMeta::new([0, 0, 0], [4, 4, 4], Vector3::new(1.0, 1.0, 1.0)).unwrap();
//! let mut mask = vec![0_u8; 64];
//! for z in 0..2 {
//!     for y in 0..2 {
//!         for x in 0..2 {
//!             mask[z * 16 + y * 4 + x] = 1;
//!         }
//!     }
//! }
//!
//! let mut sdf = DistanceGrid::new(meta);
//! sdf.build_from_binary_mask(&mask, false).unwrap();
//!
//! assert!(sdf.get(0, 0, 0).unwrap() < 0.0); // inside the block
//! assert!(sdf.get(3, 3, 3).unwrap() > 0.0); // far corner
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod distance;
mod edt;
mod error;
mod pool;
mod sample;

pub use distance::DistanceGrid;
pub use edt::{
    edt_1d_isotropic, edt_1d_weighted, edt_2d_isotropic, edt_2d_weighted, edt_3d_isotropic,
    edt_3d_weighted, Edt1d, FLOAT_SENTINEL, INT_SENTINEL,
};
pub use error::{SdfError, SdfResult};
