//! Polygonal surface reconstruction from voxel sets.
//!
//! Turns a set of voxel origins on a uniform lattice back into a
//! triangle mesh:
//!
//! - [`DiscreteMesher`] - Culled surface meshing: voxel origins are
//!   quantized, indexed in a Morton-coded occupancy set, and a quad is
//!   emitted for every voxel face whose neighbour is absent
//! - [`morton_encode`] / [`morton_decode`] - 63-bit Z-order codes
//!   (21 bits per axis) used as the occupancy key
//!
//! Per-voxel box meshes (no culling) are available for debugging and for
//! voxel sets with non-uniform sizes.
//!
//! # Example
//!
//! ```
//! use mesh_types::{CoordSystem, Point3, Vector3};
//! use voxel_mesher::DiscreteMesher;
//!
//! // Two voxels sharing a face: the shared face is culled.
//! let origins = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
//! let mesh = DiscreteMesher::new(CoordSystem::RightHanded)
//!     .generate_mesh(&origins, &Vector3::new(1.0, 1.0, 1.0))
//!     .unwrap();
//!
//! assert_eq!(mesh.face_count(), 20); // 2 * 12 - 2 * 2 culled
//! assert!(mesh.is_closed());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod mesher;
mod morton;

pub use error::{MesherError, MesherResult};
pub use mesher::DiscreteMesher;
pub use morton::{morton_decode, morton_encode, MORTON_AXIS_BITS};
