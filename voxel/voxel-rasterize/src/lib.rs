//! Triangle and polyline voxelization.
//!
//! Converts triangle meshes and 3D polylines into sets of boundary voxels
//! on a rectilinear lattice:
//!
//! - [`DenseRasterizer`] - Marks [`Occupancy::Boundary`](voxel_grid::Occupancy)
//!   cells in an existing [`OccupancyGrid`](voxel_grid::OccupancyGrid),
//!   optionally followed by interior classification
//! - [`SparseRasterizer`] - Produces deduplicated voxel origins without a
//!   backing grid
//! - [`tri_box_overlap`] / [`covered_by_triangle`] - The separating-axis
//!   predicate pair driving both rasterizers
//! - [`segment_voxels`] - Amanatides-Woo traversal of the voxels along a
//!   line segment
//!
//! # Conservativeness
//!
//! A voxel is marked when its box overlaps a triangle under the SAT test
//! *or* when its center lies within the triangle's padded footprint; the
//! small epsilons keep geometry sitting exactly on cell planes from
//! dropping out of the result.
//!
//! # Example
//!
//! ```
//! use mesh_types::{Point3, Polyline, Vector3};
//! use voxel_rasterize::SparseRasterizer;
//!
//! let mut line = Polyline::new();
//! line.push(Point3::new(0.0, 0.0, 0.0));
//! line.push(Point3::new(3.0, 0.0, 0.0));
//!
//! let origins = SparseRasterizer::default()
//!     .rasterize_polyline(&line, &Vector3::new(1.0, 1.0, 1.0), true);
//! assert_eq!(origins.len(), 3);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod dense;
mod overlap;
mod sparse;
mod traverse;

pub use dense::DenseRasterizer;
pub use overlap::{covered_by_triangle, segment_box_overlap, tri_box_overlap, SAT_EPS};
pub use sparse::SparseRasterizer;
pub use traverse::{segment_voxels, SegmentTraversal};

/// Default face count above which rasterizers go parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;
