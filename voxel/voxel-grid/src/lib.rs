//! Dense voxel occupancy grids.
//!
//! This crate provides the integer-lattice side of the voxfield stack:
//!
//! - [`GridMeta`] - Immutable lattice snapshot (origin index, extents,
//!   voxel size) and world ↔ grid conversion with a single quantization
//!   tolerance ([`QUANT_EPS`])
//! - [`Occupancy`] - Per-cell state: outside, inside, or boundary
//! - [`OccupancyGrid`] - Dense row-major occupancy volume
//! - [`classify_interior`] - 6-connected flood fill that labels cells not
//!   reachable from the grid faces as inside
//!
//! # Layer 0
//!
//! This is a Layer 0 crate: no engine, GUI, or async-runtime dependencies.
//!
//! # Memory Layout
//!
//! Grids are flat arrays in row-major order with **x fastest**, then y,
//! then z: `lin(x, y, z) = (z - min_z) * nx * ny + (y - min_y) * nx +
//! (x - min_x)`.
//!
//! # Example
//!
//! ```
//! use mesh_types::{Aabb, Point3, Vector3};
//! use voxel_grid::{Occupancy, OccupancyGrid};
//!
//! let bounds = Aabb::new(Point3::new(-2.0, -2.0, -2.0), Point3::new(2.0, 2.0, 2.0));
//! let mut grid = OccupancyGrid::from_bounds(&bounds, &Vector3::new(1.0, 1.0, 1.0)).unwrap();
//!
//! assert_eq!(grid.meta().dims(), [4, 4, 4]);
//! grid.set(0, 0, 0, Occupancy::Boundary).unwrap();
//! assert_eq!(grid.count_state(Occupancy::Boundary), 1);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod flood;
mod meta;
mod occupancy;

pub use error::{GridError, GridResult};
pub use flood::{classify_interior, FloodFillStats};
pub use meta::{
    world_to_grid_max, world_to_grid_min, GridMeta, QUANT_EPS,
};
pub use occupancy::{Occupancy, OccupancyGrid};
