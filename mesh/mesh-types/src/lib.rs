//! Core geometry types for the voxfield crates.
//!
//! This crate provides the value types shared across the voxelization,
//! distance-field, and surface-reconstruction crates:
//!
//! - [`Aabb`] - Axis-aligned bounding box with expand-from-empty semantics
//! - [`Tri`] - Triangle face as vertex indices
//! - [`TriMesh`] - Indexed triangle mesh with a watertightness flag
//! - [`Polyline`] - Ordered vertex chain with cached length
//! - [`CoordSystem`] - Right- or left-handed winding convention
//!
//! # Layer 0
//!
//! This is a Layer 0 crate: no engine, GUI, or async-runtime dependencies.
//! It can be used from CLI tools, servers, WASM, and other engines.
//!
//! # Coordinate Systems
//!
//! World-space geometry is single-precision (`Point3<f32>` / `Vector3<f32>`).
//! Meshes default to **counter-clockwise winding viewed from outside**
//! ([`CoordSystem::RightHanded`]); generated geometry can be emitted with
//! either convention.
//!
//! # Example
//!
//! ```
//! use mesh_types::{TriMesh, Tri, Point3};
//!
//! // A watertight pyramid: 4 base corners, 1 apex, 6 faces.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.6),
//! ];
//! let faces = vec![
//!     Tri::new(0, 2, 1),
//!     Tri::new(0, 3, 2),
//!     Tri::new(0, 1, 4),
//!     Tri::new(1, 2, 4),
//!     Tri::new(2, 3, 4),
//!     Tri::new(3, 0, 4),
//! ];
//!
//! let mesh = TriMesh::new(vertices, faces).unwrap();
//! assert!(mesh.is_closed());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bounds;
mod coords;
mod error;
mod mesh;
mod polyline;
mod triangle;

pub use bounds::Aabb;
pub use coords::CoordSystem;
pub use error::{MeshError, MeshResult};
pub use mesh::TriMesh;
pub use polyline::{Polyline, POLYLINE_CLOSE_EPS};
pub use triangle::Tri;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
