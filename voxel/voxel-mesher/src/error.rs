//! Error types for voxel meshing.

use thiserror::Error;

/// Result type for meshing operations.
pub type MesherResult<T> = Result<T, MesherError>;

/// Errors that can occur during voxel meshing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MesherError {
    /// Meshing was invoked on an empty voxel set.
    #[error("cannot mesh an empty voxel set")]
    EmptyInput,

    /// Per-voxel sizes were supplied with the wrong length.
    #[error("got {sizes} voxel sizes for {origins} origins")]
    LengthMismatch {
        /// Number of origins.
        origins: usize,
        /// Number of sizes.
        sizes: usize,
    },

    /// A voxel size is non-positive or non-finite.
    #[error("voxel size must be positive and finite, got ({x}, {y}, {z})")]
    InvalidVoxelSize {
        /// X extent.
        x: f32,
        /// Y extent.
        y: f32,
        /// Z extent.
        z: f32,
    },

    /// The generated geometry failed mesh validation.
    #[error("invalid generated mesh: {0}")]
    Mesh(#[from] mesh_types::MeshError),
}
