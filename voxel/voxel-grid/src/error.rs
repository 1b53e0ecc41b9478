//! Error types for grid operations.

use thiserror::Error;

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur during grid operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GridError {
    /// Voxel sizes must be positive and finite on every axis.
    #[error("voxel size must be positive and finite, got ({x}, {y}, {z})")]
    InvalidVoxelSize {
        /// X spacing.
        x: f32,
        /// Y spacing.
        y: f32,
        /// Z spacing.
        z: f32,
    },

    /// Grid extents must be positive on every axis.
    #[error("invalid grid dimensions: {nx}x{ny}x{nz}")]
    InvalidDimensions {
        /// X extent in cells.
        nx: i32,
        /// Y extent in cells.
        ny: i32,
        /// Z extent in cells.
        nz: i32,
    },

    /// An index lies outside the grid.
    #[error("index ({x}, {y}, {z}) is out of grid bounds")]
    OutOfBounds {
        /// X index.
        x: i32,
        /// Y index.
        y: i32,
        /// Z index.
        z: i32,
    },

    /// A buffer's length does not match the grid's cell count.
    #[error("buffer length {got} does not match cell count {expected}")]
    BufferLength {
        /// Required length (`nx * ny * nz`).
        expected: usize,
        /// Provided length.
        got: usize,
    },

    /// The flood-fill queue exceeded its hard capacity limit.
    ///
    /// This indicates a broken traversal invariant; it cannot occur for a
    /// well-formed grid because each cell is enqueued at most once.
    #[error("flood fill queue exceeded its limit of {capacity} entries")]
    QueueOverflow {
        /// The hard limit (total cell count).
        capacity: usize,
    },
}
