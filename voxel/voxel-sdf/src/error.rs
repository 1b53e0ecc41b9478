//! Error types for distance-field operations.

use thiserror::Error;

/// Result type for distance-field operations.
pub type SdfResult<T> = Result<T, SdfError>;

/// Errors that can occur during distance-field operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SdfError {
    /// A buffer's length does not match the expected cell count.
    #[error("buffer length {got} does not match expected {expected}")]
    BufferLength {
        /// Required length.
        expected: usize,
        /// Provided length.
        got: usize,
    },

    /// A volume dimension is zero.
    #[error("volume dimensions must be positive, got {nx}x{ny}x{nz}")]
    EmptyVolume {
        /// X extent.
        nx: usize,
        /// Y extent.
        ny: usize,
        /// Z extent.
        nz: usize,
    },

    /// A lattice index lies outside the grid.
    #[error("index ({x}, {y}, {z}) is out of grid bounds")]
    OutOfBounds {
        /// X index.
        x: i32,
        /// Y index.
        y: i32,
        /// Z index.
        z: i32,
    },

    /// A sample position fell outside the grid with clamping disabled.
    #[error("sample position ({x}, {y}, {z}) is outside the grid and clamping is disabled")]
    SampleOutOfBounds {
        /// World x.
        x: f32,
        /// World y.
        y: f32,
        /// World z.
        z: f32,
    },
}
