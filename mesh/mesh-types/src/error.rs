//! Error types for mesh construction.

use thiserror::Error;

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur when constructing meshes or polylines.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MeshError {
    /// A face references a vertex index outside the vertex array.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        /// Index of the offending face.
        face: usize,
        /// The out-of-range vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face uses the same vertex index more than once.
    #[error("face {face} is degenerate: indices ({a}, {b}, {c}) are not distinct")]
    DegenerateFace {
        /// Index of the offending face.
        face: usize,
        /// First vertex index.
        a: u32,
        /// Second vertex index.
        b: u32,
        /// Third vertex index.
        c: u32,
    },
}
