//! Error types for OBJ I/O.

use thiserror::Error;

/// Result type for OBJ operations.
pub type ObjResult<T> = Result<T, ObjError>;

/// Errors that can occur while reading or writing OBJ files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ObjError {
    /// A record could not be parsed.
    #[error("line {line_no}: {message} (in {line:?})")]
    Parse {
        /// 1-based line number.
        line_no: usize,
        /// The offending raw line.
        line: String,
        /// Description of what was invalid.
        message: String,
    },

    /// A face used index 0, which OBJ reserves as invalid.
    #[error("line {line_no}: face index 0 is invalid (indices are 1-based)")]
    ZeroIndex {
        /// 1-based line number.
        line_no: usize,
    },

    /// A face index resolved outside the vertex list read so far.
    #[error("line {line_no}: face index {index} out of range ({vertex_count} vertices)")]
    IndexOutOfRange {
        /// 1-based line number.
        line_no: usize,
        /// The resolved index as written.
        index: i64,
        /// Vertices available at that point.
        vertex_count: usize,
    },

    /// A face with other than three vertices.
    #[error("line {line_no}: only triangular faces are supported, got {count} vertices")]
    NonTriangularFace {
        /// 1-based line number.
        line_no: usize,
        /// Number of vertex tokens on the face.
        count: usize,
    },

    /// The parsed data did not form a valid mesh.
    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] mesh_types::MeshError),

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ObjError {
    /// Create a [`ObjError::Parse`] for a line.
    #[must_use]
    pub fn parse(line_no: usize, line: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            line_no,
            line: line.to_owned(),
            message: message.into(),
        }
    }
}
