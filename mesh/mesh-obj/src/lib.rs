//! Wavefront OBJ file format support.
//!
//! Reads and writes the subset of OBJ used for plain triangle meshes:
//! `v` records (positions) and triangular `f` records. Texture and normal
//! fields in face tokens (`v/vt`, `v//vn`, `v/vt/vn`) are accepted and
//! ignored; any other record type is skipped.
//!
//! # Format Notes
//!
//! - Indices are 1-based; negative indices are relative to the vertex count
//!   at the point of use (`-1` is the most recently read vertex). Index `0`
//!   is invalid.
//! - Faces with more or fewer than three vertices are rejected; this crate
//!   does not triangulate polygons.
//! - Inline `#` comments are stripped.
//! - Output uses LF line endings and locale-independent decimal-point
//!   number formatting.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use mesh_obj::{parse_obj, write_obj};
//!
//! let src = "\
//! v 0 0 0
//! v 1 0 0
//! v 0 1 0
//! f 1 2 3
//! ";
//! let mesh = parse_obj(Cursor::new(src)).unwrap();
//! assert_eq!(mesh.vertex_count(), 3);
//!
//! let mut out = Vec::new();
//! write_obj(&mut out, &mesh).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("f 1 2 3"));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them.
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod read;
mod write;

pub use error::{ObjError, ObjResult};
pub use read::{load_obj, parse_obj};
pub use write::{save_obj, write_obj};
