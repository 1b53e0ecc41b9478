//! OBJ writing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use mesh_types::TriMesh;

use crate::error::ObjResult;

/// Save a triangle mesh to an OBJ file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_obj<P: AsRef<Path>>(path: P, mesh: &TriMesh) -> ObjResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_obj(&mut writer, mesh)?;
    writer.flush()?;
    Ok(())
}

/// Write a triangle mesh as OBJ to a writer.
///
/// Emits one `v x y z` record per vertex followed by one `f a b c` record
/// per face (1-based indices), UTF-8 with LF line endings. Numbers use
/// Rust's locale-independent float formatting (decimal point).
///
/// # Errors
///
/// Returns an error if the writer fails.
///
/// # Example
///
/// ```
/// use mesh_types::{Aabb, CoordSystem, Point3};
///
/// let cube = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
///     .to_mesh(CoordSystem::RightHanded);
///
/// let mut out = Vec::new();
/// mesh_obj::write_obj(&mut out, &cube).unwrap();
///
/// let text = String::from_utf8(out).unwrap();
/// assert!(text.starts_with("v 0 0 0\n"));
/// ```
pub fn write_obj<W: Write>(writer: &mut W, mesh: &TriMesh) -> ObjResult<()> {
    for vertex in mesh.vertices() {
        writeln!(writer, "v {} {} {}", vertex.x, vertex.y, vertex.z)?;
    }
    for face in mesh.faces() {
        writeln!(writer, "f {} {} {}", face.a + 1, face.b + 1, face.c + 1)?;
    }
    Ok(())
}
