//! OBJ parsing.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use mesh_types::{Point3, Tri, TriMesh};
use tracing::debug;

use crate::error::{ObjError, ObjResult};

/// Load a triangle mesh from an OBJ file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains malformed
/// records; parse errors carry the offending line.
///
/// # Example
///
/// ```no_run
/// let mesh = mesh_obj::load_obj("model.obj").unwrap();
/// println!("{} faces", mesh.face_count());
/// ```
pub fn load_obj<P: AsRef<Path>>(path: P) -> ObjResult<TriMesh> {
    let file = File::open(path)?;
    parse_obj(BufReader::new(file))
}

/// Parse OBJ data from a reader.
///
/// Recognizes `v x y z [w]` (the optional `w` is ignored) and triangular
/// `f` records; face tokens may carry texture/normal fields, of which only
/// the vertex index is used. Unknown record types are skipped.
///
/// # Errors
///
/// Returns [`ObjError::Parse`] for malformed records,
/// [`ObjError::ZeroIndex`] / [`ObjError::IndexOutOfRange`] for bad face
/// indices, and [`ObjError::NonTriangularFace`] for non-triangle faces.
pub fn parse_obj<R: BufRead>(reader: R) -> ObjResult<TriMesh> {
    let mut vertices: Vec<Point3<f32>> = Vec::new();
    let mut faces: Vec<Tri> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let raw = line?;

        // Strip inline comments and surrounding whitespace.
        let content = raw.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }

        let mut tokens = content.split_whitespace();
        match tokens.next() {
            Some("v") => {
                vertices.push(parse_vertex(line_no, &raw, &mut tokens)?);
            }
            Some("f") => {
                faces.push(parse_face(line_no, &raw, &mut tokens, vertices.len())?);
            }
            // Normals, texture coordinates, groups, materials, ...
            _ => {}
        }
    }

    debug!(
        vertices = vertices.len(),
        faces = faces.len(),
        "parsed OBJ data"
    );

    Ok(TriMesh::new(vertices, faces)?)
}

fn parse_vertex<'a>(
    line_no: usize,
    raw: &str,
    tokens: &mut impl Iterator<Item = &'a str>,
) -> ObjResult<Point3<f32>> {
    let mut coords = [0.0_f32; 3];
    for coord in &mut coords {
        let token = tokens
            .next()
            .ok_or_else(|| ObjError::parse(line_no, raw, "vertex needs three coordinates"))?;
        *coord = token
            .parse::<f32>()
            .map_err(|e| ObjError::parse(line_no, raw, format!("bad coordinate {token:?}: {e}")))?;
    }
    // A fourth token is the optional weight; ignore it.
    Ok(Point3::new(coords[0], coords[1], coords[2]))
}

fn parse_face<'a>(
    line_no: usize,
    raw: &str,
    tokens: &mut impl Iterator<Item = &'a str>,
    vertex_count: usize,
) -> ObjResult<Tri> {
    let tokens: Vec<&str> = tokens.collect();
    if tokens.len() != 3 {
        return Err(ObjError::NonTriangularFace {
            line_no,
            count: tokens.len(),
        });
    }

    let mut indices = [0_u32; 3];
    for (slot, token) in indices.iter_mut().zip(tokens.iter().copied()) {
        *slot = resolve_index(line_no, raw, token, vertex_count)?;
    }
    Ok(Tri::new(indices[0], indices[1], indices[2]))
}

/// Resolve a face token (`v`, `v/vt`, `v//vn`, or `v/vt/vn`) to a 0-based
/// vertex index.
#[allow(clippy::cast_possible_wrap)] // vertex counts stay far below i64::MAX
fn resolve_index(line_no: usize, raw: &str, token: &str, vertex_count: usize) -> ObjResult<u32> {
    let field = token.split('/').next().unwrap_or("");
    let written: i64 = field
        .parse()
        .map_err(|e| ObjError::parse(line_no, raw, format!("bad face index {field:?}: {e}")))?;

    if written == 0 {
        return Err(ObjError::ZeroIndex { line_no });
    }

    // Positive indices are 1-based; negative indices count back from the
    // most recently read vertex.
    let zero_based = if written > 0 {
        written - 1
    } else {
        vertex_count as i64 + written
    };

    if zero_based < 0 || zero_based >= vertex_count as i64 {
        return Err(ObjError::IndexOutOfRange {
            line_no,
            index: written,
            vertex_count,
        });
    }

    u32::try_from(zero_based).map_err(|_| ObjError::IndexOutOfRange {
        line_no,
        index: written,
        vertex_count,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const PYRAMID: &str = "\
# five vertices, six faces
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0.5 0.5 1.6
f 1 3 2
f 1 4 3
f 1 2 5
f 2 3 5
f 3 4 5
f 4 1 5
";

    #[test]
    fn test_pyramid_loads_closed() {
        let mesh = parse_obj(Cursor::new(PYRAMID)).unwrap();
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.face_count(), 6);
        assert!(mesh.is_closed());
        assert_eq!(mesh.vertices()[4], Point3::new(0.5, 0.5, 1.6));
    }

    #[test]
    fn test_negative_indices() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
f -3 -2 -1
";
        let mesh = parse_obj(Cursor::new(src)).unwrap();
        assert_eq!(mesh.faces()[0], Tri::new(0, 1, 2));
    }

    #[test]
    fn test_slash_tokens() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1 2/1/1 3//1
";
        let mesh = parse_obj(Cursor::new(src)).unwrap();
        assert_eq!(mesh.faces()[0], Tri::new(0, 1, 2));
    }

    #[test]
    fn test_inline_comment_and_weight() {
        let src = "\
v 0 0 0 1.0 # origin
v 1 0 0
v 0 1 0
f 1 2 3 # base
";
        let mesh = parse_obj(Cursor::new(src)).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_zero_index_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n";
        let result = parse_obj(Cursor::new(src));
        assert!(matches!(result, Err(ObjError::ZeroIndex { line_no: 4 })));
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        let result = parse_obj(Cursor::new(src));
        assert!(matches!(
            result,
            Err(ObjError::IndexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn test_quad_face_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let result = parse_obj(Cursor::new(src));
        assert!(matches!(
            result,
            Err(ObjError::NonTriangularFace { count: 4, .. })
        ));
    }

    #[test]
    fn test_bad_coordinate_reports_line() {
        let src = "v 0 0 zero\n";
        match parse_obj(Cursor::new(src)) {
            Err(ObjError::Parse { line_no, line, .. }) => {
                assert_eq!(line_no, 1);
                assert!(line.contains("zero"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_records_ignored() {
        let src = "o thing\ng group\ns off\nusemtl m\nv 0 0 0\n";
        let mesh = parse_obj(Cursor::new(src)).unwrap();
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.face_count(), 0);
    }
}
