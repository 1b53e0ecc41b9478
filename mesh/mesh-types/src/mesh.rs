//! Indexed triangle mesh.

use std::sync::OnceLock;

use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, MeshResult};
use crate::{Aabb, Tri};

/// An indexed triangle mesh.
///
/// Stores vertices and faces separately, with faces referencing vertices by
/// index. Construction validates every face (indices in range, no repeated
/// index) and records whether the surface is **closed** (watertight): every
/// undirected edge is used by exactly two faces, once in each direction.
///
/// # Winding Order
///
/// Faces use counter-clockwise winding viewed from outside, so normals point
/// outward by the right-hand rule.
///
/// # Example
///
/// ```
/// use mesh_types::{TriMesh, Tri, Point3};
///
/// let mesh = TriMesh::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![Tri::new(0, 1, 2)],
/// )
/// .unwrap();
///
/// assert_eq!(mesh.face_count(), 1);
/// assert!(!mesh.is_closed()); // a lone triangle has open edges
/// ```
#[derive(Debug, Clone, Default)]
pub struct TriMesh {
    vertices: Vec<Point3<f32>>,
    faces: Vec<Tri>,
    closed: bool,
    bounds: OnceLock<Aabb>,
}

impl TriMesh {
    /// Create a mesh from vertices and faces, deriving the `closed` flag.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::IndexOutOfRange`] if a face references a missing
    /// vertex, or [`MeshError::DegenerateFace`] if a face repeats an index.
    pub fn new(vertices: Vec<Point3<f32>>, faces: Vec<Tri>) -> MeshResult<Self> {
        validate_faces(&vertices, &faces)?;
        let closed = is_watertight(&faces);
        Ok(Self {
            vertices,
            faces,
            closed,
            bounds: OnceLock::new(),
        })
    }

    /// Create a mesh with a caller-supplied `closed` flag.
    ///
    /// Skips the watertight derivation; faces are still validated. Use this
    /// when the topology is known by construction.
    ///
    /// # Errors
    ///
    /// Same validation errors as [`TriMesh::new`].
    pub fn with_closed(
        vertices: Vec<Point3<f32>>,
        faces: Vec<Tri>,
        closed: bool,
    ) -> MeshResult<Self> {
        validate_faces(&vertices, &faces)?;
        Ok(Self {
            vertices,
            faces,
            closed,
            bounds: OnceLock::new(),
        })
    }

    /// Internal constructor for geometry whose validity is structural.
    pub(crate) fn from_validated_parts(
        vertices: Vec<Point3<f32>>,
        faces: Vec<Tri>,
        closed: bool,
    ) -> Self {
        Self {
            vertices,
            faces,
            closed,
            bounds: OnceLock::new(),
        }
    }

    /// Whether the mesh is watertight.
    #[inline]
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// The vertex positions.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    /// The triangle faces.
    #[inline]
    #[must_use]
    pub fn faces(&self) -> &[Tri] {
        &self.faces
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// `true` if the mesh has no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// The three corner positions of face `index`, or `None` out of range.
    #[must_use]
    pub fn triangle(&self, index: usize) -> Option<[Point3<f32>; 3]> {
        self.faces.get(index).map(|tri| {
            [
                self.vertices[tri.a as usize],
                self.vertices[tri.b as usize],
                self.vertices[tri.c as usize],
            ]
        })
    }

    /// Iterator over the corner positions of every face.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        self.faces.iter().map(|tri| {
            [
                self.vertices[tri.a as usize],
                self.vertices[tri.b as usize],
                self.vertices[tri.c as usize],
            ]
        })
    }

    /// The bounding box of all vertices.
    ///
    /// Lazily computed and cached; mutating operations invalidate the cache.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        *self
            .bounds
            .get_or_init(|| Aabb::from_points(self.vertices.iter()))
    }

    /// Drop the cached bounding box so the next [`TriMesh::bounds`] call
    /// recomputes it.
    pub fn invalidate_bounds(&mut self) {
        self.bounds = OnceLock::new();
    }

    /// Iterator over `(face_index, face_bounds)` for every face.
    pub fn triangle_bounds(&self) -> impl Iterator<Item = (usize, Aabb)> + '_ {
        self.triangles()
            .enumerate()
            .map(|(i, [a, b, c])| (i, Aabb::from_points([a, b, c].iter())))
    }

    /// Translate every vertex by `offset`.
    pub fn translate(&mut self, offset: &Vector3<f32>) {
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
        self.invalidate_bounds();
    }

    /// Scale every vertex uniformly around the origin.
    pub fn scale(&mut self, factor: f32) {
        for vertex in &mut self.vertices {
            vertex.coords *= factor;
        }
        self.invalidate_bounds();
    }

    /// Append another mesh, offsetting its face indices.
    ///
    /// The result is closed only if both inputs were closed.
    #[allow(clippy::cast_possible_truncation)] // u32 indices cap mesh size by design
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|tri| Tri::new(tri.a + offset, tri.b + offset, tri.c + offset)),
        );
        self.closed = self.closed && other.closed;
        self.invalidate_bounds();
    }

    /// Total surface area of all faces.
    #[must_use]
    pub fn surface_area(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| (b - a).cross(&(c - a)).norm() * 0.5)
            .sum()
    }

    /// Reverse the winding of every face.
    pub fn flip_windings(&mut self) {
        for face in &mut self.faces {
            *face = face.flipped();
        }
    }
}

/// Validate that every face is in range and non-degenerate.
fn validate_faces(vertices: &[Point3<f32>], faces: &[Tri]) -> MeshResult<()> {
    let vertex_count = vertices.len();
    for (i, tri) in faces.iter().enumerate() {
        for index in tri.indices() {
            if index as usize >= vertex_count {
                return Err(MeshError::IndexOutOfRange {
                    face: i,
                    index,
                    vertex_count,
                });
            }
        }
        if tri.a == tri.b || tri.b == tri.c || tri.a == tri.c {
            return Err(MeshError::DegenerateFace {
                face: i,
                a: tri.a,
                b: tri.b,
                c: tri.c,
            });
        }
    }
    Ok(())
}

/// Watertight test: every undirected edge must be used exactly twice,
/// once in each direction.
///
/// Open edges, edges shared by more than two faces, and same-direction
/// duplicates (inconsistent winding) all fail the test.
fn is_watertight(faces: &[Tri]) -> bool {
    if faces.is_empty() {
        return false;
    }

    // (lo, hi) -> (count of lo->hi uses, count of hi->lo uses)
    let mut edge_uses: HashMap<(u32, u32), (u32, u32)> = HashMap::new();
    for tri in faces {
        for (from, to) in tri.edges() {
            let entry = if from < to {
                let e = edge_uses.entry((from, to)).or_insert((0, 0));
                &mut e.0
            } else {
                let e = edge_uses.entry((to, from)).or_insert((0, 0));
                &mut e.1
            };
            *entry += 1;
        }
    }

    edge_uses.values().all(|&counts| counts == (1, 1))
}
