//! Face-culled surface meshing.

use hashbrown::{HashMap, HashSet};
use mesh_types::{Aabb, CoordSystem, Point3, Tri, TriMesh, Vector3};
use tracing::{debug, info};

use crate::error::{MesherError, MesherResult};
use crate::morton::morton_encode;

/// Quantization tolerance when snapping origins to the lattice.
const QUANT_EPS: f32 = 1e-6;

/// The six cardinal neighbour offsets, paired with the face they expose.
const DIRECTIONS: [[i64; 3]; 6] = [
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// Corner offsets of each face quad, ordered counter-clockwise viewed
/// from outside (right-handed). Rows follow [`DIRECTIONS`].
const FACE_CORNERS: [[[u32; 3]; 4]; 6] = [
    [[1, 0, 0], [1, 1, 0], [1, 1, 1], [1, 0, 1]], // +x
    [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]], // -x
    [[0, 1, 0], [0, 1, 1], [1, 1, 1], [1, 1, 0]], // +y
    [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]], // -y
    [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]], // +z
    [[0, 0, 0], [0, 1, 0], [1, 1, 0], [1, 0, 0]], // -z
];

/// Reconstructs triangle meshes from voxel sets.
///
/// Voxel origins are snapped to a lattice anchored at their true
/// minimum, indexed in a Morton-coded occupancy set, and every face
/// whose 6-neighbour is absent becomes a quad; faces between occupied
/// voxels are culled. Vertices on shared corners are welded, so the
/// result of a uniform set is a closed surface.
///
/// # Example
///
/// ```
/// use mesh_types::{CoordSystem, Point3, Vector3};
/// use voxel_mesher::DiscreteMesher;
///
/// let mesher = DiscreteMesher::new(CoordSystem::RightHanded);
/// let mesh = mesher
///     .generate_mesh(&[Point3::new(0.0, 0.0, 0.0)], &Vector3::new(1.0, 1.0, 1.0))
///     .unwrap();
///
/// assert_eq!(mesh.vertex_count(), 8);
/// assert_eq!(mesh.face_count(), 12);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DiscreteMesher {
    coord_system: CoordSystem,
}

impl DiscreteMesher {
    /// Creates a mesher emitting triangles with the given handedness.
    #[must_use]
    pub const fn new(coord_system: CoordSystem) -> Self {
        Self { coord_system }
    }

    /// Meshes a voxel set with a common size, culling internal faces.
    ///
    /// # Errors
    ///
    /// Returns [`MesherError::EmptyInput`] for an empty set and
    /// [`MesherError::InvalidVoxelSize`] for bad sizes.
    pub fn generate_mesh(
        &self,
        origins: &[Point3<f32>],
        voxel_size: &Vector3<f32>,
    ) -> MesherResult<TriMesh> {
        if origins.is_empty() {
            return Err(MesherError::EmptyInput);
        }
        check_size(voxel_size)?;

        info!(voxels = origins.len(), "meshing voxel set");

        // Snap origins to a non-negative integer lattice anchored at the
        // componentwise minimum.
        let min = true_min(origins);
        let inv = Vector3::new(
            1.0 / voxel_size.x,
            1.0 / voxel_size.y,
            1.0 / voxel_size.z,
        );

        let mut occupied: HashSet<u64> = HashSet::with_capacity(origins.len());
        let mut cells: Vec<[u32; 3]> = Vec::with_capacity(origins.len());
        for origin in origins {
            let cell = quantize(origin, &min, &inv);
            if occupied.insert(morton_encode(cell[0], cell[1], cell[2])) {
                cells.push(cell);
            }
        }
        debug!(unique = cells.len(), "indexed voxel cells");

        // Emit a quad for every face whose neighbour is missing.
        let mut vertices: Vec<Point3<f32>> = Vec::new();
        let mut corner_index: HashMap<[u32; 3], u32> = HashMap::new();
        let mut faces: Vec<Tri> = Vec::new();

        for cell in &cells {
            for (direction, corners) in DIRECTIONS.iter().zip(&FACE_CORNERS) {
                if has_neighbour(&occupied, cell, direction) {
                    continue;
                }

                let mut quad = [0_u32; 4];
                for (slot, offset) in quad.iter_mut().zip(corners) {
                    let corner = [
                        cell[0] + offset[0],
                        cell[1] + offset[1],
                        cell[2] + offset[2],
                    ];
                    *slot = weld(&mut corner_index, &mut vertices, corner, &min, voxel_size);
                }

                for (a, b, c) in [(quad[0], quad[1], quad[2]), (quad[0], quad[2], quad[3])] {
                    let (a, b, c) = self.coord_system.wind(a, b, c);
                    faces.push(Tri::new(a, b, c));
                }
            }
        }

        debug!(
            vertices = vertices.len(),
            faces = faces.len(),
            "generated culled surface"
        );
        Ok(TriMesh::new(vertices, faces)?)
    }

    /// Meshes a voxel set with per-voxel sizes into one mesh.
    ///
    /// When all sizes are equal this is the culled path of
    /// [`DiscreteMesher::generate_mesh`]; otherwise no neighbour
    /// relation exists on a common lattice, culling is disabled, and six
    /// faces are emitted per voxel.
    ///
    /// # Errors
    ///
    /// Returns [`MesherError::LengthMismatch`] when `sizes` and
    /// `origins` disagree, plus the [`DiscreteMesher::generate_mesh`]
    /// errors.
    pub fn generate_mesh_sized(
        &self,
        origins: &[Point3<f32>],
        sizes: &[Vector3<f32>],
    ) -> MesherResult<TriMesh> {
        if origins.is_empty() {
            return Err(MesherError::EmptyInput);
        }
        if sizes.len() != origins.len() {
            return Err(MesherError::LengthMismatch {
                origins: origins.len(),
                sizes: sizes.len(),
            });
        }

        let uniform = sizes
            .windows(2)
            .all(|pair| (pair[0] - pair[1]).amax() <= QUANT_EPS);
        if uniform {
            return self.generate_mesh(origins, &sizes[0]);
        }

        debug!("non-uniform voxel sizes; face culling disabled");
        let mut boxes = origins.iter().zip(sizes);
        // Non-empty by the check above.
        let mut mesh = match boxes.next() {
            Some((origin, size)) => {
                check_size(size)?;
                Aabb::new(*origin, origin + size).to_mesh(self.coord_system)
            }
            None => return Err(MesherError::EmptyInput),
        };
        for (origin, size) in boxes {
            check_size(size)?;
            mesh.merge(&Aabb::new(*origin, origin + size).to_mesh(self.coord_system));
        }
        Ok(mesh)
    }

    /// One standalone box mesh per voxel (no culling, no welding).
    ///
    /// Debugging aid: each voxel becomes an independent 8-vertex,
    /// 12-triangle box.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DiscreteMesher::generate_mesh_sized`].
    pub fn generate_meshes(
        &self,
        origins: &[Point3<f32>],
        sizes: &[Vector3<f32>],
    ) -> MesherResult<Vec<TriMesh>> {
        if origins.is_empty() {
            return Err(MesherError::EmptyInput);
        }
        if sizes.len() != origins.len() {
            return Err(MesherError::LengthMismatch {
                origins: origins.len(),
                sizes: sizes.len(),
            });
        }
        origins
            .iter()
            .zip(sizes)
            .map(|(origin, size)| {
                check_size(size)?;
                Ok(Aabb::new(*origin, origin + size).to_mesh(self.coord_system))
            })
            .collect()
    }

    /// The world-space box of every voxel.
    ///
    /// # Errors
    ///
    /// Returns [`MesherError::LengthMismatch`] when `sizes` and
    /// `origins` disagree.
    pub fn voxel_bounds(
        origins: &[Point3<f32>],
        sizes: &[Vector3<f32>],
    ) -> MesherResult<Vec<Aabb>> {
        if sizes.len() != origins.len() {
            return Err(MesherError::LengthMismatch {
                origins: origins.len(),
                sizes: sizes.len(),
            });
        }
        Ok(origins
            .iter()
            .zip(sizes)
            .map(|(origin, size)| Aabb::new(*origin, origin + size))
            .collect())
    }

    /// The world-space box of every voxel for a common size.
    #[must_use]
    pub fn voxel_bounds_uniform(origins: &[Point3<f32>], size: &Vector3<f32>) -> Vec<Aabb> {
        origins
            .iter()
            .map(|origin| Aabb::new(*origin, origin + size))
            .collect()
    }
}

fn check_size(size: &Vector3<f32>) -> MesherResult<()> {
    if size.iter().any(|&s| s <= 0.0 || !s.is_finite()) {
        return Err(MesherError::InvalidVoxelSize {
            x: size.x,
            y: size.y,
            z: size.z,
        });
    }
    Ok(())
}

fn true_min(origins: &[Point3<f32>]) -> Point3<f32> {
    let mut min = origins[0];
    for origin in &origins[1..] {
        min = Point3::new(min.x.min(origin.x), min.y.min(origin.y), min.z.min(origin.z));
    }
    min
}

/// Snaps an origin to its non-negative lattice cell.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(origin: &Point3<f32>, min: &Point3<f32>, inv: &Vector3<f32>) -> [u32; 3] {
    [
        (((origin.x - min.x) * inv.x) + QUANT_EPS).round().max(0.0) as u32,
        (((origin.y - min.y) * inv.y) + QUANT_EPS).round().max(0.0) as u32,
        (((origin.z - min.z) * inv.z) + QUANT_EPS).round().max(0.0) as u32,
    ]
}

fn has_neighbour(occupied: &HashSet<u64>, cell: &[u32; 3], direction: &[i64; 3]) -> bool {
    let neighbour = [
        i64::from(cell[0]) + direction[0],
        i64::from(cell[1]) + direction[1],
        i64::from(cell[2]) + direction[2],
    ];
    // Out-of-range neighbours count as absent.
    if neighbour.iter().any(|&c| c < 0) {
        return false;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    occupied.contains(&morton_encode(
        neighbour[0] as u32,
        neighbour[1] as u32,
        neighbour[2] as u32,
    ))
}

/// Index of a lattice corner's vertex, inserting it on first use.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn weld(
    corner_index: &mut HashMap<[u32; 3], u32>,
    vertices: &mut Vec<Point3<f32>>,
    corner: [u32; 3],
    min: &Point3<f32>,
    size: &Vector3<f32>,
) -> u32 {
    *corner_index.entry(corner).or_insert_with(|| {
        let index = vertices.len() as u32;
        vertices.push(Point3::new(
            corner[0] as f32 * size.x + min.x,
            corner[1] as f32 * size.y + min.y,
            corner[2] as f32 * size.z + min.z,
        ));
        index
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit() -> Vector3<f32> {
        Vector3::new(1.0, 1.0, 1.0)
    }

    #[test]
    fn test_single_voxel_is_a_box() {
        let mesher = DiscreteMesher::new(CoordSystem::RightHanded);
        let mesh = mesher
            .generate_mesh(&[Point3::new(2.0, -1.0, 0.5)], &unit())
            .unwrap();

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
        assert!(mesh.is_closed());

        let bounds = mesh.bounds();
        assert_relative_eq!(bounds.min.x, 2.0);
        assert_relative_eq!(bounds.max.y, 0.0);
        assert_relative_eq!(bounds.max.z, 1.5);
    }

    #[test]
    fn test_adjacent_voxels_cull_shared_face() {
        let mesher = DiscreteMesher::new(CoordSystem::RightHanded);
        let origins = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let mesh = mesher.generate_mesh(&origins, &unit()).unwrap();

        // 2 boxes * 12 triangles, minus 2 per culled face (both sides).
        assert_eq!(mesh.face_count(), 20);
        assert_eq!(mesh.vertex_count(), 12); // welded shared corners
        assert!(mesh.is_closed());
    }

    #[test]
    fn test_2x2x2_block_surface_only() {
        let mesher = DiscreteMesher::new(CoordSystem::RightHanded);
        let mut origins = Vec::new();
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..2 {
                    #[allow(clippy::cast_precision_loss)]
                    origins.push(Point3::new(x as f32, y as f32, z as f32));
                }
            }
        }
        let mesh = mesher.generate_mesh(&origins, &unit()).unwrap();

        // The block's surface is 6 faces of 2x2 quads: 24 quads total.
        assert_eq!(mesh.face_count(), 48);
        assert!(mesh.is_closed());

        let bounds = mesh.bounds();
        assert_relative_eq!(bounds.min.x, 0.0);
        assert_relative_eq!(bounds.max.x, 2.0);
    }

    #[test]
    fn test_duplicate_origins_collapse() {
        let mesher = DiscreteMesher::new(CoordSystem::RightHanded);
        let origins = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            // Sub-half-voxel noise lands in the same cell.
            Point3::new(1e-4, -1e-4, 0.0),
        ];
        let mesh = mesher.generate_mesh(&origins, &unit()).unwrap();
        assert_eq!(mesh.face_count(), 12);
    }

    #[test]
    fn test_left_handed_flips_winding() {
        let origins = [Point3::new(0.0, 0.0, 0.0)];
        let rh = DiscreteMesher::new(CoordSystem::RightHanded)
            .generate_mesh(&origins, &unit())
            .unwrap();
        let lh = DiscreteMesher::new(CoordSystem::LeftHanded)
            .generate_mesh(&origins, &unit())
            .unwrap();

        assert_eq!(rh.face_count(), lh.face_count());
        for (a, b) in rh.faces().iter().zip(lh.faces()) {
            assert_eq!(a.a, b.a);
            assert_eq!(a.b, b.c);
            assert_eq!(a.c, b.b);
        }
        assert!(lh.is_closed());
    }

    #[test]
    fn test_anisotropic_common_size() {
        let mesher = DiscreteMesher::new(CoordSystem::RightHanded);
        let size = Vector3::new(1.0, 0.5, 2.0);
        let origins = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.5, 0.0)];
        let mesh = mesher.generate_mesh(&origins, &size).unwrap();

        // Adjacent along y: shared face culled.
        assert_eq!(mesh.face_count(), 20);
        let bounds = mesh.bounds();
        assert_relative_eq!(bounds.max.y, 1.0);
        assert_relative_eq!(bounds.max.z, 2.0);
    }

    #[test]
    fn test_non_uniform_sizes_disable_culling() {
        let mesher = DiscreteMesher::new(CoordSystem::RightHanded);
        let origins = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let sizes = [Vector3::new(1.0, 1.0, 1.0), Vector3::new(0.5, 0.5, 0.5)];
        let mesh = mesher.generate_mesh_sized(&origins, &sizes).unwrap();

        assert_eq!(mesh.face_count(), 24); // six faces per voxel
    }

    #[test]
    fn test_uniform_sized_path_delegates_to_culling() {
        let mesher = DiscreteMesher::new(CoordSystem::RightHanded);
        let origins = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let sizes = [unit(), unit()];
        let mesh = mesher.generate_mesh_sized(&origins, &sizes).unwrap();
        assert_eq!(mesh.face_count(), 20);
    }

    #[test]
    fn test_generate_meshes_one_box_each() {
        let mesher = DiscreteMesher::new(CoordSystem::RightHanded);
        let origins = [Point3::new(0.0, 0.0, 0.0), Point3::new(5.0, 0.0, 0.0)];
        let sizes = [unit(), Vector3::new(2.0, 2.0, 2.0)];
        let meshes = mesher.generate_meshes(&origins, &sizes).unwrap();

        assert_eq!(meshes.len(), 2);
        for mesh in &meshes {
            assert_eq!(mesh.face_count(), 12);
            assert!(mesh.is_closed());
        }
        assert_relative_eq!(meshes[1].bounds().max.x, 7.0);
    }

    #[test]
    fn test_voxel_bounds() {
        let origins = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0)];
        let sizes = [Vector3::new(1.0, 1.0, 1.0), Vector3::new(0.5, 0.5, 0.5)];
        let bounds = DiscreteMesher::voxel_bounds(&origins, &sizes).unwrap();

        assert_eq!(bounds.len(), 2);
        assert_relative_eq!(bounds[1].max.x, 1.5);

        let uniform = DiscreteMesher::voxel_bounds_uniform(&origins, &Vector3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(uniform[1].max.z, 4.0);
    }

    #[test]
    fn test_empty_input_rejected() {
        let mesher = DiscreteMesher::new(CoordSystem::RightHanded);
        assert!(matches!(
            mesher.generate_mesh(&[], &unit()),
            Err(MesherError::EmptyInput)
        ));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mesher = DiscreteMesher::new(CoordSystem::RightHanded);
        let origins = [Point3::new(0.0, 0.0, 0.0)];
        assert!(matches!(
            mesher.generate_meshes(&origins, &[]),
            Err(MesherError::LengthMismatch {
                origins: 1,
                sizes: 0
            })
        ));
    }

    #[test]
    fn test_invalid_size_rejected() {
        let mesher = DiscreteMesher::new(CoordSystem::RightHanded);
        let origins = [Point3::new(0.0, 0.0, 0.0)];
        assert!(matches!(
            mesher.generate_mesh(&origins, &Vector3::new(0.0, 1.0, 1.0)),
            Err(MesherError::InvalidVoxelSize { .. })
        ));
    }
}
