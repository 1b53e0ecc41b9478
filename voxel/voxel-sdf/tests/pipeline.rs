//! End-to-end pipeline tests: rasterize -> classify -> signed field.

#![allow(clippy::unwrap_used)]

use std::f32::consts::PI;

use approx::assert_relative_eq;
use mesh_types::{Aabb, CoordSystem, Point3, Tri, TriMesh, Vector3};
use voxel_grid::{Occupancy, OccupancyGrid};
use voxel_rasterize::DenseRasterizer;
use voxel_sdf::DistanceGrid;

/// Watertight UV sphere centered at the origin.
fn uv_sphere(radius: f32, rings: usize, segments: usize) -> TriMesh {
    assert!(rings >= 3 && segments >= 3);

    let mut vertices = vec![Point3::new(0.0, 0.0, radius)]; // north pole
    for ring in 1..rings {
        let theta = PI * ring as f32 / rings as f32;
        let (sin_t, cos_t) = theta.sin_cos();
        for segment in 0..segments {
            let phi = 2.0 * PI * segment as f32 / segments as f32;
            let (sin_p, cos_p) = phi.sin_cos();
            vertices.push(Point3::new(
                radius * sin_t * cos_p,
                radius * sin_t * sin_p,
                radius * cos_t,
            ));
        }
    }
    let south = vertices.len() as u32;
    vertices.push(Point3::new(0.0, 0.0, -radius));

    let ring_start = |ring: usize| 1 + (ring - 1) * segments;
    let mut faces = Vec::new();

    // Top cap.
    for j in 0..segments {
        let a = (ring_start(1) + j) as u32;
        let b = (ring_start(1) + (j + 1) % segments) as u32;
        faces.push(Tri::new(0, a, b));
    }
    // Quad strips between rings.
    for ring in 1..rings - 1 {
        for j in 0..segments {
            let a = (ring_start(ring) + j) as u32;
            let b = (ring_start(ring) + (j + 1) % segments) as u32;
            let c = (ring_start(ring + 1) + (j + 1) % segments) as u32;
            let d = (ring_start(ring + 1) + j) as u32;
            faces.push(Tri::new(a, c, b));
            faces.push(Tri::new(a, d, c));
        }
    }
    // Bottom cap.
    for j in 0..segments {
        let a = (ring_start(rings - 1) + j) as u32;
        let b = (ring_start(rings - 1) + (j + 1) % segments) as u32;
        faces.push(Tri::new(south, b, a));
    }

    TriMesh::new(vertices, faces).unwrap()
}

#[test]
fn sphere_fixture_is_watertight() {
    let sphere = uv_sphere(1.0, 12, 16);
    assert!(sphere.is_closed());
    assert_relative_eq!(sphere.surface_area(), 4.0 * PI, max_relative = 0.1);
}

#[test]
fn flood_fill_on_rasterized_sphere() {
    let sphere = uv_sphere(1.0, 12, 16);

    // 32^3 grid over [-2, 2]^3, centered at the origin.
    let bounds = Aabb::new(Point3::new(-2.0, -2.0, -2.0), Point3::new(2.0, 2.0, 2.0));
    let size = Vector3::new(0.125, 0.125, 0.125);
    let mut grid = OccupancyGrid::from_bounds(&bounds, &size).unwrap();
    assert_eq!(grid.meta().dims(), [32, 32, 32]);

    DenseRasterizer::default()
        .rasterize_mesh(&mut grid, &sphere, false)
        .unwrap();
    let boundary_before = grid.count_state(Occupancy::Boundary);
    assert!(boundary_before > 0);

    grid.classify_interior().unwrap();

    // The cell containing the origin is enclosed.
    assert_eq!(grid.get(0, 0, 0).unwrap(), Occupancy::Inside);
    // Every cell on the six outer faces is outside.
    let [min_x, min_y, min_z] = grid.meta().min_index();
    let [nx, ny, nz] = grid.meta().dims();
    for z in min_z..min_z + nz {
        for y in min_y..min_y + ny {
            for x in min_x..min_x + nx {
                let on_face = x == min_x
                    || x == min_x + nx - 1
                    || y == min_y
                    || y == min_y + ny - 1
                    || z == min_z
                    || z == min_z + nz - 1;
                if on_face {
                    assert_eq!(grid.get(x, y, z).unwrap(), Occupancy::Outside);
                }
            }
        }
    }
    // Flood fill never touches boundary cells.
    assert_eq!(grid.count_state(Occupancy::Boundary), boundary_before);
}

#[test]
fn sphere_signed_field_tracks_radius() {
    let sphere = uv_sphere(1.0, 16, 24);
    let bounds = Aabb::new(Point3::new(-2.0, -2.0, -2.0), Point3::new(2.0, 2.0, 2.0));
    let size = Vector3::new(0.125, 0.125, 0.125);
    let mut grid = OccupancyGrid::from_bounds(&bounds, &size).unwrap();

    DenseRasterizer::default()
        .rasterize_mesh(&mut grid, &sphere, true)
        .unwrap();

    let sdf = DistanceGrid::from_occupancy(&grid, true).unwrap();

    // Near the center: roughly -1 (one radius inside the surface).
    let center = sdf.value_at(&Point3::new(0.0, 0.0, 0.0));
    assert!(center < -0.6, "center should be well inside, got {center}");

    // Near a domain corner: positive, roughly |corner| - radius.
    let corner = sdf.value_at(&Point3::new(1.9, 1.9, 1.9));
    assert!(corner > 1.0, "corner should be well outside, got {corner}");

    // The normal at a point on the +x axis points along +x.
    let normal = sdf
        .sample_normal(&Point3::new(1.5, 0.0, 0.0), true)
        .unwrap();
    assert!(normal.x > 0.8, "normal should point outward, got {normal:?}");
}

#[test]
fn unit_cube_signed_field() {
    // Interior of the unit cube [-0.5, 0.5]^3 on a 4^3 unit lattice over
    // [-2, 2]^3: the 8 cells whose centers touch the cube are inside.
    let bounds = Aabb::new(Point3::new(-2.0, -2.0, -2.0), Point3::new(2.0, 2.0, 2.0));
    let size = Vector3::new(1.0, 1.0, 1.0);
    let grid = OccupancyGrid::from_bounds(&bounds, &size).unwrap();
    let meta = *grid.meta();

    let mut mask = vec![0_u8; meta.cell_count()];
    for (linear, flag) in mask.iter_mut().enumerate() {
        let center = meta.cell_center(meta.delinearize(linear));
        let inside = center.x.abs() <= 0.5 && center.y.abs() <= 0.5 && center.z.abs() <= 0.5;
        *flag = u8::from(inside);
    }

    let mut sdf = DistanceGrid::new(meta);
    sdf.build_from_binary_mask(&mask, false).unwrap();

    // The cell containing the origin sits one cell from the background.
    let at_origin = sdf.value_at(&Point3::new(0.0, 0.0, 0.0));
    assert_relative_eq!(at_origin, -1.0, epsilon = 1e-5);

    // The far corner cell is sqrt(3) cells from the nearest inside cell.
    let at_corner = sdf.value_at(&Point3::new(2.0, 2.0, 2.0));
    assert_relative_eq!(at_corner, 3.0_f32.sqrt(), epsilon = 1e-5);

    // Sign law: negative exactly on mask cells.
    for (linear, &flag) in mask.iter().enumerate() {
        let value = sdf.get_linear(linear).unwrap();
        if flag == 1 {
            assert!(value < 0.0);
        } else {
            assert!(value > 0.0);
        }
    }
}

#[test]
fn cube_mesh_round_trip_through_pipeline() {
    // Rasterize a closed box mesh, classify, build the field, and check
    // the zero crossing sits near the box surface.
    let cube = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0))
        .to_mesh(CoordSystem::RightHanded);
    assert!(cube.is_closed());

    let bounds = Aabb::new(Point3::new(-2.0, -2.0, -2.0), Point3::new(2.0, 2.0, 2.0));
    let size = Vector3::new(0.25, 0.25, 0.25);
    let mut grid = OccupancyGrid::from_bounds(&bounds, &size).unwrap();

    DenseRasterizer::default()
        .rasterize_mesh(&mut grid, &cube, true)
        .unwrap();
    let sdf = DistanceGrid::from_occupancy(&grid, false).unwrap();

    // Boundary cells are exactly zero.
    for (linear, &cell) in grid.cells().iter().enumerate() {
        if cell == Occupancy::Boundary {
            assert_eq!(sdf.get_linear(linear).unwrap(), 0.0);
        }
    }

    // Inside the box the field is negative, outside positive.
    assert!(sdf.value_at(&Point3::new(0.0, 0.0, 0.0)) < 0.0);
    assert!(sdf.value_at(&Point3::new(1.8, 1.8, 1.8)) > 0.0);
}
