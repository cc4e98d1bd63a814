//! End-to-end tests: extraction through refinement.

use contour_extract::{extract_contour, make_unique, orient_triangles, VoxelVolume};
use contour_mesh::{Mesh, Point3};
use contour_types::TriangleSoup;

fn ball_volume(side: usize, radius: f64) -> Vec<i32> {
    let center = Point3::new(
        (side - 1) as f64 / 2.0,
        (side - 1) as f64 / 2.0,
        (side - 1) as f64 / 2.0,
    );
    let mut values = Vec::with_capacity(side * side * side);
    for z in 0..side {
        for y in 0..side {
            for x in 0..side {
                let p = Point3::new(x as f64, y as f64, z as f64);
                values.push(i32::from((p - center).norm() < radius));
            }
        }
    }
    values
}

fn extracted_sphere(side: usize, radius: f64) -> Mesh {
    let values = ball_volume(side, radius);
    let volume = VoxelVolume::new(side, side, side, &values).unwrap();
    let mut soup = extract_contour(&volume, 0.5).unwrap();
    make_unique(&mut soup);
    orient_triangles(&mut soup, &volume, false);
    Mesh::from_soup(&soup).unwrap()
}

#[test]
fn extracted_sphere_stitches_closed() {
    let mesh = extracted_sphere(8, 2.5);
    assert!(mesh.face_count() > 0);
    for (edge, _) in mesh.half_edges() {
        assert!(!mesh.is_boundary(edge));
    }
    assert_eq!(mesh.to_soup().euler_characteristic(), 2);
}

#[test]
fn refinement_preserves_the_surface_topology() {
    let mut mesh = extracted_sphere(8, 2.5);

    let report = mesh.check_topology().unwrap();
    assert_eq!(report.inconsistent_windings, 0);
    assert_eq!(report.duplicate_faces_found, 0);

    let created = mesh.subdivide(0.9).unwrap();
    assert!(created > 0);
    assert_eq!(mesh.to_soup().euler_characteristic(), 2);

    let collapses = mesh.edge_melt(0.4).unwrap();
    // Collapses preserve the Euler characteristic regardless of count
    let _ = collapses;
    assert_eq!(mesh.to_soup().euler_characteristic(), 2);

    let after = mesh.check_topology().unwrap();
    assert_eq!(after.inconsistent_windings, 0);
    assert_eq!(after.face_count, mesh.face_count());
}

#[test]
fn check_topology_reaches_a_fixed_point() {
    let mut mesh = extracted_sphere(8, 2.5);
    mesh.check_topology().unwrap();
    let second = mesh.check_topology().unwrap();
    assert!(!second.had_changes());
}

#[test]
fn relaxation_forces_stay_balanced() {
    let mut mesh = extracted_sphere(8, 2.5);
    mesh.compute_bins(false, 0.8);
    mesh.compute_bins(true, 0.8);

    // Action equals reaction pairwise, so the net force is zero
    let net = mesh
        .vertices()
        .fold(Point3::origin(), |acc, (_, v)| acc + v.force);
    assert!(net.coords.norm() < 1e-9);

    mesh.clear_forces();
    assert!(mesh.vertices().all(|(_, v)| v.force.norm() == 0.0));
}

#[test]
fn open_patch_keeps_its_boundary_through_refinement() {
    let soup = TriangleSoup::from_parts(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    );
    let mut mesh = Mesh::from_soup(&soup).unwrap();
    let created = mesh.subdivide(1.5).unwrap();

    // One pass for the rim and the diagonal, one for the interior
    // chords, then the stall check ends the loop
    assert_eq!(created, 9);
    assert_eq!(mesh.face_count(), 16);
    let boundary = mesh
        .half_edges()
        .filter(|(edge, _)| mesh.is_boundary(*edge))
        .count();
    assert_eq!(boundary, 8);
    assert_eq!(mesh.to_soup().euler_characteristic(), 1);
}
