//! Benchmarks for stitching and the refinement passes.

use contour_extract::{extract_contour, make_unique, orient_triangles, VoxelVolume};
use contour_mesh::{Mesh, Point3};
use contour_types::TriangleSoup;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sphere_soup(side: usize) -> TriangleSoup {
    let center = Point3::new(
        (side - 1) as f64 / 2.0,
        (side - 1) as f64 / 2.0,
        (side - 1) as f64 / 2.0,
    );
    let radius = side as f64 * 0.35;
    let mut values = Vec::with_capacity(side * side * side);
    for z in 0..side {
        for y in 0..side {
            for x in 0..side {
                let p = Point3::new(x as f64, y as f64, z as f64);
                values.push(i32::from((p - center).norm() < radius));
            }
        }
    }
    let volume = VoxelVolume::new(side, side, side, &values).unwrap();
    let mut soup = extract_contour(&volume, 0.5).unwrap();
    make_unique(&mut soup);
    orient_triangles(&mut soup, &volume, false);
    soup
}

fn bench_stitch(c: &mut Criterion) {
    let soup = sphere_soup(24);
    c.bench_function("stitch/sphere_24", |b| {
        b.iter(|| Mesh::from_soup(black_box(&soup)).unwrap());
    });
}

fn bench_subdivide(c: &mut Criterion) {
    let soup = sphere_soup(24);
    let mesh = Mesh::from_soup(&soup).unwrap();
    c.bench_function("subdivide/sphere_24", |b| {
        b.iter(|| {
            let mut copy = mesh.clone();
            copy.subdivide(black_box(0.8)).unwrap()
        });
    });
}

fn bench_melt(c: &mut Criterion) {
    let soup = sphere_soup(24);
    let mesh = Mesh::from_soup(&soup).unwrap();
    c.bench_function("melt/sphere_24", |b| {
        b.iter(|| {
            let mut copy = mesh.clone();
            copy.edge_melt(black_box(0.6)).unwrap()
        });
    });
}

fn bench_check_topology(c: &mut Criterion) {
    let soup = sphere_soup(24);
    let mesh = Mesh::from_soup(&soup).unwrap();
    c.bench_function("check_topology/sphere_24", |b| {
        b.iter(|| {
            let mut copy = mesh.clone();
            copy.check_topology().unwrap()
        });
    });
}

fn bench_compute_bins(c: &mut Criterion) {
    let soup = sphere_soup(24);
    let mesh = Mesh::from_soup(&soup).unwrap();
    c.bench_function("compute_bins/sphere_24", |b| {
        b.iter(|| {
            let mut copy = mesh.clone();
            copy.compute_bins(black_box(false), black_box(0.8));
        });
    });
}

criterion_group!(
    benches,
    bench_stitch,
    bench_subdivide,
    bench_melt,
    bench_check_topology,
    bench_compute_bins
);
criterion_main!(benches);
