//! Spatially binned vertex repulsion.

use contour_types::{Point3, Vector3};
use hashbrown::HashMap;
use tracing::debug;

use crate::arena::VertexId;
use crate::mesh::Mesh;

/// Bins per axis.
const BIN_COUNT: usize = 8;
/// Lower bound on the bin cell size, for meshes flat along an axis.
const MIN_CELL: f64 = 1e-12;

impl Mesh {
    /// Accumulates pairwise repulsion between nearby vertices into their
    /// [`force`](crate::MeshVertex::force) fields.
    ///
    /// Vertices are hashed into an 8x8x8 grid over the mesh bounding box
    /// and only same-bin pairs are tested, replacing the all-pairs scan
    /// with work proportional to local density. Two vertices closer than
    /// `min_dist` (but not coincident) push each other apart along their
    /// separation, each receiving half the overlap as force magnitude.
    ///
    /// A pair straddling a bin wall is missed by one grid, so callers
    /// alternate `odd` between relaxation steps: the odd grid is shifted
    /// by half a cell, placing the walls where the even grid's cell
    /// centers are.
    ///
    /// Forces accumulate across calls; use [`Mesh::clear_forces`] to
    /// start a fresh step.
    pub fn compute_bins(&mut self, odd: bool, min_dist: f64) {
        let Some((low, high)) = self.bounds() else {
            return;
        };

        let extent = high - low;
        let cell = Vector3::new(
            (extent.x / BIN_COUNT as f64).max(MIN_CELL),
            (extent.y / BIN_COUNT as f64).max(MIN_CELL),
            (extent.z / BIN_COUNT as f64).max(MIN_CELL),
        );
        let mut origin = low;
        if odd {
            origin -= cell * 0.5;
        }

        let mut bins: HashMap<(usize, usize, usize), Vec<VertexId>> = HashMap::new();
        for (id, vertex) in self.verts.iter() {
            let index = |value: f64, start: f64, step: f64| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let slot = (((value - start) / step).floor().max(0.0)) as usize;
                slot.min(BIN_COUNT - 1)
            };
            let key = (
                index(vertex.position.x, origin.x, cell.x),
                index(vertex.position.y, origin.y, cell.y),
                index(vertex.position.z, origin.z, cell.z),
            );
            bins.entry(key).or_default().push(id);
        }

        let mut pairs_pushed = 0usize;
        for bucket in bins.values() {
            for (i, &first) in bucket.iter().enumerate() {
                for &second in &bucket[i + 1..] {
                    let separation =
                        self.verts[first].position - self.verts[second].position;
                    let distance = separation.norm();
                    if distance <= 0.0 || distance >= min_dist {
                        continue;
                    }
                    let push = separation * (0.5 * (min_dist - distance) / distance);
                    self.verts[first].force += push;
                    self.verts[second].force -= push;
                    pairs_pushed += 1;
                }
            }
        }

        debug!(odd, min_dist, pairs_pushed, "accumulated bin repulsion");
    }

    /// Resets every vertex's accumulated force to zero.
    pub fn clear_forces(&mut self) {
        for (_, vertex) in self.verts.iter_mut() {
            vertex.force = Vector3::zeros();
        }
    }

    /// Axis-aligned bounding box of the live vertices.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut vertices = self.verts.iter().map(|(_, v)| v.position);
        let first = vertices.next()?;
        let (mut low, mut high) = (first, first);
        for p in vertices {
            low = Point3::new(low.x.min(p.x), low.y.min(p.y), low.z.min(p.z));
            high = Point3::new(high.x.max(p.x), high.y.max(p.y), high.z.max(p.z));
        }
        Some((low, high))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use contour_types::TriangleSoup;

    use super::*;

    fn strip(positions: Vec<Point3<f64>>) -> Mesh {
        // Connectivity is irrelevant to binning; one triangle suffices
        let triangles = vec![[0, 1, 2]];
        Mesh::from_soup(&TriangleSoup::from_parts(positions, triangles)).unwrap()
    }

    #[test]
    fn close_pair_pushes_apart() {
        let mut mesh = strip(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.1, 0.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
        ]);
        mesh.compute_bins(false, 0.5);

        let forces: Vec<_> = mesh.vertices().map(|(_, v)| v.force).collect();
        // Half the overlap 0.4 on each side, along -x and +x
        assert_relative_eq!(forces[0].x, -0.2, epsilon = 1e-12);
        assert_relative_eq!(forces[1].x, 0.2, epsilon = 1e-12);
        assert_relative_eq!((forces[0] + forces[1]).norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(forces[2].norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn distant_pair_is_ignored() {
        let mut mesh = strip(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        ]);
        mesh.compute_bins(false, 0.5);
        assert!(mesh.vertices().all(|(_, v)| v.force.norm() == 0.0));
    }

    #[test]
    fn coincident_pair_is_skipped() {
        // Zero separation has no direction to push along
        let mut mesh = strip(vec![
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(9.0, 9.0, 9.0),
        ]);
        mesh.compute_bins(false, 0.5);
        assert!(mesh.vertices().all(|(_, v)| v.force.norm() == 0.0));
    }

    #[test]
    fn odd_grid_catches_wall_straddlers() {
        // Bounding box [0, 8] gives unit cells: even-grid walls sit at
        // integers, so a pair at 3.999/4.001 splits across bins; the
        // half-shifted grid sees it whole
        let mut mesh = strip(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.999, 0.0, 0.0),
            Point3::new(4.001, 0.0, 0.0),
            Point3::new(8.0, 8.0, 8.0),
        ]);

        mesh.compute_bins(false, 0.01);
        assert!(mesh.vertices().all(|(_, v)| v.force.norm() == 0.0));

        mesh.compute_bins(true, 0.01);
        let forces: Vec<_> = mesh.vertices().map(|(_, v)| v.force).collect();
        assert!(forces[1].x < 0.0);
        assert!(forces[2].x > 0.0);
    }

    #[test]
    fn forces_accumulate_until_cleared() {
        let mut mesh = strip(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.1, 0.0, 0.0),
            Point3::new(5.0, 5.0, 5.0),
        ]);
        mesh.compute_bins(false, 0.5);
        mesh.compute_bins(false, 0.5);
        let force = mesh.vertices().next().unwrap().1.force;
        assert_relative_eq!(force.x, -0.4, epsilon = 1e-12);

        mesh.clear_forces();
        assert!(mesh.vertices().all(|(_, v)| v.force.norm() == 0.0));
    }
}
