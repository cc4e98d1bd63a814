//! Midpoint subdivision driven by the opposite-chord metric.

use contour_types::Point3;
use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::arena::{EdgeId, VertexId};
use crate::error::MeshResult;
use crate::mesh::Mesh;

impl Mesh {
    /// Splits coarse edges at their midpoints, driven by the
    /// [`opposite_chord`](Mesh::opposite_chord) metric.
    ///
    /// Each pass marks the edges whose chord exceeds `max_length`,
    /// creates one midpoint vertex per marked vertex pair, and rebuilds
    /// each face according to how many of its edges were marked: one
    /// marked edge yields two triangles, two yield three, three yield
    /// four (the modified butterfly layout with a central medial
    /// triangle). Passes repeat until nothing is marked or until a pass
    /// fails to shrink the largest over-threshold chord.
    ///
    /// The stall check is load-bearing, not cosmetic. The chord of an
    /// edge spans the two apexes flanking it, and splitting the edge
    /// moves neither apex, so a face fanned from a distant apex re-marks
    /// its children with the same chord on every pass. Near such
    /// configurations the largest over-threshold chord settles at a
    /// fixed value while the marked set grows, and the pass loop stops
    /// there. Chords up to that value may therefore remain after the
    /// call.
    ///
    /// Face tags propagate to all children of a face. Returns the total
    /// number of midpoint vertices created.
    ///
    /// # Errors
    ///
    /// [`MeshError::CorruptTopology`](crate::MeshError::CorruptTopology)
    /// if a rebuild produces a non-manifold edge, which cannot happen
    /// for an input mesh that was itself manifold.
    pub fn subdivide(&mut self, max_length: f64) -> MeshResult<usize> {
        debug_assert!(max_length > 0.0);
        let mut created_total = 0;
        let mut passes = 0u32;
        let mut last_max_chord = f64::INFINITY;

        loop {
            let mut max_chord = 0.0_f64;
            let mut marked: HashSet<EdgeId> = HashSet::new();
            for edge in self.edges.keys() {
                let chord = self.opposite_chord(edge);
                if chord > max_length {
                    max_chord = max_chord.max(chord);
                    marked.insert(edge);
                }
            }
            if marked.is_empty() {
                break;
            }
            if max_chord >= last_max_chord {
                debug!(
                    max_chord,
                    marked = marked.len(),
                    "chord refinement stalled"
                );
                break;
            }
            last_max_chord = max_chord;
            passes += 1;

            // One midpoint per vertex pair; twins share the pair
            let mut midpoints: HashMap<(VertexId, VertexId), VertexId> = HashMap::new();
            let mut created_this_pass = 0;
            let splits: Vec<(VertexId, VertexId)> = self
                .edges
                .keys()
                .filter(|edge| marked.contains(edge))
                .map(|edge| {
                    let a = self.origin(edge);
                    let b = self.edges[edge].vertex;
                    (a.min(b), a.max(b))
                })
                .collect();
            for (a, b) in splits {
                if midpoints.contains_key(&(a, b)) {
                    continue;
                }
                let middle = center(self.verts[a].position, self.verts[b].position);
                let vertex = self.add_vertex(middle);
                midpoints.insert((a, b), vertex);
                created_this_pass += 1;
            }

            let mut triangles: Vec<([VertexId; 3], u32)> =
                Vec::with_capacity(self.face_count() * 2);
            for (face, data) in self.faces.iter() {
                let [e0, e1, e2] = self.face_loop(face);
                let corners = [
                    self.edges[e2].vertex,
                    self.edges[e0].vertex,
                    self.edges[e1].vertex,
                ];
                split_face(&corners, data.tag, &midpoints, &mut triangles);
            }

            self.rebuild(&triangles)?;
            created_total += created_this_pass;
        }

        debug!(
            created = created_total,
            passes,
            max_length,
            faces = self.face_count(),
            "subdivided mesh"
        );
        Ok(created_total)
    }
}

fn center(a: Point3<f64>, b: Point3<f64>) -> Point3<f64> {
    Point3::from((a.coords + b.coords) * 0.5)
}

fn lookup(
    midpoints: &HashMap<(VertexId, VertexId), VertexId>,
    a: VertexId,
    b: VertexId,
) -> Option<VertexId> {
    midpoints.get(&(a.min(b), a.max(b))).copied()
}

/// Emits the replacement triangles for one face given which of its edges
/// carry midpoints. Cases with one or two midpoints are rotated into a
/// canonical corner order first so each layout is written once.
fn split_face(
    corners: &[VertexId; 3],
    tag: u32,
    midpoints: &HashMap<(VertexId, VertexId), VertexId>,
    out: &mut Vec<([VertexId; 3], u32)>,
) {
    let [v0, v1, v2] = *corners;
    let m01 = lookup(midpoints, v0, v1);
    let m12 = lookup(midpoints, v1, v2);
    let m20 = lookup(midpoints, v2, v0);

    match (m01, m12, m20) {
        (None, None, None) => out.push(([v0, v1, v2], tag)),
        // One split edge: fan from the untouched apex
        (Some(m), None, None) => {
            out.push(([v0, m, v2], tag));
            out.push(([m, v1, v2], tag));
        }
        (None, Some(m), None) => {
            out.push(([v1, m, v0], tag));
            out.push(([m, v2, v0], tag));
        }
        (None, None, Some(m)) => {
            out.push(([v2, m, v1], tag));
            out.push(([m, v0, v1], tag));
        }
        // Two split edges: a triangle at the shared corner plus a quad
        // split toward the far corner
        (Some(ma), Some(mb), None) => split_two(v0, v1, v2, ma, mb, tag, out),
        (None, Some(ma), Some(mb)) => split_two(v1, v2, v0, ma, mb, tag, out),
        (Some(mb), None, Some(ma)) => split_two(v2, v0, v1, ma, mb, tag, out),
        // Fully split: corner triangles around a medial triangle
        (Some(m01), Some(m12), Some(m20)) => {
            out.push(([v0, m01, m20], tag));
            out.push(([m01, v1, m12], tag));
            out.push(([m20, m12, v2], tag));
            out.push(([m01, m12, m20], tag));
        }
    }
}

/// Splits a face whose edges `a-b` and `b-c` carry midpoints `ma` and
/// `mb`.
fn split_two(
    a: VertexId,
    b: VertexId,
    c: VertexId,
    ma: VertexId,
    mb: VertexId,
    tag: u32,
    out: &mut Vec<([VertexId; 3], u32)>,
) {
    out.push(([ma, b, mb], tag));
    out.push(([a, ma, mb], tag));
    out.push(([a, mb, c], tag));
}
