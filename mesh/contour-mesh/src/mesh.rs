//! Half-edge mesh storage and soup stitching.

use contour_types::{Point3, TriangleSoup, Vector3};
use hashbrown::HashMap;
use tracing::debug;

use crate::arena::{Arena, EdgeId, FaceId, VertexId};
use crate::error::{MeshError, MeshResult};

/// A mesh vertex with the per-vertex state the refinement passes use.
#[derive(Debug, Clone)]
pub struct MeshVertex {
    /// Current position.
    pub position: Point3<f64>,
    /// Area-averaged normal, recomputed by
    /// [`Mesh::check_topology`](crate::Mesh::check_topology).
    pub normal: Vector3<f64>,
    /// Accumulated repulsion force from
    /// [`Mesh::compute_bins`](crate::Mesh::compute_bins).
    pub force: Vector3<f64>,
    /// One half-edge pointing at this vertex.
    pub edge: EdgeId,
    /// Creation-ordered identifier, stable across arena slot reuse.
    pub id: u64,
    /// Positions from the two previous relaxation steps.
    pub last_positions: [Point3<f64>; 2],
    /// Relaxation stability score, maintained by the caller.
    pub stability: f64,
}

/// A directed half-edge. Its origin is implicit: the destination of the
/// previous edge in the face loop.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// Destination vertex.
    pub vertex: VertexId,
    /// Face this half-edge bounds.
    pub face: FaceId,
    /// Next half-edge counter-clockwise around the face.
    pub next: EdgeId,
    /// Twin half-edge on the adjacent face. A half-edge opposing itself
    /// marks a mesh boundary.
    pub opposing: EdgeId,
}

/// A triangular face.
#[derive(Debug, Clone, Copy)]
pub struct MeshFace {
    /// One half-edge of the face loop.
    pub edge: EdgeId,
    /// Caller-defined region tag, preserved by the refinement passes.
    pub tag: u32,
    /// Face normal, recomputed by
    /// [`Mesh::check_topology`](crate::Mesh::check_topology).
    pub normal: Vector3<f64>,
}

/// An editable triangle mesh with half-edge connectivity.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub(crate) verts: Arena<MeshVertex, VertexId>,
    pub(crate) edges: Arena<HalfEdge, EdgeId>,
    pub(crate) faces: Arena<MeshFace, FaceId>,
    next_vertex_id: u64,
}

impl Mesh {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds half-edge connectivity from a welded triangle soup.
    ///
    /// Each triangle becomes a face with three half-edges. Half-edges are
    /// then paired across triangles that share a vertex-index pair; an
    /// index pair used by a single triangle stays self-paired, marking a
    /// boundary.
    ///
    /// The soup must be welded first ([`contour_extract::make_unique`] or
    /// equivalent): stitching matches vertex indices, not positions.
    ///
    /// # Errors
    ///
    /// [`MeshError::InvalidIndex`] if a triangle references a missing
    /// vertex, [`MeshError::CorruptTopology`] if more than two triangles
    /// share an edge.
    pub fn from_soup(soup: &TriangleSoup) -> MeshResult<Self> {
        let vertex_count = soup.vertices.len();
        for triangle in &soup.triangles {
            for &index in triangle {
                if index as usize >= vertex_count {
                    return Err(MeshError::InvalidIndex {
                        index,
                        vertex_count,
                    });
                }
            }
        }

        let mut mesh = Self {
            verts: Arena::with_capacity(vertex_count),
            edges: Arena::with_capacity(soup.triangles.len() * 3),
            faces: Arena::with_capacity(soup.triangles.len()),
            next_vertex_id: 0,
        };
        let vertex_ids: Vec<VertexId> = soup
            .vertices
            .iter()
            .map(|position| mesh.add_vertex(*position))
            .collect();

        let triangles: Vec<([VertexId; 3], u32)> = soup
            .triangles
            .iter()
            .map(|&[i0, i1, i2]| {
                (
                    [
                        vertex_ids[i0 as usize],
                        vertex_ids[i1 as usize],
                        vertex_ids[i2 as usize],
                    ],
                    0,
                )
            })
            .collect();
        mesh.stitch_triangles(&triangles)?;

        debug!(
            vertices = mesh.vertex_count(),
            edges = mesh.edge_count(),
            faces = mesh.face_count(),
            "stitched mesh from soup"
        );
        Ok(mesh)
    }

    /// Number of live vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    /// Number of live half-edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of live faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Iterates vertices in storage order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &MeshVertex)> {
        self.verts.iter()
    }

    /// Iterates half-edges in storage order.
    pub fn half_edges(&self) -> impl Iterator<Item = (EdgeId, &HalfEdge)> {
        self.edges.iter()
    }

    /// Iterates faces in storage order.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &MeshFace)> {
        self.faces.iter()
    }

    /// Shared access to a vertex.
    #[must_use]
    pub fn vertex(&self, vertex: VertexId) -> Option<&MeshVertex> {
        self.verts.get(vertex)
    }

    /// Mutable access to a vertex.
    pub fn vertex_mut(&mut self, vertex: VertexId) -> Option<&mut MeshVertex> {
        self.verts.get_mut(vertex)
    }

    /// Whether `edge` lies on the mesh boundary (it opposes itself).
    #[must_use]
    pub fn is_boundary(&self, edge: EdgeId) -> bool {
        self.edges[edge].opposing == edge
    }

    /// Origin vertex of `edge`: the destination of its predecessor in the
    /// face loop.
    #[must_use]
    pub fn origin(&self, edge: EdgeId) -> VertexId {
        self.edges[self.prev(edge)].vertex
    }

    /// The half-edge preceding `edge` in its face loop.
    #[must_use]
    pub fn prev(&self, edge: EdgeId) -> EdgeId {
        self.edges[self.edges[edge].next].next
    }

    /// The vertex of `edge`'s face that `edge` does not touch.
    #[must_use]
    pub fn apex(&self, edge: EdgeId) -> VertexId {
        self.edges[self.edges[edge].next].vertex
    }

    /// Length of the chord between the two triangle apexes flanking
    /// `edge`.
    ///
    /// This is the refinement metric: it measures the surface span across
    /// the edge rather than the edge itself, so a short edge between two
    /// widely separated apexes is still considered coarse. On a boundary
    /// edge there is no second apex and the edge's own length is used.
    #[must_use]
    pub fn opposite_chord(&self, edge: EdgeId) -> f64 {
        let opposing = self.edges[edge].opposing;
        if opposing == edge {
            let a = self.verts[self.origin(edge)].position;
            let b = self.verts[self.edges[edge].vertex].position;
            return (b - a).norm();
        }
        let ours = self.verts[self.apex(edge)].position;
        let theirs = self.verts[self.apex(opposing)].position;
        (ours - theirs).norm()
    }

    /// Converts the mesh back into an indexed triangle soup.
    ///
    /// Vertices are emitted in storage order and faces walk their loops
    /// starting from the stored representative edge, so the output is
    /// deterministic for a given mesh.
    #[must_use]
    pub fn to_soup(&self) -> TriangleSoup {
        let mut index_of: HashMap<VertexId, u32> = HashMap::with_capacity(self.verts.len());
        let mut vertices = Vec::with_capacity(self.verts.len());
        for (id, vertex) in self.verts.iter() {
            #[allow(clippy::cast_possible_truncation)]
            index_of.insert(id, vertices.len() as u32);
            vertices.push(vertex.position);
        }

        let mut triangles = Vec::with_capacity(self.faces.len());
        for (_, face) in self.faces.iter() {
            let e0 = face.edge;
            let e1 = self.edges[e0].next;
            let e2 = self.edges[e1].next;
            triangles.push([
                index_of[&self.edges[e2].vertex],
                index_of[&self.edges[e0].vertex],
                index_of[&self.edges[e1].vertex],
            ]);
        }
        TriangleSoup::from_parts(vertices, triangles)
    }

    /// Inserts faces and half-edges for `triangles` and pairs half-edges
    /// that share an unordered vertex pair. The edge and face arenas must
    /// be empty on entry.
    ///
    /// # Errors
    ///
    /// [`MeshError::CorruptTopology`] if more than two triangles share a
    /// vertex pair.
    pub(crate) fn stitch_triangles(
        &mut self,
        triangles: &[([VertexId; 3], u32)],
    ) -> MeshResult<()> {
        debug_assert!(self.edges.is_empty() && self.faces.is_empty());

        let mut occurrences: Vec<(VertexId, VertexId, EdgeId)> =
            Vec::with_capacity(triangles.len() * 3);

        for &([v0, v1, v2], tag) in triangles {
            let face = self.faces.insert(MeshFace {
                edge: EdgeId::DANGLING,
                tag,
                normal: Vector3::zeros(),
            });

            // e0: v0->v1, e1: v1->v2, e2: v2->v0
            let ids = [
                self.add_edge(v1, face),
                self.add_edge(v2, face),
                self.add_edge(v0, face),
            ];
            for (slot, edge) in ids.iter().enumerate() {
                self.edges[*edge].next = ids[(slot + 1) % 3];
            }
            self.faces[face].edge = ids[0];

            self.verts[v1].edge = ids[0];
            self.verts[v2].edge = ids[1];
            self.verts[v0].edge = ids[2];

            occurrences.push((v0.min(v1), v0.max(v1), ids[0]));
            occurrences.push((v1.min(v2), v1.max(v2), ids[1]));
            occurrences.push((v2.min(v0), v2.max(v0), ids[2]));
        }

        occurrences.sort_unstable();
        let mut start = 0;
        while start < occurrences.len() {
            let (a, b, _) = occurrences[start];
            let mut end = start + 1;
            while end < occurrences.len() && occurrences[end].0 == a && occurrences[end].1 == b
            {
                end += 1;
            }
            match end - start {
                // Lone half-edge: stays self-paired as boundary
                1 => {}
                2 => {
                    let first = occurrences[start].2;
                    let second = occurrences[start + 1].2;
                    self.edges[first].opposing = second;
                    self.edges[second].opposing = first;
                }
                shared => {
                    return Err(MeshError::CorruptTopology {
                        details: format!("edge ({a}, {b}) shared by {shared} faces"),
                    });
                }
            }
            start = end;
        }
        Ok(())
    }

    /// Replaces all connectivity with `triangles` over the existing
    /// vertices. Outstanding edge and face handles stop resolving.
    pub(crate) fn rebuild(
        &mut self,
        triangles: &[([VertexId; 3], u32)],
    ) -> MeshResult<()> {
        self.edges.clear();
        self.faces.clear();
        self.stitch_triangles(triangles)
    }

    /// Adds an isolated vertex and returns its handle.
    pub(crate) fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let id = self.next_vertex_id;
        self.next_vertex_id += 1;
        self.verts.insert(MeshVertex {
            position,
            normal: Vector3::zeros(),
            force: Vector3::zeros(),
            edge: EdgeId::DANGLING,
            id,
            last_positions: [position; 2],
            stability: 0.0,
        })
    }

    /// Adds a half-edge into `face` ending at `vertex`, self-paired and
    /// with its `next` left dangling for the caller to wire.
    pub(crate) fn add_edge(&mut self, vertex: VertexId, face: FaceId) -> EdgeId {
        let edge = self.edges.insert(HalfEdge {
            vertex,
            face,
            next: EdgeId::DANGLING,
            opposing: EdgeId::DANGLING,
        });
        self.edges[edge].opposing = edge;
        edge
    }

    /// Walks the three edges of `face` starting at its representative.
    pub(crate) fn face_loop(&self, face: FaceId) -> [EdgeId; 3] {
        let e0 = self.faces[face].edge;
        let e1 = self.edges[e0].next;
        let e2 = self.edges[e1].next;
        [e0, e1, e2]
    }

    /// Refreshes every vertex's incident-edge reference by scanning all
    /// half-edges. Used after passes that delete edges wholesale.
    pub(crate) fn refresh_incident_edges(&mut self) {
        let incoming: Vec<(VertexId, EdgeId)> = self
            .edges
            .iter()
            .map(|(edge, half)| (half.vertex, edge))
            .collect();
        for (vertex, edge) in incoming {
            self.verts[vertex].edge = edge;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_soup() -> TriangleSoup {
        TriangleSoup::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn single_triangle_is_all_boundary() {
        let soup = TriangleSoup::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let mesh = Mesh::from_soup(&soup).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.edge_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        for (edge, _) in mesh.half_edges() {
            assert!(mesh.is_boundary(edge));
        }
    }

    #[test]
    fn shared_edge_is_paired_both_ways() {
        let mesh = Mesh::from_soup(&quad_soup()).unwrap();

        let mut interior = 0;
        for (edge, half) in mesh.half_edges() {
            if mesh.is_boundary(edge) {
                continue;
            }
            interior += 1;
            assert_eq!(mesh.edges[half.opposing].opposing, edge);
            // Twins run in opposite directions
            assert_eq!(mesh.origin(edge), mesh.edges[half.opposing].vertex);
        }
        assert_eq!(interior, 2);
    }

    #[test]
    fn face_loops_close() {
        let mesh = Mesh::from_soup(&quad_soup()).unwrap();
        for (face, data) in mesh.faces() {
            let [e0, e1, e2] = mesh.face_loop(face);
            assert_eq!(mesh.edges[e2].next, e0);
            for edge in [e0, e1, e2] {
                assert_eq!(mesh.edges[edge].face, face);
            }
            assert_eq!(data.edge, e0);
        }
    }

    #[test]
    fn invalid_index_is_rejected() {
        let soup = TriangleSoup::from_parts(vec![Point3::new(0.0, 0.0, 0.0)], vec![[0, 0, 5]]);
        match Mesh::from_soup(&soup) {
            Err(MeshError::InvalidIndex {
                index: 5,
                vertex_count: 1,
            }) => {}
            other => panic!("expected InvalidIndex, got {other:?}"),
        }
    }

    #[test]
    fn non_manifold_edge_is_rejected() {
        let soup = TriangleSoup::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, -1.0),
            ],
            vec![[0, 1, 2], [0, 1, 3], [0, 1, 4]],
        );
        match Mesh::from_soup(&soup) {
            Err(MeshError::CorruptTopology { details }) => {
                assert!(details.contains("3 faces"));
            }
            other => panic!("expected CorruptTopology, got {other:?}"),
        }
    }

    #[test]
    fn opposite_chord_spans_the_apexes() {
        let mesh = Mesh::from_soup(&quad_soup()).unwrap();
        let (interior, _) = mesh
            .half_edges()
            .find(|(edge, _)| !mesh.is_boundary(*edge))
            .unwrap();

        // Diagonal 0-2 separates apexes (1,0,0) and (0,1,0)
        let chord = mesh.opposite_chord(interior);
        assert!((chord - 2.0f64.sqrt()).abs() < 1e-12);

        let (boundary, _) = mesh
            .half_edges()
            .find(|(edge, _)| mesh.is_boundary(*edge))
            .unwrap();
        let half = mesh.edges[boundary];
        let length = (mesh.verts[half.vertex].position
            - mesh.verts[mesh.origin(boundary)].position)
            .norm();
        assert!((mesh.opposite_chord(boundary) - length).abs() < 1e-12);
    }

    #[test]
    fn to_soup_round_trips_counts() {
        let mesh = Mesh::from_soup(&quad_soup()).unwrap();
        let soup = mesh.to_soup();
        assert_eq!(soup.vertex_count(), 4);
        assert_eq!(soup.triangle_count(), 2);
        assert_eq!(soup.euler_characteristic(), 1);

        // Windings survive the round trip up to rotation
        let rebuilt = Mesh::from_soup(&soup).unwrap();
        assert_eq!(rebuilt.face_count(), 2);
    }

    #[test]
    fn vertex_ids_are_stable_and_ordered() {
        let mesh = Mesh::from_soup(&quad_soup()).unwrap();
        let ids: Vec<u64> = mesh.vertices().map(|(_, v)| v.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}
