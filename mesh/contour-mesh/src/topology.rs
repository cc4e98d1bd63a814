//! Topology validation and cleanup.

use core::fmt;

use contour_types::Vector3;
use hashbrown::HashMap;
use tracing::debug;

use crate::arena::{EdgeId, FaceId, VertexId};
use crate::error::{MeshError, MeshResult};
use crate::mesh::{Mesh, MeshVertex};

/// Cell size of the coarse candidate filter for near-duplicate vertices.
const MERGE_CELL: f64 = 1e-4;
/// Vertices closer than this are considered coincident and merged.
const MERGE_DISTANCE: f64 = 1e-6;
/// Normals shorter than this are left as zero vectors.
const DEGENERATE_NORMAL: f64 = 1e-30;

/// Findings of [`Mesh::check_topology`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopologyReport {
    /// Near-coincident vertices merged into an earlier twin.
    pub vertices_merged: usize,
    /// Faces found sharing all three vertices with an earlier face.
    pub duplicate_faces_found: usize,
    /// How many of those could be removed safely.
    pub duplicate_faces_removed: usize,
    /// Interior edge pairs whose faces wind the same way.
    pub inconsistent_windings: usize,
    /// Live vertices after cleanup.
    pub vertex_count: usize,
    /// Live faces after cleanup.
    pub face_count: usize,
}

impl TopologyReport {
    /// Whether the pass modified the mesh.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        self.vertices_merged > 0 || self.duplicate_faces_removed > 0
    }
}

impl fmt::Display for TopologyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "merged {} vertices, removed {}/{} duplicate faces, \
             {} inconsistent windings, {} vertices and {} faces remain",
            self.vertices_merged,
            self.duplicate_faces_removed,
            self.duplicate_faces_found,
            self.inconsistent_windings,
            self.vertex_count,
            self.face_count
        )
    }
}

impl Mesh {
    /// Validates connectivity, recomputes normals, and cleans up
    /// coincident geometry.
    ///
    /// The pass recomputes face and vertex normals, counts interior edges
    /// whose two faces disagree on winding (a diagnostic only, windings
    /// are not repaired), merges vertices closer than a fixed coincidence
    /// tolerance (the earlier-created vertex survives), and removes
    /// duplicate faces where removal is safe. A duplicate face is removed
    /// only when it sits back to back with its twin, every edge opposing
    /// an edge of the kept face; the kept face's edges then become
    /// boundary. Other duplicates are only counted.
    ///
    /// Runs to a fixed point: merging can create new coincidences, so the
    /// merge step repeats until nothing changes.
    ///
    /// # Errors
    ///
    /// [`MeshError::CorruptTopology`] when a face loop does not close in
    /// three steps or a twin link is not mutual.
    pub fn check_topology(&mut self) -> MeshResult<TopologyReport> {
        let mut report = TopologyReport::default();

        self.recompute_normals()?;
        report.inconsistent_windings = self.count_inconsistent_windings()?;

        loop {
            let merged = self.merge_coincident_vertices();
            report.vertices_merged += merged;
            if merged == 0 {
                break;
            }
        }

        let (found, removed) = self.remove_duplicate_faces();
        report.duplicate_faces_found = found;
        report.duplicate_faces_removed = removed;

        if report.had_changes() {
            self.recompute_normals()?;
        }
        report.vertex_count = self.vertex_count();
        report.face_count = self.face_count();

        debug!(%report, "checked topology");
        Ok(report)
    }

    /// Recomputes every face normal and accumulates them into vertex
    /// normals.
    fn recompute_normals(&mut self) -> MeshResult<()> {
        let vertex_ids: Vec<VertexId> = self.verts.keys().collect();
        for vertex in vertex_ids {
            self.verts[vertex].normal = Vector3::zeros();
        }

        let faces: Vec<FaceId> = self.faces.keys().collect();
        for face in faces {
            let [e0, e1, e2] = self.face_loop(face);
            if self.edges[e2].next != e0 {
                return Err(MeshError::CorruptTopology {
                    details: format!("face {face} loop does not close in three edges"),
                });
            }
            let a = self.verts[self.edges[e2].vertex].position;
            let b = self.verts[self.edges[e0].vertex].position;
            let c = self.verts[self.edges[e1].vertex].position;

            let cross = (b - a).cross(&(c - a));
            let normal = if cross.norm_squared() > DEGENERATE_NORMAL {
                cross.normalize()
            } else {
                Vector3::zeros()
            };
            self.faces[face].normal = normal;
            for edge in [e0, e1, e2] {
                let vertex = self.edges[edge].vertex;
                self.verts[vertex].normal += normal;
            }
        }

        for (_, vertex) in self.verts.iter_mut() {
            if vertex.normal.norm_squared() > DEGENERATE_NORMAL {
                vertex.normal = vertex.normal.normalize();
            }
        }
        Ok(())
    }

    /// Counts interior edge pairs whose twins end at the same vertex,
    /// which happens exactly when the two adjacent faces wind the same
    /// way. Verifies twin links are mutual along the way.
    fn count_inconsistent_windings(&self) -> MeshResult<usize> {
        let mut inconsistent = 0;
        for (edge, half) in self.edges.iter() {
            let opposing = half.opposing;
            if opposing == edge {
                continue;
            }
            let twin = self
                .edges
                .get(opposing)
                .ok_or_else(|| MeshError::CorruptTopology {
                    details: format!("edge {edge} opposes a deleted edge"),
                })?;
            if twin.opposing != edge {
                return Err(MeshError::CorruptTopology {
                    details: format!("edge {edge} has a non-mutual twin link"),
                });
            }
            // Count each pair once
            if edge < opposing && twin.vertex == half.vertex {
                inconsistent += 1;
            }
        }
        Ok(inconsistent)
    }

    /// Merges one round of near-coincident vertices, returning how many
    /// were absorbed.
    fn merge_coincident_vertices(&mut self) -> usize {
        // Coarse spatial hash; the merge distance is far below the cell
        // size, so only the 27 surrounding cells need checking
        let mut cells: HashMap<(i64, i64, i64), Vec<VertexId>> = HashMap::new();
        for (id, vertex) in self.verts.iter() {
            cells.entry(cell_of(vertex)).or_default().push(id);
        }

        // removed -> survivor, survivor always the earlier-created vertex
        let mut merges: Vec<(VertexId, VertexId)> = Vec::new();
        let mut absorbed: Vec<VertexId> = Vec::new();
        for (id, vertex) in self.verts.iter() {
            if absorbed.contains(&id) {
                continue;
            }
            let (cx, cy, cz) = cell_of(vertex);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        let Some(bucket) = cells.get(&(cx + dx, cy + dy, cz + dz)) else {
                            continue;
                        };
                        for &other in bucket {
                            if other == id || absorbed.contains(&other) {
                                continue;
                            }
                            let candidate = &self.verts[other];
                            if candidate.id < vertex.id {
                                // The earlier vertex will claim this pair
                                continue;
                            }
                            let gap = (candidate.position - vertex.position).norm();
                            if gap < MERGE_DISTANCE {
                                merges.push((other, id));
                                absorbed.push(other);
                            }
                        }
                    }
                }
            }
        }

        for &(removed, survivor) in &merges {
            let redirect: Vec<EdgeId> = self
                .edges
                .iter()
                .filter(|(_, half)| half.vertex == removed)
                .map(|(edge, _)| edge)
                .collect();
            for edge in redirect {
                self.edges[edge].vertex = survivor;
            }
            self.verts.remove(removed);
        }
        merges.len()
    }

    /// Finds faces sharing all three vertices with an earlier face and
    /// removes the ones that sit back to back with their twin.
    fn remove_duplicate_faces(&mut self) -> (usize, usize) {
        let mut first_with: HashMap<[VertexId; 3], FaceId> = HashMap::new();
        let mut duplicates: Vec<(FaceId, FaceId)> = Vec::new();

        for (face, _) in self.faces.iter() {
            let [e0, e1, e2] = self.face_loop(face);
            let mut key = [
                self.edges[e0].vertex,
                self.edges[e1].vertex,
                self.edges[e2].vertex,
            ];
            key.sort_unstable();
            match first_with.get(&key) {
                Some(&kept) => duplicates.push((face, kept)),
                None => {
                    first_with.insert(key, face);
                }
            }
        }

        let found = duplicates.len();
        let mut removed = 0;
        for (duplicate, kept) in duplicates {
            if !self.faces.contains(duplicate) || !self.faces.contains(kept) {
                continue;
            }
            let dup_edges = self.face_loop(duplicate);
            let kept_edges = self.face_loop(kept);
            let back_to_back = dup_edges
                .iter()
                .all(|&edge| kept_edges.contains(&self.edges[edge].opposing));
            if !back_to_back {
                continue;
            }

            for edge in kept_edges {
                self.edges[edge].opposing = edge;
            }
            for edge in dup_edges {
                self.edges.remove(edge);
            }
            self.faces.remove(duplicate);
            removed += 1;
        }
        if removed > 0 {
            self.refresh_incident_edges();
        }
        (found, removed)
    }
}

fn cell_of(vertex: &MeshVertex) -> (i64, i64, i64) {
    #[allow(clippy::cast_possible_truncation)]
    let quantize = |value: f64| (value / MERGE_CELL).floor() as i64;
    (
        quantize(vertex.position.x),
        quantize(vertex.position.y),
        quantize(vertex.position.z),
    )
}
