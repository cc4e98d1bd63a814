//! Edge melting: collapse of the shortest interior edges.

use tracing::debug;

use crate::arena::EdgeId;
use crate::error::MeshResult;
use crate::mesh::Mesh;

impl Mesh {
    /// Collapses interior edges whose
    /// [`opposite_chord`](Mesh::opposite_chord) is below `min_length`,
    /// shortest first, until no collapsible edge remains.
    ///
    /// Each collapse removes the edge's destination vertex, its two
    /// incident faces, and their six half-edges; the origin vertex
    /// survives at its current position. Collapses that would damage the
    /// mesh are skipped: boundary edges, edges whose flanking triangles
    /// share their apex, and edges adjacent to the boundary stay as they
    /// are.
    ///
    /// Returns the number of collapses performed. Every collapse removes
    /// exactly one vertex and two faces.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` mirrors the other editing
    /// passes so callers can chain them uniformly.
    pub fn edge_melt(&mut self, min_length: f64) -> MeshResult<usize> {
        let mut collapses = 0;

        loop {
            let mut candidates: Vec<(f64, EdgeId)> = self
                .edges
                .keys()
                .filter(|&edge| !self.is_boundary(edge))
                .map(|edge| (self.opposite_chord(edge), edge))
                .filter(|&(chord, _)| chord < min_length)
                .collect();
            candidates
                .sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal));

            let mut advanced = false;
            for (_, edge) in candidates {
                if self.try_collapse(edge) {
                    collapses += 1;
                    advanced = true;
                    break;
                }
            }
            if !advanced {
                break;
            }
        }

        debug!(
            collapses,
            min_length,
            vertices = self.vertex_count(),
            faces = self.face_count(),
            "melted short edges"
        );
        Ok(collapses)
    }

    /// Attempts to collapse `edge`, folding its destination vertex onto
    /// its origin. Returns whether the collapse was performed.
    fn try_collapse(&mut self, edge: EdgeId) -> bool {
        let opposing = self.edges[edge].opposing;
        if opposing == edge {
            return false;
        }

        let f1 = self.edges[edge].face;
        let f2 = self.edges[opposing].face;
        if f1 == f2 {
            return false;
        }

        let survivor = self.origin(edge);
        let removed = self.edges[edge].vertex;

        // Face loops: edge -> a1 -> a2 and opposing -> b1 -> b2
        let a1 = self.edges[edge].next;
        let a2 = self.edges[a1].next;
        let b1 = self.edges[opposing].next;
        let b2 = self.edges[b1].next;
        let apex1 = self.edges[a1].vertex;
        let apex2 = self.edges[b1].vertex;
        if apex1 == apex2 {
            // Two-face pillow; collapsing it would orphan the apexes
            return false;
        }

        let oa1 = self.edges[a1].opposing;
        let oa2 = self.edges[a2].opposing;
        let ob1 = self.edges[b1].opposing;
        let ob2 = self.edges[b2].opposing;
        // Outer edges must be interior and belong to four distinct faces
        if oa1 == a1 || oa2 == a2 || ob1 == b1 || ob2 == b2 {
            return false;
        }
        if oa1 == a2 || oa2 == a1 || ob1 == b2 || ob2 == b1 {
            return false;
        }

        // Everything still pointing at the removed vertex moves to the
        // survivor
        let incoming: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|(_, half)| half.vertex == removed)
            .map(|(id, _)| id)
            .collect();
        for id in incoming {
            self.edges[id].vertex = survivor;
        }

        self.faces.remove(f1);
        self.faces.remove(f2);
        for id in [edge, a1, a2, opposing, b1, b2] {
            self.edges.remove(id);
        }

        // Outer twins close over the removed faces
        self.edges[oa1].opposing = oa2;
        self.edges[oa2].opposing = oa1;
        self.edges[ob1].opposing = ob2;
        self.edges[ob2].opposing = ob1;

        // Incident references that pointed into the removed fan
        self.verts[survivor].edge = oa1;
        self.verts[apex1].edge = oa2;
        self.verts[apex2].edge = ob2;
        self.verts.remove(removed);
        true
    }
}
