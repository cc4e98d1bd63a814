//! Per-voxel vertex/edge disambiguation table.

use nalgebra::Point3;

/// Slots 0-11 hold edge-crossing vertices, slots 12-17 hold per-face branch
/// (saddle) vertices.
pub(crate) const SLOT_COUNT: usize = 18;

/// Maximum adjacency degree: a branch vertex connects to the four crossings
/// of its face.
const MAX_DEGREE: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Slot {
    /// Index into the output vertex list.
    global: u32,
    position: Point3<f64>,
    live: bool,
    adjacency: [u8; MAX_DEGREE],
    degree: u8,
}

impl Slot {
    const fn empty() -> Self {
        Self {
            global: 0,
            position: Point3::new(0.0, 0.0, 0.0),
            live: false,
            adjacency: [0; MAX_DEGREE],
            degree: 0,
        }
    }
}

/// The local wireframe graph of one voxel cell: up to 18 candidate vertices
/// (12 edge crossings plus 6 face branch points) with adjacency.
///
/// Face classification connects crossings pairwise or through a branch
/// vertex; [`VertexEdgeTable::remove_triangles`] then ear-clips the wireframe
/// into triangles.
#[derive(Debug)]
pub(crate) struct VertexEdgeTable {
    slots: [Slot; SLOT_COUNT],
    live_count: usize,
}

/// Why ear-clipping could not consume the wireframe.
#[derive(Debug)]
pub(crate) enum TableFault {
    /// Live vertices remain but none has degree 2.
    Stuck { live: usize },
    /// A slot accumulated more than four neighbors.
    Overconnected { slot: usize },
}

impl VertexEdgeTable {
    pub(crate) const fn new() -> Self {
        Self {
            slots: [Slot::empty(); SLOT_COUNT],
            live_count: 0,
        }
    }

    /// Record a candidate vertex, remembering its index in the output list.
    pub(crate) fn set_vertex(&mut self, slot: usize, position: Point3<f64>, global: u32) {
        debug_assert!(!self.slots[slot].live, "slot set twice");
        self.slots[slot] = Slot {
            global,
            position,
            live: true,
            adjacency: [0; MAX_DEGREE],
            degree: 0,
        };
        self.live_count += 1;
    }

    pub(crate) const fn is_set(&self, slot: usize) -> bool {
        self.slots[slot].live
    }

    pub(crate) const fn position(&self, slot: usize) -> Point3<f64> {
        self.slots[slot].position
    }

    fn adjacent(&self, a: usize, b: usize) -> bool {
        let slot = &self.slots[a];
        slot.adjacency[..slot.degree as usize].contains(&(b as u8))
    }

    /// Connect two live slots. Idempotent.
    pub(crate) fn connect(&mut self, a: usize, b: usize) -> Result<(), TableFault> {
        debug_assert!(self.slots[a].live && self.slots[b].live);
        if self.adjacent(a, b) {
            return Ok(());
        }
        self.attach(a, b)?;
        self.attach(b, a)
    }

    fn attach(&mut self, from: usize, to: usize) -> Result<(), TableFault> {
        let slot = &mut self.slots[from];
        if slot.degree as usize == MAX_DEGREE {
            return Err(TableFault::Overconnected { slot: from });
        }
        slot.adjacency[slot.degree as usize] = to as u8;
        slot.degree += 1;
        Ok(())
    }

    fn detach(&mut self, from: usize, to: usize) {
        let slot = &mut self.slots[from];
        let degree = slot.degree as usize;
        for i in 0..degree {
            if slot.adjacency[i] == to as u8 {
                slot.adjacency[i] = slot.adjacency[degree - 1];
                slot.degree -= 1;
                return;
            }
        }
    }

    fn kill(&mut self, slot: usize) {
        debug_assert_eq!(self.slots[slot].degree, 0);
        self.slots[slot].live = false;
        self.live_count -= 1;
    }

    fn find_degree_two(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.live && s.degree == 2)
    }

    /// Ear-clip the wireframe into triangles of global vertex indices.
    ///
    /// Repeatedly removes a degree-2 vertex, emitting the triangle it forms
    /// with its two neighbors. Neighbors not yet adjacent are connected;
    /// neighbors that already were adjacent close a loop, so their shared
    /// adjacency is dropped and vertices left isolated are retired. Each
    /// step removes at least one live vertex, so the pass terminates.
    pub(crate) fn remove_triangles(
        &mut self,
        triangles: &mut Vec<[u32; 3]>,
    ) -> Result<(), TableFault> {
        while self.live_count > 0 {
            let Some(v) = self.find_degree_two() else {
                return Err(TableFault::Stuck {
                    live: self.live_count,
                });
            };
            let a = self.slots[v].adjacency[0] as usize;
            let b = self.slots[v].adjacency[1] as usize;

            triangles.push([
                self.slots[a].global,
                self.slots[v].global,
                self.slots[b].global,
            ]);

            self.detach(a, v);
            self.detach(b, v);
            self.slots[v].degree = 0;
            self.kill(v);

            if self.adjacent(a, b) {
                // Loop closed: the emitted triangle already covers the a-b
                // segment.
                self.detach(a, b);
                self.detach(b, a);
                if self.slots[a].degree == 0 {
                    self.kill(a);
                }
                if self.slots[b].degree == 0 {
                    self.kill(b);
                }
            } else {
                self.connect(a, b)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(slots: &[usize]) -> VertexEdgeTable {
        let mut table = VertexEdgeTable::new();
        for (i, &slot) in slots.iter().enumerate() {
            table.set_vertex(slot, Point3::new(i as f64, 0.0, 0.0), i as u32);
        }
        table
    }

    #[test]
    fn triangle_loop_emits_one_triangle() {
        let mut table = table_with(&[0, 1, 2]);
        table.connect(0, 1).unwrap();
        table.connect(1, 2).unwrap();
        table.connect(2, 0).unwrap();

        let mut triangles = Vec::new();
        table.remove_triangles(&mut triangles).unwrap();
        assert_eq!(triangles.len(), 1);
        let mut indices = triangles[0];
        indices.sort_unstable();
        assert_eq!(indices, [0, 1, 2]);
    }

    #[test]
    fn quad_loop_emits_two_triangles() {
        let mut table = table_with(&[0, 1, 2, 3]);
        table.connect(0, 1).unwrap();
        table.connect(1, 2).unwrap();
        table.connect(2, 3).unwrap();
        table.connect(3, 0).unwrap();

        let mut triangles = Vec::new();
        table.remove_triangles(&mut triangles).unwrap();
        assert_eq!(triangles.len(), 2);
    }

    #[test]
    fn branch_plus_configuration() {
        // Four crossings connected through a central branch vertex (degree
        // 4), closed into two loops by the neighboring two-crossing faces.
        let mut table = table_with(&[0, 1, 2, 3, 12]);
        for crossing in [0usize, 1, 2, 3] {
            table.connect(crossing, 12).unwrap();
        }
        table.connect(0, 1).unwrap();
        table.connect(2, 3).unwrap();

        let mut triangles = Vec::new();
        table.remove_triangles(&mut triangles).unwrap();
        // Each loop through the branch vertex clips into one triangle
        assert_eq!(triangles.len(), 2);
    }

    #[test]
    fn empty_table_is_fine() {
        let mut table = VertexEdgeTable::new();
        let mut triangles = Vec::new();
        table.remove_triangles(&mut triangles).unwrap();
        assert!(triangles.is_empty());
    }

    #[test]
    fn stuck_wireframe_is_reported() {
        // Two vertices joined by a single segment: degree 1 each, no ear
        let mut table = table_with(&[0, 1]);
        table.connect(0, 1).unwrap();

        let mut triangles = Vec::new();
        assert!(matches!(
            table.remove_triangles(&mut triangles),
            Err(TableFault::Stuck { live: 2 })
        ));
    }

    #[test]
    fn connect_is_idempotent() {
        let mut table = table_with(&[0, 1]);
        table.connect(0, 1).unwrap();
        table.connect(0, 1).unwrap();
        table.connect(1, 0).unwrap();
        assert!(table.adjacent(0, 1));
    }
}
