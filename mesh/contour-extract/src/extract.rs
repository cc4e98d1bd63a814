//! Per-cell contour extraction.

// Algorithm uses many small-index casts and lookup tables
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]

use contour_types::{Point3, TriangleSoup};
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};
use crate::table::{TableFault, VertexEdgeTable};
use crate::volume::VoxelVolume;

/// Cube corner offsets, indexed 0-7.
///
/// Corners 0-3 walk the z=0 face counter-clockwise, corners 4-7 the z=1
/// face in the same order.
const CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Cube edges as corner pairs, indexed 0-11. Every edge runs from its
/// low-coordinate corner to its high-coordinate corner so that two cells
/// sharing an edge interpolate the crossing with identical arithmetic and
/// exact-position welding can match the results bit for bit.
const EDGE_CORNERS: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [3, 2],
    [0, 3],
    [4, 5],
    [5, 6],
    [7, 6],
    [4, 7],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// One cell face, parameterized over local coordinates `(s, t)`.
struct FaceDef {
    /// Corner indices laid out `[c00, c10, c01, c11]` on the `(s, t)` grid.
    corners: [usize; 4],
    /// Edge slots in `[bottom (t=0), right (s=1), top (t=1), left (s=0)]`
    /// order.
    edges: [usize; 4],
    /// Axis index of `s` and `t` (0 = x, 1 = y, 2 = z).
    s_axis: usize,
    t_axis: usize,
    /// The remaining axis and the face's offset along it.
    fixed_axis: usize,
    fixed_offset: f64,
}

/// The six cell faces. Branch vertices for face `i` live in table slot
/// `12 + i`.
const FACES: [FaceDef; 6] = [
    // z = 0
    FaceDef {
        corners: [0, 1, 3, 2],
        edges: [0, 1, 2, 3],
        s_axis: 0,
        t_axis: 1,
        fixed_axis: 2,
        fixed_offset: 0.0,
    },
    // z = 1
    FaceDef {
        corners: [4, 5, 7, 6],
        edges: [4, 5, 6, 7],
        s_axis: 0,
        t_axis: 1,
        fixed_axis: 2,
        fixed_offset: 1.0,
    },
    // y = 0
    FaceDef {
        corners: [0, 1, 4, 5],
        edges: [0, 9, 4, 8],
        s_axis: 0,
        t_axis: 2,
        fixed_axis: 1,
        fixed_offset: 0.0,
    },
    // y = 1
    FaceDef {
        corners: [3, 2, 7, 6],
        edges: [2, 10, 6, 11],
        s_axis: 0,
        t_axis: 2,
        fixed_axis: 1,
        fixed_offset: 1.0,
    },
    // x = 0
    FaceDef {
        corners: [0, 3, 4, 7],
        edges: [3, 11, 7, 8],
        s_axis: 1,
        t_axis: 2,
        fixed_axis: 0,
        fixed_offset: 0.0,
    },
    // x = 1
    FaceDef {
        corners: [1, 2, 5, 6],
        edges: [1, 10, 5, 9],
        s_axis: 1,
        t_axis: 2,
        fixed_axis: 0,
        fixed_offset: 1.0,
    },
];

/// Extract the level-set surface of a voxel volume as a triangle soup.
///
/// Every cell of the `(x-1)(y-1)(z-1)` cell grid is contoured
/// independently: edge crossings of `level - value` are interpolated into
/// the cell's [`VertexEdgeTable`], each face's crossings are classified
/// (direct connection, disambiguated diagonal pairing, or a branch vertex
/// at the face saddle), and the resulting wireframe is ear-clipped into
/// triangles.
///
/// Adjacent cells emit their shared crossings independently; run
/// [`crate::make_unique`] afterwards to weld them. Winding is arbitrary
/// until [`crate::orient_triangles`] is applied.
///
/// # Errors
///
/// Returns [`ExtractError::UnreachableTopology`] when a face shows a
/// crossing pattern outside the documented cases (one or three crossings on
/// a face, or a wireframe that cannot be ear-clipped). This is fatal: it
/// indicates a defect in the volume data assumptions, not a retryable
/// condition.
pub fn extract_contour(volume: &VoxelVolume<'_>, level: f64) -> ExtractResult<TriangleSoup> {
    let (xb, yb, zb) = volume.dimensions();
    let mut soup = TriangleSoup::new();
    if xb < 2 || yb < 2 || zb < 2 {
        // No cell can form; a flat or empty volume is a zero-work outcome
        return Ok(soup);
    }

    for z in 0..zb - 1 {
        for y in 0..yb - 1 {
            for x in 0..xb - 1 {
                contour_cell(volume, level, (x, y, z), &mut soup)?;
            }
        }
    }

    debug!(
        vertices = soup.vertex_count(),
        triangles = soup.triangle_count(),
        level,
        "extracted contour"
    );
    Ok(soup)
}

/// Contour a single cell into the shared output soup.
fn contour_cell(
    volume: &VoxelVolume<'_>,
    level: f64,
    cell: (usize, usize, usize),
    soup: &mut TriangleSoup,
) -> ExtractResult<()> {
    let (x, y, z) = cell;

    // Signed field at the eight corners: positive outside, negative inside
    let mut field = [0.0f64; 8];
    for (corner, offset) in CORNER_OFFSETS.iter().enumerate() {
        field[corner] = level - f64::from(volume.get(x + offset[0], y + offset[1], z + offset[2]));
    }

    let mut table = VertexEdgeTable::new();
    let mut crossing_mask = 0u16;
    let base = Point3::new(x as f64, y as f64, z as f64);

    for (edge, corners) in EDGE_CORNERS.iter().enumerate() {
        let f0 = field[corners[0]];
        let f1 = field[corners[1]];
        if f0 * f1 >= 0.0 {
            continue;
        }
        let mu = f0 / (f0 - f1);
        let p0 = corner_position(base, corners[0]);
        let p1 = corner_position(base, corners[1]);
        let position = p0 + (p1 - p0) * mu;

        let global = soup.vertices.len() as u32;
        soup.vertices.push(position);
        table.set_vertex(edge, position, global);
        crossing_mask |= 1 << edge;
    }

    if crossing_mask == 0 {
        return Ok(());
    }

    for (face_index, face) in FACES.iter().enumerate() {
        classify_face(face, face_index, &field, base, &mut table, soup)
            .map_err(|details| ExtractError::UnreachableTopology {
                x,
                y,
                z,
                details,
            })?;
    }

    table
        .remove_triangles(&mut soup.triangles)
        .map_err(|fault| fault_to_error(fault, cell))
}

fn corner_position(base: Point3<f64>, corner: usize) -> Point3<f64> {
    let offset = CORNER_OFFSETS[corner];
    Point3::new(
        base.x + offset[0] as f64,
        base.y + offset[1] as f64,
        base.z + offset[2] as f64,
    )
}

/// Classify the crossings on one face and wire the table accordingly.
fn classify_face(
    face: &FaceDef,
    face_index: usize,
    field: &[f64; 8],
    base: Point3<f64>,
    table: &mut VertexEdgeTable,
    soup: &mut TriangleSoup,
) -> Result<(), String> {
    let present: Vec<usize> = face
        .edges
        .iter()
        .copied()
        .filter(|&slot| table.is_set(slot))
        .collect();

    match present.len() {
        0 => Ok(()),
        2 => table
            .connect(present[0], present[1])
            .map_err(fault_detail),
        4 => resolve_ambiguous(face, face_index, field, base, table, soup),
        n => Err(format!("{n} crossings on face {face_index}")),
    }
}

/// Resolve a face crossed on all four edges.
///
/// With `g` the signed field at the face corners on the `(s, t)` grid, the
/// sign of `g00*g11 - g01*g10` selects the non-crossing diagonal pairing of
/// the two hyperbola branches; a zero determinant degenerates into crossing
/// asymptotes, handled by a branch vertex at the saddle connecting all four
/// crossings.
fn resolve_ambiguous(
    face: &FaceDef,
    face_index: usize,
    field: &[f64; 8],
    base: Point3<f64>,
    table: &mut VertexEdgeTable,
    soup: &mut TriangleSoup,
) -> Result<(), String> {
    let [g00, g10, g01, g11] = face.corners.map(|c| field[c]);
    let det = g00 * g11 - g01 * g10;
    let [bottom, right, top, left] = face.edges;

    if det > 0.0 {
        // Branches hug the (1,0) and (0,1) corners
        table.connect(bottom, right).map_err(fault_detail)?;
        table.connect(top, left).map_err(fault_detail)
    } else if det < 0.0 {
        // Branches hug the (0,0) and (1,1) corners
        table.connect(bottom, left).map_err(fault_detail)?;
        table.connect(right, top).map_err(fault_detail)
    } else {
        // Degenerate saddle: a degree-4 "plus" through the saddle point
        let denom = g00 + g11 - g10 - g01;
        if denom == 0.0 {
            return Err(format!(
                "face {face_index} has four crossings but a flat bilinear field"
            ));
        }
        let s = (g00 - g01) / denom;
        let t = (g00 - g10) / denom;

        let mut position = base;
        position[face.s_axis] += s;
        position[face.t_axis] += t;
        position[face.fixed_axis] += face.fixed_offset;

        let slot = 12 + face_index;
        let global = soup.vertices.len() as u32;
        soup.vertices.push(position);
        table.set_vertex(slot, position, global);

        for crossing in face.edges {
            table.connect(crossing, slot).map_err(fault_detail)?;
        }
        Ok(())
    }
}

fn fault_detail(fault: TableFault) -> String {
    match fault {
        TableFault::Stuck { live } => {
            format!("{live} wireframe vertices left without a degree-2 ear")
        }
        TableFault::Overconnected { slot } => {
            format!("wireframe slot {slot} exceeded degree 4")
        }
    }
}

fn fault_to_error(fault: TableFault, cell: (usize, usize, usize)) -> ExtractError {
    ExtractError::UnreachableTopology {
        x: cell.0,
        y: cell.1,
        z: cell.2,
        details: fault_detail(fault),
    }
}
