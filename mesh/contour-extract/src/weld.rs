//! Exact-position vertex welding and triangle deduplication.

use core::fmt;

use contour_types::{Point3, TriangleKey, TriangleSoup};
use hashbrown::{HashMap, HashSet};
use tracing::debug;

/// Counters reported by [`make_unique`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeldSummary {
    /// Vertices removed by merging exact-duplicate positions.
    pub vertices_welded: usize,
    /// Triangles dropped for referencing a vertex more than once.
    pub degenerate_removed: usize,
    /// Triangles dropped as cyclic duplicates of an earlier triangle.
    pub duplicates_removed: usize,
}

impl WeldSummary {
    /// Whether the pass changed the soup at all.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        self.vertices_welded > 0 || self.degenerate_removed > 0 || self.duplicates_removed > 0
    }
}

impl fmt::Display for WeldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "welded {} vertices, removed {} degenerate and {} duplicate triangles",
            self.vertices_welded, self.degenerate_removed, self.duplicates_removed
        )
    }
}

/// Weld bit-identical vertex positions and drop the triangles that
/// collapse as a result.
///
/// Positions are compared by their exact `f64` bit patterns, never by a
/// tolerance: cell-level extraction interpolates shared crossings with
/// identical arithmetic, so matching coordinates match exactly. The first
/// occurrence of each position survives, triangles are remapped onto the
/// survivors, triangles with a repeated index are dropped, and cyclic
/// duplicates (same vertices, same winding) keep only their first copy.
///
/// The pass is idempotent: running it on already-welded output changes
/// nothing.
pub fn make_unique(soup: &mut TriangleSoup) -> WeldSummary {
    let mut summary = WeldSummary::default();

    // First index wins for each distinct bit pattern
    let mut first_seen: HashMap<[u64; 3], u32> = HashMap::with_capacity(soup.vertices.len());
    let mut remap: Vec<u32> = Vec::with_capacity(soup.vertices.len());
    let mut kept: Vec<Point3<f64>> = Vec::with_capacity(soup.vertices.len());

    for position in &soup.vertices {
        let key = position_bits(position);
        match first_seen.get(&key) {
            Some(&target) => {
                remap.push(target);
                summary.vertices_welded += 1;
            }
            None => {
                let target = u32::try_from(kept.len()).unwrap_or(u32::MAX);
                first_seen.insert(key, target);
                remap.push(target);
                kept.push(*position);
            }
        }
    }
    soup.vertices = kept;

    let mut seen_keys: HashSet<TriangleKey> = HashSet::with_capacity(soup.triangles.len());
    soup.triangles.retain_mut(|triangle| {
        for index in triangle.iter_mut() {
            *index = remap[*index as usize];
        }
        let [a, b, c] = *triangle;
        if a == b || b == c || a == c {
            summary.degenerate_removed += 1;
            return false;
        }
        if !seen_keys.insert(TriangleKey::new(a, b, c)) {
            summary.duplicates_removed += 1;
            return false;
        }
        true
    });

    if summary.had_changes() {
        debug!(%summary, "welded triangle soup");
    }
    summary
}

fn position_bits(position: &Point3<f64>) -> [u64; 3] {
    [
        position.x.to_bits(),
        position.y.to_bits(),
        position.z.to_bits(),
    ]
}
