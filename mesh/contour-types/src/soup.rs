//! Indexed vertex/triangle soup.

use hashbrown::HashSet;
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::TriangleKey;

/// An indexed triangle soup: positions plus index triples.
///
/// This is the exchange format between the isosurface extractor and the
/// half-edge mesh engine. It carries no topology beyond the index triples;
/// vertices may be duplicated and triangles may repeat until the soup is
/// welded.
///
/// # Example
///
/// ```
/// use contour_types::{TriangleSoup, Point3};
///
/// let soup = TriangleSoup::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
/// assert_eq!(soup.euler_characteristic(), 1); // 3 - 3 + 1
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangleSoup {
    /// Vertex positions in voxel units.
    pub vertices: Vec<Point3<f64>>,

    /// Triangles as index triples into `vertices`.
    pub triangles: Vec<[u32; 3]>,
}

impl TriangleSoup {
    /// Create a new empty soup.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Create a soup with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Create a soup from existing parts.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Point3<f64>>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True when the soup holds no triangles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Number of unique undirected edges.
    ///
    /// Each [`TriangleKey`]'s three edges are collected as unordered index
    /// pairs; an interior edge reported by the two triangles sharing it
    /// counts once.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let mut edges: HashSet<(u32, u32)> = HashSet::with_capacity(self.triangles.len() * 3 / 2);
        for tri in &self.triangles {
            for edge in TriangleKey::from(*tri).edges() {
                edges.insert(edge);
            }
        }
        edges.len()
    }

    /// Euler characteristic `V - E + F`.
    ///
    /// A welded, closed genus-0 surface yields 2.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    // Wrap: vertex/edge/face counts stay far below i64::MAX
    pub fn euler_characteristic(&self) -> i64 {
        self.vertices.len() as i64 - self.edge_count() as i64 + self.triangles.len() as i64
    }

    /// Axis-aligned bounds of the vertex positions.
    ///
    /// Returns `None` when the soup has no vertices.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.vertices.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.vertices[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some((min, max))
    }
}
