//! Canonical triangle identity.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered triple of vertex indices, canonicalized so the smallest index
/// comes first while preserving cyclic winding.
///
/// Two triangles that are cyclic rotations of one another produce the same
/// key; a winding flip produces a different key (when the three indices are
/// distinct). This makes the key usable for triangle deduplication and for
/// adjacency queries without storing explicit edge objects.
///
/// # Example
///
/// ```
/// use contour_types::TriangleKey;
///
/// assert_eq!(TriangleKey::new(5, 2, 9), TriangleKey::new(2, 9, 5));
/// assert_eq!(TriangleKey::new(5, 2, 9), TriangleKey::new(9, 5, 2));
/// assert_ne!(TriangleKey::new(5, 2, 9), TriangleKey::new(2, 5, 9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangleKey([u32; 3]);

impl TriangleKey {
    /// Build a key from three vertex indices.
    ///
    /// The triple is rotated so the smallest index is first; cyclic order is
    /// preserved.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        if a <= b && a <= c {
            Self([a, b, c])
        } else if b <= c {
            Self([b, c, a])
        } else {
            Self([c, a, b])
        }
    }

    /// The canonicalized indices, smallest first.
    #[inline]
    #[must_use]
    pub const fn indices(&self) -> [u32; 3] {
        self.0
    }

    /// The three edges as unordered `(min, max)` index pairs.
    ///
    /// Used to count unique edges (each interior edge is reported by the two
    /// triangles sharing it) without explicit edge records.
    #[must_use]
    pub const fn edges(&self) -> [(u32, u32); 3] {
        let [a, b, c] = self.0;
        [ordered(a, b), ordered(b, c), ordered(c, a)]
    }
}

impl From<[u32; 3]> for TriangleKey {
    fn from(tri: [u32; 3]) -> Self {
        Self::new(tri[0], tri[1], tri[2])
    }
}

/// Order an index pair so the smaller index comes first.
const fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_rotations_equal() {
        let k = TriangleKey::new(3, 7, 1);
        assert_eq!(k, TriangleKey::new(7, 1, 3));
        assert_eq!(k, TriangleKey::new(1, 3, 7));
        assert_eq!(k.indices(), [1, 3, 7]);
    }

    #[test]
    fn winding_flip_differs() {
        // Non-cyclic permutations of distinct indices get a different key
        assert_ne!(TriangleKey::new(1, 3, 7), TriangleKey::new(3, 1, 7));
        assert_ne!(TriangleKey::new(1, 3, 7), TriangleKey::new(1, 7, 3));
        assert_ne!(TriangleKey::new(1, 3, 7), TriangleKey::new(7, 3, 1));
    }

    #[test]
    fn repeated_indices() {
        // Degenerate triples still canonicalize deterministically
        assert_eq!(TriangleKey::new(4, 4, 2), TriangleKey::new(2, 4, 4));
        assert_eq!(TriangleKey::new(0, 0, 0).indices(), [0, 0, 0]);
    }

    #[test]
    fn smallest_first() {
        assert_eq!(TriangleKey::new(9, 5, 2).indices()[0], 2);
        assert_eq!(TriangleKey::new(2, 9, 5).indices()[0], 2);
    }

    #[test]
    fn edges_are_unordered_pairs() {
        let edges = TriangleKey::new(5, 2, 9).edges();
        assert!(edges.contains(&(2, 5)));
        assert!(edges.contains(&(5, 9)));
        assert!(edges.contains(&(2, 9)));
    }

    #[test]
    fn from_array() {
        let k: TriangleKey = [8u32, 1, 4].into();
        assert_eq!(k, TriangleKey::new(1, 4, 8));
    }
}
