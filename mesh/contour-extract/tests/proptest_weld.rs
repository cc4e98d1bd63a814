//! Property tests for the welding pass.

use contour_extract::make_unique;
use contour_types::{Point3, TriangleSoup};
use proptest::prelude::*;

/// Soups built from a small palette of lattice positions so that exact
/// duplicates actually occur.
fn arb_soup() -> impl Strategy<Value = TriangleSoup> {
    let vertex = (0u8..4, 0u8..4, 0u8..4)
        .prop_map(|(x, y, z)| Point3::new(f64::from(x), f64::from(y), f64::from(z)));
    prop::collection::vec(vertex, 3..40).prop_flat_map(|vertices| {
        let len = vertices.len() as u32;
        let triangle = (0..len, 0..len, 0..len).prop_map(|(a, b, c)| [a, b, c]);
        prop::collection::vec(triangle, 0..30)
            .prop_map(move |triangles| TriangleSoup::from_parts(vertices.clone(), triangles))
    })
}

proptest! {
    #[test]
    fn weld_is_idempotent(mut soup in arb_soup()) {
        make_unique(&mut soup);
        let vertices = soup.vertices.clone();
        let triangles = soup.triangles.clone();

        let again = make_unique(&mut soup);
        prop_assert!(!again.had_changes());
        prop_assert_eq!(soup.vertices, vertices);
        prop_assert_eq!(soup.triangles, triangles);
    }

    #[test]
    fn welded_positions_are_unique(mut soup in arb_soup()) {
        make_unique(&mut soup);
        let mut seen = std::collections::HashSet::new();
        for p in &soup.vertices {
            let bits = [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
            prop_assert!(seen.insert(bits), "duplicate position survived weld");
        }
    }

    #[test]
    fn weld_never_invents_geometry(mut soup in arb_soup()) {
        let vertices_before = soup.vertex_count();
        let triangles_before = soup.triangle_count();
        let summary = make_unique(&mut soup);

        prop_assert_eq!(
            soup.vertex_count() + summary.vertices_welded,
            vertices_before
        );
        prop_assert_eq!(
            soup.triangle_count() + summary.degenerate_removed + summary.duplicates_removed,
            triangles_before
        );
        for triangle in &soup.triangles {
            for &index in triangle {
                prop_assert!((index as usize) < soup.vertex_count());
            }
        }
    }
}
