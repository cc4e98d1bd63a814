//! Winding orientation against the volume gradient.

use contour_types::{TriangleSoup, Vector3};
use rayon::prelude::*;
use tracing::debug;

use crate::volume::VoxelVolume;

/// Orient every triangle's winding consistently with the volume gradient.
///
/// The voxel gradient points from low values toward high values, which for
/// an occupancy volume means from outside toward the material. Each
/// triangle's face normal is compared against the averaged gradient sampled
/// at its three vertices; when `same_direction_as_gradient` is `true` the
/// winding is flipped until the normal agrees with the gradient, otherwise
/// until it opposes it (outward-facing for occupancy data).
///
/// Triangles are independent, so the decision runs in parallel. A zero
/// normal or zero sampled gradient leaves the triangle untouched. Returns
/// the number of triangles flipped.
pub fn orient_triangles(
    soup: &mut TriangleSoup,
    volume: &VoxelVolume<'_>,
    same_direction_as_gradient: bool,
) -> usize {
    let vertices = &soup.vertices;
    let flipped = soup
        .triangles
        .par_iter_mut()
        .map(|triangle| {
            let a = vertices[triangle[0] as usize];
            let b = vertices[triangle[1] as usize];
            let c = vertices[triangle[2] as usize];

            let normal = (b - a).cross(&(c - a));
            let gradient: Vector3<f64> = (volume.sample_gradient(a)
                + volume.sample_gradient(b)
                + volume.sample_gradient(c))
                / 3.0;

            let alignment = normal.dot(&gradient);
            let wants_flip = if same_direction_as_gradient {
                alignment < 0.0
            } else {
                alignment > 0.0
            };
            if wants_flip {
                triangle.swap(1, 2);
            }
            usize::from(wants_flip)
        })
        .sum();

    debug!(
        flipped,
        total = soup.triangle_count(),
        same_direction_as_gradient,
        "oriented triangles"
    );
    flipped
}
