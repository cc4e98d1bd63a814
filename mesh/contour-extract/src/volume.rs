//! Read-only view over a caller-owned voxel buffer.

use nalgebra::{Point3, Vector3};

use crate::error::{ExtractError, ExtractResult};

/// A borrowed scalar voxel volume.
///
/// The buffer is lexicographically ordered and indexed
/// `x + x_bound * (y + y_bound * z)`. It is owned by the caller, read-only,
/// and never retained past the call that consumes it.
///
/// Positions are expressed in voxel units: lattice point `(x, y, z)` sits at
/// world coordinate `(x as f64, y as f64, z as f64)`.
#[derive(Debug, Clone, Copy)]
pub struct VoxelVolume<'a> {
    values: &'a [i32],
    x_bound: usize,
    y_bound: usize,
    z_bound: usize,
}

impl<'a> VoxelVolume<'a> {
    /// Create a view over a scalar buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::BufferSizeMismatch`] when the buffer length
    /// does not equal `x_bound * y_bound * z_bound`.
    pub fn new(
        x_bound: usize,
        y_bound: usize,
        z_bound: usize,
        values: &'a [i32],
    ) -> ExtractResult<Self> {
        let expected = x_bound * y_bound * z_bound;
        if values.len() != expected {
            return Err(ExtractError::BufferSizeMismatch {
                x: x_bound,
                y: y_bound,
                z: z_bound,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            values,
            x_bound,
            y_bound,
            z_bound,
        })
    }

    /// Volume dimensions `(x_bound, y_bound, z_bound)`.
    #[inline]
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize, usize) {
        (self.x_bound, self.y_bound, self.z_bound)
    }

    /// Scalar value at a lattice point.
    ///
    /// # Panics
    ///
    /// Panics when the coordinates are out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> i32 {
        debug_assert!(x < self.x_bound && y < self.y_bound && z < self.z_bound);
        self.values[x + self.x_bound * (y + self.y_bound * z)]
    }

    /// Central-difference gradient estimate at a lattice point.
    ///
    /// One-sided differences are used at the volume borders.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    // Precision: voxel values and spans are small integers
    pub fn gradient(&self, x: usize, y: usize, z: usize) -> Vector3<f64> {
        let diff = |lo: i32, hi: i32, span: usize| f64::from(hi - lo) / span as f64;

        let (xl, xh) = (x.saturating_sub(1), (x + 1).min(self.x_bound - 1));
        let (yl, yh) = (y.saturating_sub(1), (y + 1).min(self.y_bound - 1));
        let (zl, zh) = (z.saturating_sub(1), (z + 1).min(self.z_bound - 1));

        Vector3::new(
            if xh > xl {
                diff(self.get(xl, y, z), self.get(xh, y, z), xh - xl)
            } else {
                0.0
            },
            if yh > yl {
                diff(self.get(x, yl, z), self.get(x, yh, z), yh - yl)
            } else {
                0.0
            },
            if zh > zl {
                diff(self.get(x, y, zl), self.get(x, y, zh), zh - zl)
            } else {
                0.0
            },
        )
    }

    /// Trilinearly interpolated gradient at an arbitrary position.
    ///
    /// The position is clamped into the volume; gradients at the eight
    /// enclosing lattice points are blended.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // Casts: coordinates are clamped non-negative and below the bounds
    pub fn sample_gradient(&self, position: Point3<f64>) -> Vector3<f64> {
        let clamp = |v: f64, bound: usize| v.clamp(0.0, (bound - 1) as f64);
        let px = clamp(position.x, self.x_bound);
        let py = clamp(position.y, self.y_bound);
        let pz = clamp(position.z, self.z_bound);

        let x0 = (px.floor() as usize).min(self.x_bound - 1);
        let y0 = (py.floor() as usize).min(self.y_bound - 1);
        let z0 = (pz.floor() as usize).min(self.z_bound - 1);
        let x1 = (x0 + 1).min(self.x_bound - 1);
        let y1 = (y0 + 1).min(self.y_bound - 1);
        let z1 = (z0 + 1).min(self.z_bound - 1);

        let fx = px - x0 as f64;
        let fy = py - y0 as f64;
        let fz = pz - z0 as f64;

        let mut acc = Vector3::zeros();
        for (zi, wz) in [(z0, 1.0 - fz), (z1, fz)] {
            for (yi, wy) in [(y0, 1.0 - fy), (y1, fy)] {
                for (xi, wx) in [(x0, 1.0 - fx), (x1, fx)] {
                    let w = wx * wy * wz;
                    if w != 0.0 {
                        acc += self.gradient(xi, yi, zi) * w;
                    }
                }
            }
        }
        acc
    }
}
