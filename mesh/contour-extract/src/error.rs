//! Error types for isosurface extraction.

use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur during isosurface extraction.
///
/// `UnreachableTopology` is fatal and non-recoverable by design: it signals
/// a defect in the voxel data assumptions or in the disambiguation logic,
/// not a runtime condition a caller can retry.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The scalar buffer does not match the stated dimensions.
    #[error("voxel buffer holds {actual} values but {x}x{y}x{z} requires {expected}")]
    BufferSizeMismatch {
        /// X bound of the volume.
        x: usize,
        /// Y bound of the volume.
        y: usize,
        /// Z bound of the volume.
        z: usize,
        /// `x * y * z`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// The per-voxel edge/face disambiguation met a crossing pattern outside
    /// the documented cases.
    #[error("unreachable topology in cell ({x}, {y}, {z}): {details}")]
    UnreachableTopology {
        /// Cell x coordinate.
        x: usize,
        /// Cell y coordinate.
        y: usize,
        /// Cell z coordinate.
        z: usize,
        /// What went wrong.
        details: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ExtractError::BufferSizeMismatch {
            x: 2,
            y: 3,
            z: 4,
            expected: 24,
            actual: 20,
        };
        let text = format!("{err}");
        assert!(text.contains("2x3x4"));
        assert!(text.contains("24"));

        let err = ExtractError::UnreachableTopology {
            x: 1,
            y: 2,
            z: 3,
            details: "three crossings on one face".to_string(),
        };
        assert!(format!("{err}").contains("(1, 2, 3)"));
    }
}
