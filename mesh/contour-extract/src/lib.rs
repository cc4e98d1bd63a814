//! Isosurface extraction from labeled voxel volumes.
//!
//! This crate turns a scalar voxel grid plus an isolevel into a triangle
//! soup representing the level-set surface:
//!
//! - [`VoxelVolume`] - read-only view over a caller-owned scalar buffer
//! - [`extract_contour`] - per-cell contouring with ambiguous-face
//!   disambiguation and ear-clipped triangulation
//! - [`make_unique`] - exact-position vertex welding and triangle dedup
//! - [`orient_triangles`] - winding orientation against the volume gradient
//!
//! # Ambiguous faces
//!
//! A cell face crossed on all four edges is resolved by the sign of the
//! bilinear determinant built from its corner values: a non-zero sign picks
//! one of the two non-crossing diagonal pairings, a zero sign inserts a
//! branch vertex at the face saddle point.
//!
//! # Example
//!
//! ```
//! use contour_extract::{extract_contour, make_unique, VoxelVolume};
//!
//! // A single occupied voxel corner in a 2x2x2 volume
//! let values = [1, 0, 0, 0, 0, 0, 0, 0];
//! let volume = VoxelVolume::new(2, 2, 2, &values)?;
//!
//! let mut soup = extract_contour(&volume, 0.5)?;
//! make_unique(&mut soup);
//! assert_eq!(soup.triangle_count(), 1);
//! # Ok::<(), contour_extract::ExtractError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod extract;
mod orient;
mod table;
mod volume;
mod weld;

pub use error::{ExtractError, ExtractResult};
pub use extract::extract_contour;
pub use orient::orient_triangles;
pub use volume::VoxelVolume;
pub use weld::{make_unique, WeldSummary};
