//! Geometry primitives for isosurface extraction and half-edge mesh refinement.
//!
//! This crate provides the exchange types shared by the extraction and mesh
//! engine crates:
//!
//! - [`TriangleKey`] - Canonical, order-independent triangle identity
//! - [`TriangleSoup`] - An indexed vertex/triangle soup
//!
//! # Layer 0 Crate
//!
//! Zero dependencies on the other engine crates. All coordinates are `f64`
//! in voxel units (one unit per lattice step of the source volume).
//!
//! # Winding
//!
//! Triangle winding is not guaranteed by these types; the extractor emits
//! arbitrary winding and orients it afterwards against the volume gradient.
//!
//! # Example
//!
//! ```
//! use contour_types::{TriangleSoup, Point3};
//!
//! let mut soup = TriangleSoup::new();
//! soup.vertices.push(Point3::new(0.0, 0.0, 0.0));
//! soup.vertices.push(Point3::new(1.0, 0.0, 0.0));
//! soup.vertices.push(Point3::new(0.0, 1.0, 0.0));
//! soup.triangles.push([0, 1, 2]);
//!
//! assert_eq!(soup.triangle_count(), 1);
//! assert_eq!(soup.edge_count(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod key;
mod soup;

pub use key::TriangleKey;
pub use soup::TriangleSoup;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
